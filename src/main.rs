use std::fs::File;
use std::io::{self, BufRead, BufReader};

use minirel::cli::Cli;
use minirel::sql::{Interpreter, Tokenizer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    env_logger::init();

    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
            run(BufReader::new(file), &cli)?;
        }
        None => run(io::stdin().lock(), &cli)?,
    }

    Ok(())
}

fn run<R: BufRead>(input: R, cli: &Cli) -> io::Result<()> {
    let mut tokens = Tokenizer::new(input);
    if cli.prompts() {
        println!("minirel {}", env!("CARGO_PKG_VERSION"));
        tokens = tokens.with_prompter(Box::new(io::stdout()));
    }

    let mut interpreter = Interpreter::new(tokens, io::stdout(), cli.dir.clone());
    log::debug!("table files in {}", interpreter.data_dir().display());
    interpreter.run()?;

    let db = interpreter.database();
    if !db.is_empty() {
        log::info!("session ended with {} table(s): {}", db.len(), db.table_names().join(", "));
    }
    Ok(())
}
