use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "minirel")]
#[command(author, version, about = "A small relational database with a SQL-like statement language")]
pub struct Cli {
    /// Read statements from this file instead of standard input
    pub script: Option<PathBuf>,

    /// Directory holding the <table>.db files used by load and store
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Do not print prompts
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Prompts are only shown for an interactive session on standard input.
    pub fn prompts(&self) -> bool {
        self.script.is_none() && !self.quiet
    }
}
