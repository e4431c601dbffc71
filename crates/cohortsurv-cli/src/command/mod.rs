use clap::{Parser, Subcommand};

use self::analyze::AnalyzeArg;

mod analyze;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare survival of altered and unaltered cases
    Analyze(#[clap(flatten)] AnalyzeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
    }
    Ok(())
}
