use anyhow::Result;
use clap::Parser;
use pathrun::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
