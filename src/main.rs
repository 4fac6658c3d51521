use clap::Parser;
use twofold::config::Cli;
use twofold::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    twofold::commands::sync::run(config)?;

    Ok(())
}
