mod app;
mod cli;
mod effects;
mod logging;
mod persistence;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    app::run(cli::Cli::parse())
}
