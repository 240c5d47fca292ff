use std::path::PathBuf;

use clap::Parser;

/// Export a chess.com player's monthly game archives into one PGN file.
#[derive(Debug, Parser)]
#[command(name = "chesscom-exporter", version)]
pub struct Cli {
    /// Player whose archives to list and export. Falls back to the player
    /// remembered from the previous run.
    pub player: Option<String>,

    /// Output file. Defaults to `chesscom-export-<player>.pgn`.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Restrict the export to the given months. May be repeated; every
    /// month is exported when omitted.
    #[arg(short, long = "month", value_name = "YYYY/MM")]
    pub months: Vec<String>,

    /// List the available archives and exit without exporting.
    #[arg(long)]
    pub list: bool,

    /// Accumulate in memory and print to stdout instead of writing a file.
    #[arg(long)]
    pub stdout: bool,

    /// Mirror the log to the terminal as well as the log file.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses a `YYYY/MM` filter into its components.
pub fn parse_month_filter(raw: &str) -> Option<(i32, i32)> {
    let (year, month) = raw.trim().split_once('/')?;
    let year = year.parse().ok()?;
    let month: i32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}
