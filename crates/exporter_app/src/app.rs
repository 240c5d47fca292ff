use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::Utc;
use exporter_core::{update, AppState, AppViewModel, ExportTarget, Msg, RunState};
use exporter_engine::{ClientSettings, EngineHandle};
use exporter_logging::{exporter_info, exporter_warn};

use crate::cli::{parse_month_filter, Cli};
use crate::effects::EffectRunner;
use crate::logging::{self, LogDestination};
use crate::persistence;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const LISTING_DEADLINE: Duration = Duration::from_secs(60);

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    });

    let config_dir = PathBuf::from(".");
    let mut config = persistence::load(&config_dir);

    let player = cli
        .player
        .clone()
        .or_else(|| config.player.clone())
        .context("no player given and none remembered from a previous run")?;

    let mut months = Vec::new();
    for raw in &cli.months {
        let filter = parse_month_filter(raw)
            .with_context(|| format!("invalid month filter {raw:?}, expected YYYY/MM"))?;
        months.push(filter);
    }
    months.sort_unstable();
    months.dedup();

    let output_path = cli
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("chesscom-export-{player}.pgn")));

    let engine = EngineHandle::new(ClientSettings::default())?;
    let mut runner = EffectRunner::new(engine, output_path.clone());

    let state = AppState::new();
    let state = dispatch(state, Msg::PlayerInputChanged(player.clone()), &mut runner);
    let state = dispatch(state, Msg::PlayerSubmitted, &mut runner);
    let state = wait_for_listing(state, &mut runner)?;

    if state.view().archives.is_empty() {
        println!("No archives available for {player}");
        return Ok(());
    }

    if cli.list {
        print_archives(&state.view());
        return Ok(());
    }

    let state = select_archives(state, &mut runner, &months)?;

    let target = if cli.stdout {
        ExportTarget::Clipboard
    } else {
        ExportTarget::File
    };
    let state = dispatch(state, Msg::ExportRequested { target }, &mut runner);
    if state.run_state() != RunState::Running {
        bail!("nothing to export");
    }

    let state = drive_run(state, &mut runner);

    let view = state.view();
    if state.run_state() != RunState::Completed {
        bail!("export did not complete: {}", view.status_line);
    }

    if cli.stdout {
        if let Some(buffer) = runner.take_clipboard() {
            print!("{buffer}");
        }
    } else {
        println!("{} Games written to {}", view.status_line, output_path.display());
    }

    config.player = Some(player);
    config.last_export_utc = Some(Utc::now().to_rfc3339());
    persistence::save(&config_dir, &config);
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &mut EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.apply(effects);
    state
}

fn wait_for_listing(mut state: AppState, runner: &mut EffectRunner) -> anyhow::Result<AppState> {
    let started = Instant::now();
    while state.view().archives_loading {
        if started.elapsed() > LISTING_DEADLINE {
            bail!("timed out waiting for the archive listing");
        }
        match runner.poll() {
            Some(msg) => state = dispatch(state, msg, runner),
            None => thread::sleep(POLL_INTERVAL),
        }
    }
    Ok(state)
}

fn select_archives(
    mut state: AppState,
    runner: &mut EffectRunner,
    months: &[(i32, i32)],
) -> anyhow::Result<AppState> {
    if months.is_empty() {
        return Ok(dispatch(state, Msg::SelectAll, runner));
    }

    let rows = state.view().archives;
    for &(year, month) in months {
        match rows.iter().find(|row| row.year == year && row.month == month) {
            Some(row) => {
                state = dispatch(state, Msg::ArchiveToggled { index: row.index }, runner);
            }
            None => exporter_warn!("no archive for {year}/{month:02}, skipping"),
        }
    }

    if !state.view().any_selected {
        bail!("none of the requested months are available");
    }
    Ok(state)
}

fn drive_run(mut state: AppState, runner: &mut EffectRunner) -> AppState {
    loop {
        match runner.poll() {
            Some(msg) => {
                state = dispatch(state, msg, runner);
                if state.consume_dirty() {
                    let view = state.view();
                    exporter_info!("{} ({:.0}%)", view.status_line, view.progress * 100.0);
                }
                if matches!(
                    state.run_state(),
                    RunState::Completed | RunState::Aborted | RunState::Failed
                ) {
                    return state;
                }
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

fn print_archives(view: &AppViewModel) {
    for row in &view.archives {
        println!("{:>4} {}", row.year, row.month_name);
    }
}
