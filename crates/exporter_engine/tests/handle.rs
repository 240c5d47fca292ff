use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use exporter_engine::{
    ApiError, ArchiveId, ChesscomApi, EngineHandle, ExportEvent, ExportOutcome, Game, MemorySink,
    MonthlyGames,
};

const JULY: &str = "https://api.chess.com/pub/player/erik/games/2007/07";

struct OneMonthApi;

#[async_trait::async_trait]
impl ChesscomApi for OneMonthApi {
    async fn list_archives(&self, _player: &str) -> Result<Vec<ArchiveId>, ApiError> {
        Ok(vec![ArchiveId::from(JULY)])
    }

    async fn fetch_archive(&self, _archive: &ArchiveId) -> Result<MonthlyGames, ApiError> {
        Ok(MonthlyGames {
            games: vec![Game {
                pgn: "1. e4 e5 1-0".to_string(),
                ..Game::default()
            }],
        })
    }
}

fn next_event(handle: &EngineHandle) -> ExportEvent {
    let deadline = Duration::from_secs(5);
    let started = Instant::now();
    loop {
        if let Some(event) = handle.try_recv() {
            return event;
        }
        if started.elapsed() > deadline {
            panic!("no engine event within {deadline:?}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn listing_round_trips_through_the_worker() {
    let handle = EngineHandle::with_api(Arc::new(OneMonthApi));
    handle.list_archives("erik");

    match next_event(&handle) {
        ExportEvent::ArchivesListed { player, result } => {
            assert_eq!(player, "erik");
            assert_eq!(result.expect("listing ok"), vec![ArchiveId::from(JULY)]);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn export_round_trips_through_the_worker() {
    let handle = EngineHandle::with_api(Arc::new(OneMonthApi));
    let sink = MemorySink::new();
    handle.start_export(vec![ArchiveId::from(JULY)], Box::new(sink.clone()));

    let mut progress = Vec::new();
    loop {
        match next_event(&handle) {
            ExportEvent::ExportProgress(value) => progress.push(value),
            ExportEvent::ExportFinished(outcome) => {
                assert_eq!(outcome, ExportOutcome::Completed);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(progress, vec![0.0, 0.0, 1.0]);
    assert_eq!(sink.contents(), "1. e4 e5 1-0\n");
}

#[test]
fn cancel_without_a_run_is_harmless() {
    let handle = EngineHandle::with_api(Arc::new(OneMonthApi));
    handle.cancel_export();

    // The worker keeps serving commands afterwards.
    handle.list_archives("erik");
    match next_event(&handle) {
        ExportEvent::ArchivesListed { .. } => {}
        other => panic!("unexpected event {other:?}"),
    }
}
