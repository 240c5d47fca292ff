use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use exporter_engine::{
    ApiError, ArchiveId, ChesscomApi, ExportEvent, ExportOutcome, ExportPipeline, ExportSink,
    Game, MemorySink, MonthlyGames, ProgressSink, SinkError,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

const JULY: &str = "https://api.chess.com/pub/player/erik/games/2007/07";
const AUGUST: &str = "https://api.chess.com/pub/player/erik/games/2007/08";
const SEPTEMBER: &str = "https://api.chess.com/pub/player/erik/games/2007/09";

fn games(pgns: &[&str]) -> MonthlyGames {
    MonthlyGames {
        games: pgns
            .iter()
            .map(|pgn| Game {
                pgn: pgn.to_string(),
                ..Game::default()
            })
            .collect(),
    }
}

#[derive(Default)]
struct StubApi {
    documents: HashMap<ArchiveId, Result<MonthlyGames, ApiError>>,
    cancel_on_first_fetch: Option<CancellationToken>,
    fetched: Mutex<Vec<ArchiveId>>,
}

impl StubApi {
    fn new() -> Self {
        Self::default()
    }

    fn with_document(mut self, url: &str, document: Result<MonthlyGames, ApiError>) -> Self {
        self.documents.insert(ArchiveId::from(url), document);
        self
    }

    fn fetched(&self) -> Vec<ArchiveId> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChesscomApi for StubApi {
    async fn list_archives(&self, _player: &str) -> Result<Vec<ArchiveId>, ApiError> {
        Ok(self.documents.keys().cloned().collect())
    }

    async fn fetch_archive(&self, archive: &ArchiveId) -> Result<MonthlyGames, ApiError> {
        let mut fetched = self.fetched.lock().unwrap();
        if fetched.is_empty() {
            if let Some(cancel) = &self.cancel_on_first_fetch {
                cancel.cancel();
            }
        }
        fetched.push(archive.clone());
        self.documents
            .get(archive)
            .cloned()
            .unwrap_or(Err(ApiError::Status(404)))
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ExportEvent>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self::default()
    }

    fn progress_values(&self) -> Vec<f32> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ExportEvent::ExportProgress(value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ExportEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Sink that records every hand-off it receives.
#[derive(Clone, Default)]
struct ProbeSink {
    writes: Arc<Mutex<Vec<String>>>,
}

impl ProbeSink {
    fn new() -> Self {
        Self::default()
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ExportSink for ProbeSink {
    fn write(&mut self, content: &str) -> Result<(), SinkError> {
        self.writes.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

struct FailingSink;

impl ExportSink for FailingSink {
    fn write(&mut self, _content: &str) -> Result<(), SinkError> {
        Err(SinkError::OutputDir("disk full".to_string()))
    }
}

fn selection(urls: &[&str]) -> Vec<ArchiveId> {
    urls.iter().map(|url| ArchiveId::from(*url)).collect()
}

#[tokio::test]
async fn games_are_concatenated_in_selection_order() {
    let api = StubApi::new()
        .with_document(JULY, Ok(games(&["1. e4 e5", "1. d4 d5"])))
        .with_document(AUGUST, Ok(games(&["1. c4 c5"])));
    let pipeline = ExportPipeline::new(Arc::new(api));
    let sink = MemorySink::new();
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[JULY, AUGUST]),
            Box::new(sink.clone()),
            CancellationToken::new(),
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Completed);
    assert_eq!(sink.contents(), "1. e4 e5\n1. d4 d5\n1. c4 c5\n");
    assert_eq!(progress.progress_values(), vec![0.0, 0.0, 0.5, 1.0]);
}

#[tokio::test]
async fn failed_archive_is_skipped_and_the_run_completes() {
    let api = StubApi::new()
        .with_document(JULY, Ok(games(&["game one"])))
        .with_document(AUGUST, Err(ApiError::Timeout))
        .with_document(SEPTEMBER, Ok(games(&["game three"])));
    let pipeline = ExportPipeline::new(Arc::new(api));
    let sink = MemorySink::new();
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[JULY, AUGUST, SEPTEMBER]),
            Box::new(sink.clone()),
            CancellationToken::new(),
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Completed);
    assert_eq!(sink.contents(), "game one\ngame three\n");
    // The failed item emits no in-flight value of its own.
    assert_eq!(
        progress.progress_values(),
        vec![0.0, 0.0, 2.0 / 3.0, 1.0]
    );
}

#[tokio::test]
async fn cancellation_before_any_work_discards_everything() {
    let api = StubApi::new().with_document(JULY, Ok(games(&["game one"])));
    let pipeline = ExportPipeline::new(Arc::new(api));
    let sink = ProbeSink::new();
    let progress = RecordingSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = pipeline
        .run(
            &selection(&[JULY, AUGUST]),
            Box::new(sink.clone()),
            cancel,
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Aborted);
    assert!(sink.writes().is_empty());
    assert_eq!(progress.progress_values(), vec![0.0, 0.0]);
}

#[tokio::test]
async fn cancellation_mid_run_never_reaches_the_sink() {
    let cancel = CancellationToken::new();
    let mut api = StubApi::new()
        .with_document(JULY, Ok(games(&["game one"])))
        .with_document(AUGUST, Ok(games(&["game two"])));
    api.cancel_on_first_fetch = Some(cancel.clone());
    let api = Arc::new(api);
    let pipeline = ExportPipeline::new(api.clone());
    let sink = ProbeSink::new();
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[JULY, AUGUST]),
            Box::new(sink.clone()),
            cancel,
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Aborted);
    // Only the first archive was fetched; the abort was observed at the
    // next item boundary.
    assert_eq!(api.fetched(), selection(&[JULY]));
    assert!(sink.writes().is_empty());
    assert_eq!(progress.progress_values(), vec![0.0, 0.0, 0.0]);
}

#[tokio::test]
async fn empty_selection_delivers_an_empty_export() {
    let pipeline = ExportPipeline::new(Arc::new(StubApi::new()));
    let sink = ProbeSink::new();
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[]),
            Box::new(sink.clone()),
            CancellationToken::new(),
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Completed);
    assert_eq!(sink.writes(), vec![String::new()]);
    assert_eq!(progress.progress_values(), vec![0.0, 1.0]);
}

#[tokio::test]
async fn sink_failure_fails_the_run_and_resets_progress() {
    let api = StubApi::new().with_document(JULY, Ok(games(&["game one"])));
    let pipeline = ExportPipeline::new(Arc::new(api));
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[JULY]),
            Box::new(FailingSink),
            CancellationToken::new(),
            &progress,
        )
        .await;

    match outcome {
        ExportOutcome::Failed(message) => assert!(message.contains("disk full")),
        other => panic!("expected a failed run, got {other:?}"),
    }
    assert_eq!(progress.progress_values(), vec![0.0, 0.0, 0.0]);
}

#[tokio::test]
async fn in_flight_progress_is_non_decreasing() {
    let api = StubApi::new()
        .with_document(JULY, Ok(games(&["a"])))
        .with_document(AUGUST, Ok(games(&["b"])))
        .with_document(SEPTEMBER, Ok(games(&["c"])));
    let pipeline = ExportPipeline::new(Arc::new(api));
    let progress = RecordingSink::new();

    let outcome = pipeline
        .run(
            &selection(&[JULY, AUGUST, SEPTEMBER]),
            Box::new(MemorySink::new()),
            CancellationToken::new(),
            &progress,
        )
        .await;

    assert_eq!(outcome, ExportOutcome::Completed);
    let values = progress.progress_values();
    assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(values.last(), Some(&1.0));
}
