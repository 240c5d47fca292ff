use std::sync::{mpsc, Arc};

use exporter_logging::exporter_warn;
use tokio_util::sync::CancellationToken;

use crate::client::ChesscomApi;
use crate::sink::ExportSink;
use crate::types::{ArchiveId, ExportEvent, ExportOutcome};

/// One-way stream of engine events consumed by the frontend loop. Emitting
/// must never block: a slow consumer drains to the latest value on its own
/// schedule.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ExportEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ExportEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ExportEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ExportEvent) {
        let _ = self.tx.send(event);
    }
}

/// Fetches a selection of archives in order, accumulating every game's
/// notation into one buffer that is handed to the sink only when the run
/// completes. The buffer is owned by the run and never observed elsewhere
/// before that hand-off.
pub struct ExportPipeline {
    api: Arc<dyn ChesscomApi>,
}

impl ExportPipeline {
    pub fn new(api: Arc<dyn ChesscomApi>) -> Self {
        Self { api }
    }

    /// Runs one export over `selection` in its given order.
    ///
    /// The cancellation token is polled before each archive; an abort
    /// resets progress to zero and discards the accumulated buffer without
    /// touching the sink. A failed fetch skips that archive and the run
    /// continues. In-flight progress is emitted as `index / total` with the
    /// pre-increment index, so `1.0` is only ever sent by the final emit
    /// once the sink has accepted the buffer.
    pub async fn run(
        &self,
        selection: &[ArchiveId],
        mut sink: Box<dyn ExportSink>,
        cancel: CancellationToken,
        progress: &dyn ProgressSink,
    ) -> ExportOutcome {
        // Reset whatever a previous run left on the display.
        progress.emit(ExportEvent::ExportProgress(0.0));

        let total = selection.len();
        let mut buffer = String::new();
        for (index, archive) in selection.iter().enumerate() {
            if cancel.is_cancelled() {
                progress.emit(ExportEvent::ExportProgress(0.0));
                return ExportOutcome::Aborted;
            }

            let document = match self.api.fetch_archive(archive).await {
                Ok(document) => document,
                Err(err) => {
                    exporter_warn!("skipping archive {}: {}", archive.as_str(), err);
                    continue;
                }
            };
            for game in &document.games {
                buffer.push_str(&game.pgn);
                buffer.push('\n');
            }

            progress.emit(ExportEvent::ExportProgress(index as f32 / total as f32));
        }

        if let Err(err) = sink.write(&buffer) {
            progress.emit(ExportEvent::ExportProgress(0.0));
            return ExportOutcome::Failed(err.to_string());
        }
        progress.emit(ExportEvent::ExportProgress(1.0));
        ExportOutcome::Completed
    }
}
