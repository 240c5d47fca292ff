use std::sync::{mpsc, Arc};
use std::thread;

use tokio_util::sync::CancellationToken;

use crate::client::{ChesscomApi, ChesscomClient, ClientSettings};
use crate::pipeline::{ChannelProgressSink, ExportPipeline};
use crate::sink::ExportSink;
use crate::types::{ApiError, ArchiveId, ExportEvent};

enum EngineCommand {
    ListArchives {
        player: String,
    },
    StartExport {
        selection: Vec<ArchiveId>,
        sink: Box<dyn ExportSink>,
    },
    CancelExport,
}

/// Handle to the engine worker: a dedicated thread owning a tokio runtime,
/// fed through a command channel and reporting through an event channel.
/// The frontend polls `try_recv` and is never blocked by in-flight work.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<ExportEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = ChesscomClient::new(settings)?;
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Builds a handle over any API implementation; the seam tests use.
    pub fn with_api(api: Arc<dyn ChesscomApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // Token for the in-flight run; taken on cancel, so the signal
            // is single-shot and a fresh run always gets a fresh token.
            let mut active_cancel: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::ListArchives { player } => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.list_archives(&player).await;
                            let _ = event_tx.send(ExportEvent::ArchivesListed { player, result });
                        });
                    }
                    EngineCommand::StartExport { selection, sink } => {
                        let cancel = CancellationToken::new();
                        active_cancel = Some(cancel.clone());
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let pipeline = ExportPipeline::new(api);
                            let progress = ChannelProgressSink::new(event_tx.clone());
                            let outcome = pipeline.run(&selection, sink, cancel, &progress).await;
                            let _ = event_tx.send(ExportEvent::ExportFinished(outcome));
                        });
                    }
                    EngineCommand::CancelExport => {
                        // Harmless with no run in flight; the token is then
                        // simply never observed.
                        if let Some(cancel) = active_cancel.take() {
                            cancel.cancel();
                        }
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn list_archives(&self, player: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::ListArchives {
            player: player.into(),
        });
    }

    /// Starts one export run. Exactly one run is expected at a time; the
    /// state machine upstream rejects a second trigger while one is active.
    pub fn start_export(&self, selection: Vec<ArchiveId>, sink: Box<dyn ExportSink>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartExport { selection, sink });
    }

    pub fn cancel_export(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelExport);
    }

    pub fn try_recv(&self) -> Option<ExportEvent> {
        self.event_rx.try_recv().ok()
    }
}
