use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use exporter_core::{ArchiveEntry, Effect, ExportOutcome, ExportTarget, ListingFailure, Msg};
use exporter_engine::{ApiError, ArchiveId, EngineHandle, ExportEvent, FileSink, MemorySink};
use exporter_logging::{exporter_info, exporter_warn};

/// Executes core effects against the engine and maps engine events back
/// into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    output_path: PathBuf,
    /// Shared buffer of a clipboard-style run, drained after completion.
    clipboard: Option<Arc<Mutex<String>>>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, output_path: PathBuf) -> Self {
        Self {
            engine,
            output_path,
            clipboard: None,
        }
    }

    pub fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadArchives { player } => {
                    exporter_info!("listing archives for {player}");
                    self.engine.list_archives(player);
                }
                Effect::StartExport { selection, target } => {
                    exporter_info!("starting export of {} archives", selection.len());
                    let selection: Vec<ArchiveId> =
                        selection.into_iter().map(ArchiveId::new).collect();
                    match target {
                        ExportTarget::File => {
                            self.clipboard = None;
                            self.engine.start_export(
                                selection,
                                Box::new(FileSink::new(self.output_path.clone())),
                            );
                        }
                        ExportTarget::Clipboard => {
                            let sink = MemorySink::new();
                            self.clipboard = Some(sink.buffer());
                            self.engine.start_export(selection, Box::new(sink));
                        }
                    }
                }
                Effect::CancelExport => {
                    exporter_info!("cancelling in-flight export");
                    self.engine.cancel_export();
                }
            }
        }
    }

    /// Non-blocking poll translating the next engine event into a message.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    /// Contents of the in-memory buffer after a clipboard-style run.
    pub fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take().map(|buffer| match buffer.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        })
    }
}

fn map_event(event: ExportEvent) -> Msg {
    match event {
        ExportEvent::ArchivesListed { player, result } => match result {
            Ok(archives) => {
                exporter_info!("loaded {} archives for {player}", archives.len());
                Msg::ArchivesLoaded(Ok(archives.iter().map(to_entry).collect()))
            }
            Err(err) => {
                exporter_warn!("archive listing for {player} failed: {err}");
                Msg::ArchivesLoaded(Err(to_listing_failure(&err)))
            }
        },
        ExportEvent::ExportProgress(progress) => Msg::ExportProgress(progress),
        ExportEvent::ExportFinished(outcome) => Msg::ExportFinished(to_outcome(outcome)),
    }
}

fn to_entry(archive: &ArchiveId) -> ArchiveEntry {
    ArchiveEntry::new(archive.as_str(), archive.year(), archive.month())
}

fn to_listing_failure(err: &ApiError) -> ListingFailure {
    match err {
        ApiError::Status(404) => ListingFailure::NotFound,
        ApiError::Decode(_) => ListingFailure::Decode,
        _ => ListingFailure::Transport,
    }
}

fn to_outcome(outcome: exporter_engine::ExportOutcome) -> ExportOutcome {
    match outcome {
        exporter_engine::ExportOutcome::Completed => ExportOutcome::Completed,
        exporter_engine::ExportOutcome::Aborted => ExportOutcome::Aborted,
        exporter_engine::ExportOutcome::Failed(message) => ExportOutcome::Failed(message),
    }
}
