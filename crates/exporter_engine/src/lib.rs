//! Exporter engine: remote archive access and the batch export pipeline.
mod client;
mod engine;
mod pipeline;
mod sink;
mod types;

pub use client::{ChesscomApi, ChesscomClient, ClientSettings};
pub use engine::EngineHandle;
pub use pipeline::{ChannelProgressSink, ExportPipeline, ProgressSink};
pub use sink::{write_atomic, ExportSink, FileSink, MemorySink, SinkError};
pub use types::{
    ApiError, ArchiveId, ArchiveList, ExportEvent, ExportOutcome, Game, GamePlayer, MonthlyGames,
};
