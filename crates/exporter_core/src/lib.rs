//! Exporter core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, ExportTarget};
pub use msg::Msg;
pub use state::{AppState, ArchiveEntry, ExportOutcome, ListingFailure, RunState};
pub use update::update;
pub use view_model::{month_name, AppViewModel, ArchiveRowView, ExportAction};
