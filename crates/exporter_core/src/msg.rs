use crate::effect::ExportTarget;
use crate::state::{ArchiveEntry, ExportOutcome, ListingFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the player name input box.
    PlayerInputChanged(String),
    /// User submitted the current player name to list their archives.
    PlayerSubmitted,
    /// Archive listing finished; rows arrive in the order the listing
    /// endpoint returned them.
    ArchivesLoaded(Result<Vec<ArchiveEntry>, ListingFailure>),
    /// Checkbox toggled for the archive at `index` (listing order).
    ArchiveToggled { index: usize },
    /// User clicked the "All" selection shortcut.
    SelectAll,
    /// User clicked the "None" selection shortcut.
    SelectNone,
    /// User triggered an export of the current selection.
    ExportRequested { target: ExportTarget },
    /// User asked to abort the in-flight export.
    CancelRequested,
    /// Pipeline progress in `[0, 1]`.
    ExportProgress(f32),
    /// Pipeline reached a terminal state.
    ExportFinished(ExportOutcome),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
