use crate::view_model::{month_name, AppViewModel, ArchiveRowView, ExportAction};

/// One monthly archive row, kept in the order the listing endpoint
/// returned it. Display reverses this order; the export snapshot does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub url: String,
    pub year: i32,
    pub month: i32,
    pub selected: bool,
}

impl ArchiveEntry {
    pub fn new(url: impl Into<String>, year: i32, month: i32) -> Self {
        Self {
            url: url.into(),
            year,
            month,
            selected: false,
        }
    }
}

/// Lifecycle of one export run. Terminal states keep their label until the
/// next run starts; a new run may begin from any state except `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Aborted,
    Failed,
}

/// Why listing a player's archives failed. A failed listing is surfaced as
/// an empty archive list and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFailure {
    NotFound,
    Transport,
    Decode,
}

/// Terminal result of one export run, as reported by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed,
    Aborted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    player_input: String,
    archives_loading: bool,
    archives: Option<Vec<ArchiveEntry>>,
    run: RunState,
    run_error: Option<String>,
    progress: f32,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let archives: Vec<ArchiveRowView> = match &self.archives {
            Some(entries) => entries
                .iter()
                .enumerate()
                .rev()
                .map(|(index, entry)| ArchiveRowView {
                    index,
                    year: entry.year,
                    month: entry.month,
                    month_name: month_name(entry.month),
                    selected: entry.selected,
                })
                .collect(),
            None => Vec::new(),
        };
        let any_selected = self.entries().iter().any(|entry| entry.selected);

        AppViewModel {
            player_input: self.player_input.clone(),
            archives_loading: self.archives_loading,
            archives_loaded: self.archives.is_some(),
            archives,
            any_selected,
            export_action: if self.run == RunState::Running {
                ExportAction::Cancel
            } else {
                ExportAction::Start
            },
            status_line: self.status_line(),
            progress: self.progress,
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    fn status_line(&self) -> String {
        match self.run {
            RunState::Idle => String::new(),
            RunState::Running => "In progress".to_string(),
            RunState::Completed => "Success!".to_string(),
            RunState::Aborted => "Aborted.".to_string(),
            RunState::Failed => {
                format!("Error: {}", self.run_error.as_deref().unwrap_or("unknown"))
            }
        }
    }

    fn entries(&self) -> &[ArchiveEntry] {
        self.archives.as_deref().unwrap_or(&[])
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_player_input(&mut self, text: String) {
        if self.player_input != text {
            self.player_input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn player_input(&self) -> &str {
        &self.player_input
    }

    pub(crate) fn is_listing(&self) -> bool {
        self.archives_loading
    }

    pub(crate) fn begin_listing(&mut self) {
        self.archives = None;
        self.archives_loading = true;
        self.mark_dirty();
    }

    pub(crate) fn finish_listing(&mut self, entries: Vec<ArchiveEntry>) {
        self.archives = Some(entries);
        self.archives_loading = false;
        self.mark_dirty();
    }

    pub(crate) fn toggle_archive(&mut self, index: usize) {
        if let Some(entry) = self.archives.as_mut().and_then(|a| a.get_mut(index)) {
            entry.selected = !entry.selected;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_all_selected(&mut self, selected: bool) {
        if let Some(entries) = self.archives.as_mut() {
            for entry in entries.iter_mut() {
                entry.selected = selected;
            }
            self.mark_dirty();
        }
    }

    /// Immutable snapshot of the selected archive URLs, in listing order.
    /// Taken before the worker starts so later checkbox edits cannot race
    /// with an in-flight run.
    pub(crate) fn selected_urls(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|entry| entry.selected)
            .map(|entry| entry.url.clone())
            .collect()
    }

    pub(crate) fn begin_run(&mut self) {
        self.run = RunState::Running;
        self.run_error = None;
        self.progress = 0.0;
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(&mut self, progress: f32) {
        self.progress = progress;
        self.mark_dirty();
    }

    pub(crate) fn apply_outcome(&mut self, outcome: ExportOutcome) {
        self.run = match outcome {
            ExportOutcome::Completed => RunState::Completed,
            ExportOutcome::Aborted => RunState::Aborted,
            ExportOutcome::Failed(message) => {
                self.run_error = Some(message);
                RunState::Failed
            }
        };
        self.mark_dirty();
    }
}
