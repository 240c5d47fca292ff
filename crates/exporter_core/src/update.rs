use crate::{AppState, Effect, Msg, RunState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PlayerInputChanged(text) => {
            state.set_player_input(text);
            Vec::new()
        }
        Msg::PlayerSubmitted => {
            let player = state.player_input().trim().to_string();
            if player.is_empty() || state.is_listing() {
                return (state, Vec::new());
            }
            state.begin_listing();
            vec![Effect::LoadArchives { player }]
        }
        Msg::ArchivesLoaded(result) => {
            // A failed listing degrades to a loaded-but-empty list; the
            // frontend already logged the cause.
            state.finish_listing(result.unwrap_or_default());
            Vec::new()
        }
        Msg::ArchiveToggled { index } => {
            state.toggle_archive(index);
            Vec::new()
        }
        Msg::SelectAll => {
            state.set_all_selected(true);
            Vec::new()
        }
        Msg::SelectNone => {
            state.set_all_selected(false);
            Vec::new()
        }
        Msg::ExportRequested { target } => {
            // One run at a time: a trigger while Running is rejected, not
            // treated as a cancellation request.
            if state.run_state() == RunState::Running {
                return (state, Vec::new());
            }
            let selection = state.selected_urls();
            if selection.is_empty() {
                return (state, Vec::new());
            }
            state.begin_run();
            vec![Effect::StartExport { selection, target }]
        }
        Msg::CancelRequested => {
            if state.run_state() == RunState::Running {
                vec![Effect::CancelExport]
            } else {
                Vec::new()
            }
        }
        Msg::ExportProgress(progress) => {
            // Out-of-range values from a misbehaving producer are dropped
            // rather than displayed.
            if (0.0..=1.0).contains(&progress) {
                state.apply_progress(progress);
            }
            Vec::new()
        }
        Msg::ExportFinished(outcome) => {
            state.apply_outcome(outcome);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
