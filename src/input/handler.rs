use crate::app::{AppState, EditFormState};
use crate::clock::Clock;
use crate::domain::UiMode;
use crate::persistence::KeyValueStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key<S: KeyValueStore, C: Clock>(app: &mut AppState<S, C>, key: KeyEvent) -> bool {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::ConfirmDiscard => {
            handle_confirm_discard_mode(app, key);
            false
        }
        UiMode::EditingTitle => {
            handle_title_mode(app, key);
            false
        }
        UiMode::EditingSession => {
            handle_edit_form_mode(app, key);
            false
        }
    }
}

/// Handle keys in normal mode
fn handle_normal_mode<S: KeyValueStore, C: Clock>(app: &mut AppState<S, C>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,

        // Timer
        KeyCode::Char('s') => app.start_timer(),
        KeyCode::Char(' ') => app.toggle_pause(),
        KeyCode::Char('e') => app.end_timer(),
        KeyCode::Char('x') => app.request_discard(),

        // Next run's selection
        KeyCode::Char('k') => app.cycle_draft_kind(),
        KeyCode::Tab => app.cycle_draft_subject(),
        KeyCode::Char('c') => app.cycle_draft_chapter(),
        KeyCode::Char('m') => app.cycle_draft_material(),
        KeyCode::Char('n') => app.cycle_draft_task(),
        KeyCode::Char('t') => app.begin_title_edit(),

        // Sessions
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        KeyCode::Enter => app.begin_session_edit(),
        KeyCode::Char('d') => app.delete_selected_session(),

        KeyCode::Char('v') => app.cycle_stats_subject(),
        _ => {}
    }
    false
}

fn handle_confirm_discard_mode<S: KeyValueStore, C: Clock>(app: &mut AppState<S, C>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.discard_timer(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.ui_mode = UiMode::Normal,
        _ => {}
    }
}

fn handle_title_mode<S: KeyValueStore, C: Clock>(app: &mut AppState<S, C>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_title_edit(),
        KeyCode::Esc => app.ui_mode = UiMode::Normal,
        KeyCode::Backspace => {
            app.title_input.pop();
        }
        KeyCode::Char(c) => app.title_input.push(c),
        _ => {}
    }
}

fn handle_edit_form_mode<S: KeyValueStore, C: Clock>(app: &mut AppState<S, C>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_session_edit(),
        KeyCode::Esc => app.cancel_session_edit(),
        _ => {
            let Some(form) = app.edit_form.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Tab => {
                    form.editing_field = (form.editing_field + 1) % EditFormState::FIELD_COUNT;
                }
                KeyCode::BackTab => {
                    form.editing_field = (form.editing_field + EditFormState::FIELD_COUNT - 1)
                        % EditFormState::FIELD_COUNT;
                }
                KeyCode::Backspace => {
                    form.current_field_mut().pop();
                }
                KeyCode::Char(c) => form.current_field_mut().push(c),
                _ => {}
            }
        }
    }
}
