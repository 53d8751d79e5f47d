pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod modal;
pub mod sessions_pane;
pub mod stats_pane;
pub mod styles;
pub mod timer_pane;

use crate::app::AppState;
use input_form::render_edit_form;
use keybindings::render_keybindings;
use layout::create_layout;
use modal::{render_confirm_discard, render_title_input};
use ratatui::{widgets::Paragraph, Frame};
use sessions_pane::render_sessions_pane;
use stats_pane::render_stats_pane;
use styles::hint_style;
use timer_pane::render_timer_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, layout.keybindings_area);
    render_timer_pane(f, app, layout.timer_area);
    render_sessions_pane(f, app, layout.sessions_area);
    render_stats_pane(f, app, layout.stats_area);

    let status = app.status_message.as_deref().unwrap_or("");
    f.render_widget(Paragraph::new(format!(" {}", status)).style(hint_style()), layout.status_area);

    // Overlays, at most one is active
    render_confirm_discard(f, app, size);
    render_title_input(f, app, size);
    render_edit_form(f, app, size);
}
