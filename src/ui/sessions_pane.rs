use crate::app::AppState;
use crate::clock::format_clock;
use crate::ui::styles::{border_style, default_style, selected_style, subject_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the recorded sessions, newest first
pub fn render_sessions_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(
            format!(" Sessions ({}) ", app.ledger.len()),
            title_style(),
        ));

    let sessions = app.sessions_newest_first();
    if sessions.is_empty() {
        let empty = Paragraph::new("No sessions yet. Press s to start the timer.").block(block);
        f.render_widget(empty, area);
        return;
    }

    // Keep the selected row on screen
    let visible = area.height.saturating_sub(2) as usize;
    let offset = if visible > 0 && app.selected_index >= visible {
        app.selected_index + 1 - visible
    } else {
        0
    };

    let items: Vec<ListItem> = sessions
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(index, session)| {
            let line = Line::from(vec![
                Span::raw(format!("{} ", session.local_end().format("%m-%d %H:%M"))),
                Span::raw(format!("{} ", format_clock(session.duration))),
                Span::styled(
                    format!("{:<9} ", session.subject.map(|s| s.name()).unwrap_or("-")),
                    subject_style(),
                ),
                Span::raw(session.title.clone()),
            ]);
            let style = if index == app.selected_index {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
