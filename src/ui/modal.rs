use crate::app::AppState;
use crate::clock::format_clock;
use crate::domain::UiMode;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the discard confirmation
pub fn render_confirm_discard(f: &mut Frame, app: &AppState, area: Rect) {
    if app.ui_mode != UiMode::ConfirmDiscard {
        return;
    }
    let modal_area = create_modal_area(area, 9);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let lines = vec![
        Line::raw(""),
        Line::raw(format!(
            "  Throw away {} of unrecorded study time?",
            format_clock(app.timer.elapsed_seconds())
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [y]", modal_title_style()),
            Span::raw(" Discard  "),
            Span::styled("[n]", modal_title_style()),
            Span::raw(" Keep running"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Discard Run ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the custom title prompt
pub fn render_title_input(f: &mut Frame, app: &AppState, area: Rect) {
    if app.ui_mode != UiMode::EditingTitle {
        return;
    }
    let modal_area = create_modal_area(area, 7);
    f.render_widget(Clear, modal_area);

    let lines = vec![
        Line::raw(""),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(app.title_input.clone(), modal_title_style()),
            Span::styled("█", modal_title_style()), // Cursor
        ]),
        Line::raw(""),
        Line::raw("Enter to confirm  ·  Esc to cancel"),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Session Title ", modal_title_style()))
            .style(modal_bg_style()),
    );

    f.render_widget(paragraph, modal_area);
}
