use crate::app::AppState;
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

const FIELD_LABELS: [&str; 4] = [
    "Title:",
    "Subject (physics / chemistry / maths, blank keeps):",
    "Material (blank clears):",
    "Duration (HH:MM:SS, 45m, 1h30m):",
];

/// Render the form for editing a recorded session
pub fn render_edit_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.edit_form else {
        return;
    };
    let modal_area = create_modal_area(area, 17);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let values = [&form.title, &form.subject, &form.material, &form.duration];
    let mut lines = Vec::new();

    for (index, (label, value)) in FIELD_LABELS.iter().zip(values).enumerate() {
        let editing = form.editing_field == index;
        lines.push(Line::raw(""));
        lines.push(Line::raw(if editing {
            format!("{} (editing)", label)
        } else {
            label.to_string()
        }));
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(value.as_str(), modal_title_style()),
            if editing {
                Span::styled("█", modal_title_style()) // Cursor
            } else {
                Span::raw("")
            },
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::raw("Tab to switch fields  ·  Enter to save  ·  Esc to cancel"));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Edit Session ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
