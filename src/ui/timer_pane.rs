use crate::app::{AppState, DraftKind};
use crate::clock::format_clock;
use crate::timer::TimerState;
use crate::ui::styles::{border_style, default_style, status_style, subject_style, title_style};
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the timer readout and the selection for the current or next run
pub fn render_timer_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let status = app.timer.status();
    let elapsed = app.timer.elapsed_seconds();

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", status.to_tag()), status_style(status)),
        Span::styled(format_clock(elapsed), status_style(status)),
    ]));
    lines.push(Line::raw(""));

    match app.timer.selection() {
        Some(selection) => {
            lines.push(Line::from(vec![
                Span::styled("Studying: ", title_style()),
                Span::raw(selection.title()),
            ]));
            let started = match app.timer.state() {
                TimerState::Running(run) => Some(run.session_started_at),
                TimerState::Paused(paused) => Some(paused.session_started_at),
                TimerState::Idle => None,
            };
            if let Some(started) = started {
                lines.push(Line::from(vec![
                    Span::styled("Since:    ", title_style()),
                    Span::raw(started.with_timezone(&Local).format("%H:%M").to_string()),
                ]));
            }
        }
        None => {
            let next = app.draft.selection(&app.syllabus, &app.tasks);
            lines.push(Line::from(vec![
                Span::styled("Next:     ", title_style()),
                Span::raw(next.title()),
            ]));
            lines.push(draft_line(app));
        }
    }

    let paragraph = Paragraph::new(lines).style(default_style()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Timer ", title_style())),
    );
    f.render_widget(paragraph, area);
}

fn draft_line(app: &AppState) -> Line<'static> {
    let draft = &app.draft;
    match draft.kind {
        DraftKind::Chapter => {
            let chapter = app
                .syllabus
                .chapter_name(draft.subject, draft.chapter_serial)
                .unwrap_or("not in syllabus")
                .to_string();
            Line::from(vec![
                Span::styled("Chapter:  ", title_style()),
                Span::styled(draft.subject.name(), subject_style()),
                Span::raw(format!(" · Ch {} {}", draft.chapter_serial, chapter)),
                Span::raw(match &draft.material {
                    Some(material) => format!(" · {}", material),
                    None => String::new(),
                }),
            ])
        }
        DraftKind::Custom => Line::from(vec![
            Span::styled("Custom:   ", title_style()),
            Span::raw("press t to set a title"),
        ]),
        DraftKind::Task => {
            let pending = app.tasks.pending().count();
            Line::from(vec![
                Span::styled("Task:     ", title_style()),
                Span::raw(format!("{} pending, n for next", pending)),
            ])
        }
    }
}
