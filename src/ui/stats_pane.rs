use crate::app::AppState;
use crate::clock::format_duration;
use crate::domain::Subject;
use crate::report::{subject_distribution, top_chapters_by_subject, total_duration};
use crate::ui::styles::{border_style, gauge_style, subject_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const BAR_WIDTH: usize = 20;

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Render subject distribution and the top chapters of the chosen subject
pub fn render_stats_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let sessions = app.ledger.sessions();
    let distribution = subject_distribution(sessions);

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("Total: ", title_style()),
        Span::raw(format_duration(total_duration(sessions))),
    ]));
    lines.push(Line::raw(""));

    let mut rows: Vec<(&str, u64)> = Subject::all()
        .iter()
        .map(|s| (s.name(), distribution.for_subject(*s)))
        .collect();
    rows.push(("Custom", distribution.custom));

    for (name, seconds) in rows {
        let percent = distribution.percent(seconds);
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", name), subject_style()),
            Span::styled(bar(percent), gauge_style()),
            Span::raw(format!(" {:>6}", format_duration(seconds))),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Top chapters: ", title_style()),
        Span::styled(app.stats_subject.name(), subject_style()),
    ]));

    let top = top_chapters_by_subject(sessions, app.stats_subject, app.config.top_chapters_limit);
    if top.is_empty() {
        lines.push(Line::raw("  none yet"));
    }
    for (rank, chapter) in top.iter().enumerate() {
        lines.push(Line::raw(format!(
            "  {}. Ch {} {} · {}",
            rank + 1,
            chapter.serial,
            chapter.name,
            format_duration(chapter.seconds)
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Stats ", title_style())),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
