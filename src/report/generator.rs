use crate::clock::format_duration;
use crate::domain::{StudySession, Subject};
use crate::report::stats::{
    daily_totals, filtered_duration, material_totals, subject_distribution,
    top_chapters_by_subject, total_duration, SessionFilter,
};

/// What to include in a report
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub filter: SessionFilter,
    pub top_chapters_limit: usize,
    pub report_days: usize,
}

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn describe_filter(filter: &SessionFilter) -> String {
    let mut parts = Vec::new();
    if let Some(subject) = filter.subject {
        parts.push(format!("subject = {}", subject.name()));
    }
    if let Some(chapter) = filter.chapter {
        parts.push(format!("chapter = {}", chapter));
    }
    if let Some(material) = &filter.material {
        parts.push(format!("material = {}", material));
    }
    parts.join(", ")
}

/// Render a Markdown study report over the given sessions
pub fn generate_report(sessions: &[StudySession], options: &ReportOptions) -> String {
    let total = total_duration(sessions);
    let distribution = subject_distribution(sessions);

    let mut report = String::new();
    report.push_str("# Study Report\n\n");

    // Summary Section
    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **Sessions:** {}\n", sessions.len()));
    report.push_str(&format!("- **Total Time:** {}\n", format_duration(total)));
    if !options.filter.is_unconstrained() {
        let filtered = filtered_duration(sessions, &options.filter);
        report.push_str(&format!(
            "- **Filtered Time** ({}): {}\n",
            describe_filter(&options.filter),
            format_duration(filtered)
        ));
    }
    report.push('\n');

    // Subject Distribution
    report.push_str("## Time by Subject\n\n");
    report.push_str("| Subject | Time | Share |\n");
    report.push_str("|---------|------|-------|\n");
    for subject in Subject::all() {
        let seconds = distribution.for_subject(*subject);
        report.push_str(&format!(
            "| {} | {} | {} |\n",
            subject.name(),
            format_duration(seconds),
            format_percent(distribution.percent(seconds))
        ));
    }
    report.push_str(&format!(
        "| Custom | {} | {} |\n\n",
        format_duration(distribution.custom),
        format_percent(distribution.percent(distribution.custom))
    ));

    // Top chapters per subject
    report.push_str("## Top Chapters\n\n");
    let mut any_chapters = false;
    for subject in Subject::all() {
        let top = top_chapters_by_subject(sessions, *subject, options.top_chapters_limit);
        if top.is_empty() {
            continue;
        }
        any_chapters = true;
        report.push_str(&format!("### {}\n\n", subject.name()));
        for (rank, chapter) in top.iter().enumerate() {
            report.push_str(&format!(
                "{}. Ch {} {} - {}\n",
                rank + 1,
                chapter.serial,
                chapter.name,
                format_duration(chapter.seconds)
            ));

            let materials = material_totals(sessions, *subject, chapter.serial);
            for (material, seconds) in materials {
                report.push_str(&format!("   - {}: {}\n", material, format_duration(seconds)));
            }
        }
        report.push('\n');
    }
    if !any_chapters {
        report.push_str("_No chapter sessions recorded._\n\n");
    }

    // Daily breakdown, most recent days only
    report.push_str("## Daily Breakdown\n\n");
    let days = daily_totals(sessions);
    if days.is_empty() {
        report.push_str("_No sessions recorded._\n");
    } else {
        let skip = days.len().saturating_sub(options.report_days);
        for (date, seconds) in days.iter().skip(skip) {
            report.push_str(&format!("- {}: {}\n", date, format_duration(*seconds)));
        }
    }

    report
}
