use crate::domain::{SessionKind, StudySession, Subject};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Exact-match filter over sessions; `None` means no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub subject: Option<Subject>,
    pub chapter: Option<u32>,
    pub material: Option<String>,
}

impl SessionFilter {
    pub fn matches(&self, session: &StudySession) -> bool {
        if let Some(subject) = self.subject {
            if session.subject != Some(subject) {
                return false;
            }
        }
        if let Some(chapter) = self.chapter {
            if session.chapter_serial != Some(chapter) {
                return false;
            }
        }
        if let Some(material) = &self.material {
            if session.material.as_deref() != Some(material.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn is_unconstrained(&self) -> bool {
        self.subject.is_none() && self.chapter.is_none() && self.material.is_none()
    }
}

/// Seconds per subject plus a catch-all bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectDistribution {
    pub physics: u64,
    pub chemistry: u64,
    pub maths: u64,
    /// Custom and task sessions, and anything without a subject
    pub custom: u64,
}

impl SubjectDistribution {
    pub fn for_subject(&self, subject: Subject) -> u64 {
        match subject {
            Subject::Physics => self.physics,
            Subject::Chemistry => self.chemistry,
            Subject::Maths => self.maths,
        }
    }

    pub fn total(&self) -> u64 {
        self.physics
            .saturating_add(self.chemistry)
            .saturating_add(self.maths)
            .saturating_add(self.custom)
    }

    /// Share of the total in percent, 0.0 for an empty distribution
    pub fn percent(&self, seconds: u64) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        seconds as f64 / total as f64 * 100.0
    }
}

/// Time spent on one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterTotal {
    pub serial: u32,
    /// Name from the first session seen for this chapter
    pub name: String,
    pub seconds: u64,
}

/// Saturating sum, so absurd edited durations cannot overflow a total
fn sum_durations<'a>(sessions: impl Iterator<Item = &'a StudySession>) -> u64 {
    sessions.fold(0u64, |total, s| total.saturating_add(s.duration))
}

/// Sum of durations
pub fn total_duration(sessions: &[StudySession]) -> u64 {
    sum_durations(sessions.iter())
}

/// Sum of durations over sessions matching every constraint of `filter`
pub fn filtered_duration(sessions: &[StudySession], filter: &SessionFilter) -> u64 {
    sum_durations(sessions.iter().filter(|s| filter.matches(s)))
}

/// Split the total across the fixed subjects and the custom bucket.
/// Every session lands in exactly one bucket.
pub fn subject_distribution(sessions: &[StudySession]) -> SubjectDistribution {
    let mut distribution = SubjectDistribution::default();

    for session in sessions {
        let bucket = match (session.kind, session.subject) {
            (SessionKind::Chapter, Some(Subject::Physics)) => &mut distribution.physics,
            (SessionKind::Chapter, Some(Subject::Chemistry)) => &mut distribution.chemistry,
            (SessionKind::Chapter, Some(Subject::Maths)) => &mut distribution.maths,
            _ => &mut distribution.custom,
        };
        *bucket = bucket.saturating_add(session.duration);
    }

    distribution
}

/// Chapters of `subject` ranked by time spent, ties kept in first-seen order
pub fn top_chapters_by_subject(
    sessions: &[StudySession],
    subject: Subject,
    limit: usize,
) -> Vec<ChapterTotal> {
    let mut chapters: Vec<ChapterTotal> = Vec::new();

    for session in sessions {
        if session.subject != Some(subject) {
            continue;
        }
        let Some(serial) = session.chapter_serial else {
            continue;
        };

        match chapters.iter_mut().find(|c| c.serial == serial) {
            Some(chapter) => chapter.seconds = chapter.seconds.saturating_add(session.duration),
            None => chapters.push(ChapterTotal {
                serial,
                name: session
                    .chapter_name
                    .clone()
                    .unwrap_or_else(|| format!("Chapter {}", serial)),
                seconds: session.duration,
            }),
        }
    }

    // sort_by is stable, so equal totals keep encounter order
    chapters.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    chapters.truncate(limit);
    chapters
}

/// Seconds per local calendar day of the session start
pub fn daily_totals(sessions: &[StudySession]) -> BTreeMap<NaiveDate, u64> {
    let mut days = BTreeMap::new();
    for session in sessions {
        let day = days.entry(session.local_start().date_naive()).or_insert(0u64);
        *day = day.saturating_add(session.duration);
    }
    days
}

/// Seconds per material within one chapter, most studied first
pub fn material_totals(
    sessions: &[StudySession],
    subject: Subject,
    chapter: u32,
) -> Vec<(String, u64)> {
    let mut materials: Vec<(String, u64)> = Vec::new();

    for session in sessions {
        if session.subject != Some(subject) || session.chapter_serial != Some(chapter) {
            continue;
        }
        let Some(material) = &session.material else {
            continue;
        };
        match materials.iter_mut().find(|(name, _)| name == material) {
            Some((_, seconds)) => *seconds = seconds.saturating_add(session.duration),
            None => materials.push((material.clone(), session.duration)),
        }
    }

    materials.sort_by(|a, b| b.1.cmp(&a.1));
    materials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubjectSelection;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn noon() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn chapter(subject: Subject, serial: u32, name: &str, material: Option<&str>, secs: u64) -> StudySession {
        let selection = SubjectSelection::Chapter {
            subject,
            chapter_serial: serial,
            chapter_name: name.to_string(),
            material: material.map(str::to_string),
        };
        StudySession::from_run(&selection, noon(), noon(), secs)
    }

    fn custom(secs: u64) -> StudySession {
        StudySession::from_run(&SubjectSelection::default(), noon(), noon(), secs)
    }

    fn ledger() -> Vec<StudySession> {
        vec![
            chapter(Subject::Physics, 5, "Optics", Some("Notes"), 1200),
            chapter(Subject::Physics, 4, "Waves", None, 600),
            chapter(Subject::Physics, 5, "Optics", Some("PYQs"), 300),
            chapter(Subject::Maths, 1, "Limits", Some("Notes"), 900),
            custom(450),
        ]
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(total_duration(&ledger()), 3450);
        assert_eq!(total_duration(&[]), 0);
    }

    #[test]
    fn test_filtered_duration() {
        let sessions = ledger();
        let by_subject = SessionFilter {
            subject: Some(Subject::Physics),
            ..Default::default()
        };
        assert_eq!(filtered_duration(&sessions, &by_subject), 2100);

        let by_chapter = SessionFilter {
            subject: Some(Subject::Physics),
            chapter: Some(5),
            ..Default::default()
        };
        assert_eq!(filtered_duration(&sessions, &by_chapter), 1500);

        let by_material = SessionFilter {
            material: Some("Notes".to_string()),
            ..Default::default()
        };
        assert_eq!(filtered_duration(&sessions, &by_material), 2100);

        assert_eq!(filtered_duration(&sessions, &SessionFilter::default()), 3450);
    }

    #[test]
    fn test_subjectless_session_never_matches_subject_filter() {
        let filter = SessionFilter {
            subject: Some(Subject::Chemistry),
            ..Default::default()
        };
        assert!(!filter.matches(&custom(100)));
        assert_eq!(filtered_duration(&[custom(100)], &filter), 0);
    }

    #[test]
    fn test_subject_distribution_scenario() {
        let sessions = vec![chapter(Subject::Physics, 1, "Units", None, 3600), custom(1800)];
        let distribution = subject_distribution(&sessions);

        assert_eq!(
            distribution,
            SubjectDistribution {
                physics: 3600,
                chemistry: 0,
                maths: 0,
                custom: 1800,
            }
        );
        assert_eq!(total_duration(&sessions), 5400);
    }

    #[test]
    fn test_subject_distribution_closes_over_total() {
        let mut sessions = ledger();
        // A custom session later tagged with a subject still counts as custom
        let mut tagged = custom(77);
        tagged.subject = Some(Subject::Chemistry);
        sessions.push(tagged);

        let distribution = subject_distribution(&sessions);
        assert_eq!(distribution.total(), total_duration(&sessions));
        assert_eq!(distribution.custom, 450 + 77);
        assert_eq!(distribution.chemistry, 0);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let sessions = vec![
            chapter(Subject::Physics, 5, "Optics", None, u64::MAX),
            chapter(Subject::Physics, 5, "Optics", None, 60),
            custom(u64::MAX),
        ];

        assert_eq!(total_duration(&sessions), u64::MAX);
        let distribution = subject_distribution(&sessions);
        assert_eq!(distribution.physics, u64::MAX);
        assert_eq!(distribution.total(), u64::MAX);
        assert_eq!(top_chapters_by_subject(&sessions, Subject::Physics, 5)[0].seconds, u64::MAX);
    }

    #[test]
    fn test_percent_of_empty_distribution() {
        let distribution = SubjectDistribution::default();
        assert_eq!(distribution.percent(0), 0.0);
    }

    #[test]
    fn test_top_chapters_by_subject() {
        let top = top_chapters_by_subject(&ledger(), Subject::Physics, 5);
        assert_eq!(
            top,
            vec![
                ChapterTotal {
                    serial: 5,
                    name: "Optics".to_string(),
                    seconds: 1500,
                },
                ChapterTotal {
                    serial: 4,
                    name: "Waves".to_string(),
                    seconds: 600,
                },
            ]
        );
    }

    #[test]
    fn test_top_chapters_ties_keep_first_seen_order_and_name() {
        let sessions = vec![
            chapter(Subject::Chemistry, 2, "Bonding", None, 300),
            chapter(Subject::Chemistry, 7, "Kinetics", None, 300),
            chapter(Subject::Chemistry, 2, "Chemical Bonding", None, 0),
            chapter(Subject::Chemistry, 9, "Equilibrium", None, 100),
        ];

        let top = top_chapters_by_subject(&sessions, Subject::Chemistry, 2);
        let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bonding", "Kinetics"]);
    }

    #[test]
    fn test_daily_totals() {
        let mut sessions = ledger();
        let mut next_day = custom(60);
        next_day.start_time = noon() + chrono::Duration::days(1);
        sessions.push(next_day);

        let days = daily_totals(&sessions);
        assert_eq!(days.len(), 2);
        assert_eq!(days.values().copied().collect::<Vec<_>>(), vec![3450, 60]);
    }

    #[test]
    fn test_material_totals() {
        let materials = material_totals(&ledger(), Subject::Physics, 5);
        assert_eq!(
            materials,
            vec![("Notes".to_string(), 1200), ("PYQs".to_string(), 300)]
        );
    }
}
