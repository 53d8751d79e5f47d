use super::enums::{SessionKind, Subject};
use super::selection::SubjectSelection;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed study session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    /// Unique ID, never changes after creation
    pub id: String,
    /// Display label
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_serial: Option<u32>,
    /// Chapter name copied at creation; the catalog may change later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub kind: SessionKind,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Studied time in whole seconds (editable independently of start/end)
    pub duration: u64,
}

impl StudySession {
    /// Build a session from a finished timer run
    pub fn from_run(
        selection: &SubjectSelection,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration: u64,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4().to_string(),
            title: selection.title(),
            subject: None,
            chapter_serial: None,
            chapter_name: None,
            material: None,
            task_id: None,
            kind: selection.kind(),
            start_time,
            end_time,
            duration,
        };

        match selection {
            SubjectSelection::Chapter {
                subject,
                chapter_serial,
                chapter_name,
                material,
            } => {
                session.subject = Some(*subject);
                session.chapter_serial = Some(*chapter_serial);
                session.chapter_name = Some(chapter_name.clone());
                session.material = material.clone();
            }
            SubjectSelection::Task { task_id, .. } => {
                session.task_id = Some(task_id.clone());
            }
            SubjectSelection::Custom { .. } => {}
        }

        session
    }

    /// Start time in the local timezone
    pub fn local_start(&self) -> DateTime<Local> {
        self.start_time.with_timezone(&Local)
    }

    /// End time in the local timezone
    pub fn local_end(&self) -> DateTime<Local> {
        self.end_time.with_timezone(&Local)
    }

    /// Short form of the ID for display and CLI lookups
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(8);
        &self.id[..end]
    }
}

/// User edit of a recorded session. Fields left as `None` are carried forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEdit {
    pub title: Option<String>,
    pub subject: Option<Subject>,
    /// `Some("")` clears the material
    pub material: Option<String>,
    pub duration: Option<u64>,
}

impl SessionEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subject.is_none()
            && self.material.is_none()
            && self.duration.is_none()
    }

    /// Build the full replacement record for `session`.
    /// Start and end times are never recomputed from an edited duration.
    /// Moving a session to another subject drops its chapter, which belongs
    /// to the old subject's syllabus.
    pub fn apply(&self, session: &StudySession) -> StudySession {
        let mut updated = session.clone();

        if let Some(title) = &self.title {
            let title = title.trim();
            if !title.is_empty() {
                updated.title = title.to_string();
            }
        }
        if let Some(subject) = self.subject {
            if updated.subject != Some(subject) {
                updated.chapter_serial = None;
                updated.chapter_name = None;
            }
            updated.subject = Some(subject);
        }
        if let Some(material) = &self.material {
            let material = material.trim();
            updated.material = if material.is_empty() {
                None
            } else {
                Some(material.to_string())
            };
        }
        if let Some(duration) = self.duration {
            updated.duration = duration;
        }

        updated
    }
}
