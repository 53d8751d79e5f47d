use super::enums::{SessionKind, Subject};
use serde::{Deserialize, Serialize};

/// Title used when a custom run has no label
pub const DEFAULT_TITLE: &str = "Study session";

/// What the user is studying during a timer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubjectSelection {
    /// A syllabus chapter, optionally narrowed to one material
    Chapter {
        subject: Subject,
        chapter_serial: u32,
        /// Chapter name as the catalog had it when the run started
        chapter_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<String>,
    },
    /// Free-form label
    Custom { title: String },
    /// A pending task from the task list
    Task { task_id: String, title: String },
}

impl Default for SubjectSelection {
    fn default() -> Self {
        SubjectSelection::Custom {
            title: String::new(),
        }
    }
}

impl SubjectSelection {
    pub fn kind(&self) -> SessionKind {
        match self {
            Self::Chapter { .. } => SessionKind::Chapter,
            Self::Custom { .. } => SessionKind::Custom,
            Self::Task { .. } => SessionKind::Task,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        match self {
            Self::Chapter { subject, .. } => Some(*subject),
            _ => None,
        }
    }

    /// Session title derived from the selection
    pub fn title(&self) -> String {
        match self {
            Self::Chapter {
                subject,
                chapter_name,
                material,
                ..
            } => match material {
                Some(material) => format!("{}: {} ({})", subject.name(), chapter_name, material),
                None => format!("{}: {}", subject.name(), chapter_name),
            },
            Self::Custom { title } => {
                let title = title.trim();
                if title.is_empty() {
                    DEFAULT_TITLE.to_string()
                } else {
                    title.to_string()
                }
            }
            Self::Task { title, .. } => title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_blank_custom() {
        let selection = SubjectSelection::default();
        assert_eq!(selection.kind(), SessionKind::Custom);
        assert_eq!(selection.title(), DEFAULT_TITLE);
        assert_eq!(selection.subject(), None);
    }

    #[test]
    fn test_chapter_title_includes_material() {
        let selection = SubjectSelection::Chapter {
            subject: Subject::Physics,
            chapter_serial: 5,
            chapter_name: "Optics".to_string(),
            material: Some("Notes".to_string()),
        };
        assert_eq!(selection.title(), "Physics: Optics (Notes)");
        assert_eq!(selection.subject(), Some(Subject::Physics));
    }

    #[test]
    fn test_selection_serializes_as_tagged_variant() {
        let selection = SubjectSelection::Task {
            task_id: "t1".to_string(),
            title: "Revise limits".to_string(),
        };
        let value = serde_json::to_value(&selection).unwrap();
        assert_eq!(value["kind"], "task");
        assert_eq!(value["task_id"], "t1");
    }
}
