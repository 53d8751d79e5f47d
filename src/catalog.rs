//! Read-only inputs: the syllabus catalog and the task list
//!
//! Both are plain JSON files in the data directory. A missing file is an empty
//! input. They only feed the selection UI; recorded sessions keep their own
//! copy of the chapter name and are never checked against the catalog.

use crate::domain::{Subject, SubjectSelection};
use crate::persistence::read_file;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const SYLLABUS_FILE: &str = "syllabus.json";
pub const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub serial: u32,
    pub name: String,
    #[serde(default)]
    pub materials: Vec<String>,
}

/// Subjects → chapters → materials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Syllabus {
    subjects: BTreeMap<Subject, Vec<Chapter>>,
}

impl Syllabus {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match read_file(path)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse syllabus: {}", path.display())),
            _ => Ok(Self::default()),
        }
    }

    pub fn chapters(&self, subject: Subject) -> &[Chapter] {
        self.subjects
            .get(&subject)
            .map(|chapters| chapters.as_slice())
            .unwrap_or(&[])
    }

    pub fn chapter(&self, subject: Subject, serial: u32) -> Option<&Chapter> {
        self.chapters(subject).iter().find(|c| c.serial == serial)
    }

    pub fn chapter_name(&self, subject: Subject, serial: u32) -> Option<&str> {
        self.chapter(subject, serial).map(|c| c.name.as_str())
    }

    pub fn materials(&self, subject: Subject, serial: u32) -> BTreeSet<String> {
        self.chapter(subject, serial)
            .map(|c| c.materials.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Build a chapter selection, falling back to "Chapter N" for chapters
    /// the catalog does not know about
    pub fn selection(
        &self,
        subject: Subject,
        serial: u32,
        material: Option<String>,
    ) -> SubjectSelection {
        let chapter_name = self
            .chapter_name(subject, serial)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Chapter {}", serial));
        SubjectSelection::Chapter {
            subject,
            chapter_serial: serial,
            chapter_name,
            material,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match read_file(path)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse task list: {}", path.display())),
            _ => Ok(Self::default()),
        }
    }

    /// Tasks that are not done yet, in file order
    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.done)
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn selection(task: &Task) -> SubjectSelection {
        SubjectSelection::Task {
            task_id: task.id.clone(),
            title: task.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::atomic_write;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SYLLABUS: &str = r#"{
        "physics": [
            { "serial": 4, "name": "Waves", "materials": ["Notes"] },
            { "serial": 5, "name": "Optics", "materials": ["Notes", "PYQs", "Notes"] }
        ],
        "maths": [
            { "serial": 1, "name": "Limits" }
        ]
    }"#;

    #[test]
    fn test_missing_files_are_empty() {
        let temp_dir = tempdir().unwrap();
        let syllabus = Syllabus::load(temp_dir.path().join(SYLLABUS_FILE)).unwrap();
        let tasks = TaskList::load(temp_dir.path().join(TASKS_FILE)).unwrap();

        assert!(syllabus.chapters(Subject::Physics).is_empty());
        assert_eq!(tasks.pending().count(), 0);
    }

    #[test]
    fn test_syllabus_lookup() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(SYLLABUS_FILE);
        atomic_write(&path, SYLLABUS).unwrap();

        let syllabus = Syllabus::load(&path).unwrap();
        assert_eq!(syllabus.chapter_name(Subject::Physics, 5), Some("Optics"));
        assert_eq!(syllabus.chapter_name(Subject::Physics, 9), None);
        assert_eq!(syllabus.chapter_name(Subject::Chemistry, 5), None);

        let materials: Vec<String> = syllabus.materials(Subject::Physics, 5).into_iter().collect();
        assert_eq!(materials, vec!["Notes".to_string(), "PYQs".to_string()]);
        assert!(syllabus.materials(Subject::Maths, 1).is_empty());
    }

    #[test]
    fn test_selection_falls_back_to_serial() {
        let syllabus = Syllabus::default();
        let selection = syllabus.selection(Subject::Chemistry, 3, None);
        assert_eq!(selection.title(), "Chemistry: Chapter 3");
    }

    #[test]
    fn test_invalid_syllabus_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(SYLLABUS_FILE);
        atomic_write(&path, "{\"biology\": []}").unwrap();

        assert!(Syllabus::load(&path).is_err());
    }

    #[test]
    fn test_task_list_pending_and_find() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join(TASKS_FILE);
        atomic_write(
            &path,
            r#"[
                {"id": "a", "title": "Read chapter 2"},
                {"id": "b", "title": "Mock test", "done": true}
            ]"#,
        )
        .unwrap();

        let tasks = TaskList::load(&path).unwrap();
        let pending: Vec<&str> = tasks.pending().map(|t| t.id.as_str()).collect();
        assert_eq!(pending, vec!["a"]);
        assert_eq!(tasks.find("b").map(|t| t.title.as_str()), Some("Mock test"));

        let selection = TaskList::selection(tasks.find("a").unwrap());
        assert_eq!(selection.title(), "Read chapter 2");
    }
}
