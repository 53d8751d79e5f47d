use crate::catalog::{Syllabus, TaskList};
use crate::clock::{parse_duration, Clock, SystemClock};
use crate::config::Config;
use crate::domain::{SessionEdit, StudySession, Subject, SubjectSelection, TimerStatus, UiMode};
use crate::ledger::SessionLedger;
use crate::persistence::{FileStore, KeyValueStore};
use crate::timer::{StudyTimer, TimerControls};

/// Which kind of selection the next run will use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    Chapter,
    Custom,
    Task,
}

/// Subject selection being composed for the next run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub kind: DraftKind,
    pub subject: Subject,
    pub chapter_serial: u32,
    pub material: Option<String>,
    pub custom_title: String,
    pub task_id: Option<String>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            kind: DraftKind::Custom,
            subject: Subject::Physics,
            chapter_serial: 1,
            material: None,
            custom_title: String::new(),
            task_id: None,
        }
    }
}

impl Draft {
    /// Prefill from a selection, e.g. the one of the last run
    pub fn from_selection(selection: &SubjectSelection) -> Self {
        let mut draft = Self::default();
        match selection {
            SubjectSelection::Chapter {
                subject,
                chapter_serial,
                material,
                ..
            } => {
                draft.kind = DraftKind::Chapter;
                draft.subject = *subject;
                draft.chapter_serial = *chapter_serial;
                draft.material = material.clone();
            }
            SubjectSelection::Custom { title } => {
                draft.custom_title = title.clone();
            }
            SubjectSelection::Task { task_id, .. } => {
                draft.kind = DraftKind::Task;
                draft.task_id = Some(task_id.clone());
            }
        }
        draft
    }

    /// Resolve into a selection. A task draft whose task is gone falls back to custom.
    pub fn selection(&self, syllabus: &Syllabus, tasks: &TaskList) -> SubjectSelection {
        match self.kind {
            DraftKind::Chapter => {
                syllabus.selection(self.subject, self.chapter_serial, self.material.clone())
            }
            DraftKind::Task => match self.task_id.as_deref().and_then(|id| tasks.find(id)) {
                Some(task) => TaskList::selection(task),
                None => SubjectSelection::Custom {
                    title: self.custom_title.clone(),
                },
            },
            DraftKind::Custom => SubjectSelection::Custom {
                title: self.custom_title.clone(),
            },
        }
    }
}

/// Input form state for editing a recorded session
#[derive(Debug, Clone)]
pub struct EditFormState {
    pub session_id: String,
    pub title: String,
    pub subject: String,
    pub material: String,
    pub duration: String,
    pub editing_field: usize, // 0 = title, 1 = subject, 2 = material, 3 = duration
}

impl EditFormState {
    pub const FIELD_COUNT: usize = 4;

    fn for_session(session: &StudySession) -> Self {
        Self {
            session_id: session.id.clone(),
            title: session.title.clone(),
            subject: session.subject.map(|s| s.key().to_string()).unwrap_or_default(),
            material: session.material.clone().unwrap_or_default(),
            duration: crate::clock::format_clock(session.duration),
            editing_field: 0,
        }
    }

    pub fn current_field_mut(&mut self) -> &mut String {
        match self.editing_field {
            0 => &mut self.title,
            1 => &mut self.subject,
            2 => &mut self.material,
            _ => &mut self.duration,
        }
    }

    /// Turn the form into an edit; invalid subject/duration text is rejected
    pub fn to_edit(&self) -> Result<SessionEdit, String> {
        let subject = match self.subject.trim() {
            "" => None,
            name => Some(Subject::from_name(name).ok_or_else(|| format!("Unknown subject: {}", name))?),
        };
        let duration = parse_duration(&self.duration)
            .ok_or_else(|| format!("Invalid duration: {}", self.duration))?;

        Ok(SessionEdit {
            title: Some(self.title.clone()),
            subject,
            material: Some(self.material.clone()),
            duration: Some(duration),
        })
    }
}

/// Main application state
pub struct AppState<S: KeyValueStore = FileStore, C: Clock = SystemClock> {
    pub timer: StudyTimer<S, C>,
    pub ledger: SessionLedger<S>,
    pub syllabus: Syllabus,
    pub tasks: TaskList,
    pub config: Config,
    pub draft: Draft,
    pub ui_mode: UiMode,
    pub selected_index: usize, // Index into sessions_newest_first()
    pub stats_subject: Subject,
    pub title_input: String,
    pub edit_form: Option<EditFormState>,
    pub status_message: Option<String>,
}

impl<S: KeyValueStore, C: Clock> AppState<S, C> {
    pub fn new(
        timer: StudyTimer<S, C>,
        ledger: SessionLedger<S>,
        syllabus: Syllabus,
        tasks: TaskList,
        config: Config,
    ) -> Self {
        let draft = Draft::from_selection(timer.last_selection());
        Self {
            timer,
            ledger,
            syllabus,
            tasks,
            config,
            draft,
            ui_mode: UiMode::Normal,
            selected_index: 0,
            stats_subject: Subject::Physics,
            title_input: String::new(),
            edit_form: None,
            status_message: None,
        }
    }

    /// Sessions for display, most recently ended first
    pub fn sessions_newest_first(&self) -> Vec<&StudySession> {
        let mut sessions = self.ledger.sorted_by_end_time();
        sessions.reverse();
        sessions
    }

    pub fn selected_session(&self) -> Option<&StudySession> {
        self.sessions_newest_first().get(self.selected_index).copied()
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.ledger.len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.ledger.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    // Timer controls

    pub fn start_timer(&mut self) {
        let selection = self.draft.selection(&self.syllabus, &self.tasks);
        match self.timer.controls() {
            TimerControls::Idle(idle) => {
                self.status_message = Some(format!("Started: {}", selection.title()));
                idle.start(selection);
            }
            _ => self.status_message = Some("A run is already in progress".to_string()),
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.timer.controls() {
            TimerControls::Running(running) => {
                running.pause();
                self.status_message = Some("Paused".to_string());
            }
            TimerControls::Paused(paused) => {
                paused.resume();
                self.status_message = Some("Resumed".to_string());
            }
            TimerControls::Idle(_) => {
                self.status_message = Some("Timer is not running".to_string());
            }
        }
    }

    pub fn end_timer(&mut self) {
        let result = match self.timer.controls() {
            TimerControls::Running(running) => running.end(&mut self.ledger),
            TimerControls::Paused(paused) => paused.end(&mut self.ledger),
            TimerControls::Idle(_) => {
                self.status_message = Some("Timer is not running".to_string());
                return;
            }
        };

        self.status_message = Some(match result {
            Ok(Some(session)) => {
                self.selected_index = 0;
                format!(
                    "Recorded \"{}\" ({})",
                    session.title,
                    crate::clock::format_clock(session.duration)
                )
            }
            Ok(None) => "Nothing to record".to_string(),
            Err(e) => {
                tracing::error!("Failed to record session: {:#}", e);
                format!("Failed to save session: {}", e)
            }
        });
        self.draft = Draft::from_selection(self.timer.last_selection());
    }

    /// Ask before throwing away a run with time on it
    pub fn request_discard(&mut self) {
        match self.timer.status() {
            TimerStatus::Idle => {
                self.status_message = Some("Timer is not running".to_string());
            }
            _ if self.timer.elapsed_seconds() == 0 => self.discard_timer(),
            _ => self.ui_mode = UiMode::ConfirmDiscard,
        }
    }

    pub fn discard_timer(&mut self) {
        match self.timer.controls() {
            TimerControls::Running(running) => running.discard(),
            TimerControls::Paused(paused) => paused.discard(),
            TimerControls::Idle(_) => {}
        }
        self.draft = Draft::default();
        self.ui_mode = UiMode::Normal;
        self.status_message = Some("Run discarded".to_string());
    }

    // Draft selection

    pub fn cycle_draft_kind(&mut self) {
        self.draft.kind = match self.draft.kind {
            DraftKind::Custom => DraftKind::Chapter,
            DraftKind::Chapter => DraftKind::Task,
            DraftKind::Task => DraftKind::Custom,
        };
        if self.draft.kind == DraftKind::Task && self.draft.task_id.is_none() {
            self.draft.task_id = self.tasks.pending().next().map(|t| t.id.clone());
        }
    }

    pub fn cycle_draft_subject(&mut self) {
        self.draft.subject = self.draft.subject.next();
        self.draft.chapter_serial = self
            .syllabus
            .chapters(self.draft.subject)
            .first()
            .map(|c| c.serial)
            .unwrap_or(1);
        self.draft.material = None;
    }

    pub fn cycle_draft_chapter(&mut self) {
        let chapters = self.syllabus.chapters(self.draft.subject);
        self.draft.chapter_serial = if chapters.is_empty() {
            self.draft.chapter_serial + 1
        } else {
            let position = chapters
                .iter()
                .position(|c| c.serial == self.draft.chapter_serial);
            let next = position.map(|i| (i + 1) % chapters.len()).unwrap_or(0);
            chapters[next].serial
        };
        self.draft.material = None;
    }

    /// Cycle through the chapter's materials, then back to none
    pub fn cycle_draft_material(&mut self) {
        let materials: Vec<String> = self
            .syllabus
            .materials(self.draft.subject, self.draft.chapter_serial)
            .into_iter()
            .collect();
        self.draft.material = match &self.draft.material {
            None => materials.first().cloned(),
            Some(current) => {
                let position = materials.iter().position(|m| m == current);
                position.and_then(|i| materials.get(i + 1).cloned())
            }
        };
    }

    pub fn cycle_draft_task(&mut self) {
        let pending: Vec<&str> = self.tasks.pending().map(|t| t.id.as_str()).collect();
        if pending.is_empty() {
            self.status_message = Some("No pending tasks".to_string());
            return;
        }
        let position = self
            .draft
            .task_id
            .as_deref()
            .and_then(|id| pending.iter().position(|p| *p == id));
        let next = position.map(|i| (i + 1) % pending.len()).unwrap_or(0);
        self.draft.task_id = Some(pending[next].to_string());
        self.draft.kind = DraftKind::Task;
    }

    pub fn begin_title_edit(&mut self) {
        self.title_input = self.draft.custom_title.clone();
        self.ui_mode = UiMode::EditingTitle;
    }

    pub fn commit_title_edit(&mut self) {
        self.draft.custom_title = self.title_input.trim().to_string();
        self.draft.kind = DraftKind::Custom;
        self.ui_mode = UiMode::Normal;
    }

    // Session editing

    pub fn begin_session_edit(&mut self) {
        let form = self.selected_session().map(EditFormState::for_session);
        if form.is_some() {
            self.edit_form = form;
            self.ui_mode = UiMode::EditingSession;
        }
    }

    pub fn cancel_session_edit(&mut self) {
        self.edit_form = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn commit_session_edit(&mut self) {
        let Some(form) = self.edit_form.take() else {
            self.ui_mode = UiMode::Normal;
            return;
        };

        let edit = match form.to_edit() {
            Ok(edit) => edit,
            Err(message) => {
                self.status_message = Some(message);
                self.edit_form = Some(form);
                return;
            }
        };

        self.ui_mode = UiMode::Normal;
        let Some(session) = self.ledger.get(&form.session_id) else {
            self.status_message = Some("Session no longer exists".to_string());
            return;
        };
        let updated = edit.apply(session);

        self.status_message = Some(match self.ledger.update(updated) {
            Ok(true) => "Session updated".to_string(),
            Ok(false) => "Session no longer exists".to_string(),
            Err(e) => {
                tracing::error!("Failed to update session: {:#}", e);
                format!("Failed to save session: {}", e)
            }
        });
    }

    pub fn delete_selected_session(&mut self) {
        let Some(id) = self.selected_session().map(|s| s.id.clone()) else {
            return;
        };
        self.status_message = Some(match self.ledger.remove(&id) {
            Ok(_) => "Session deleted".to_string(),
            Err(e) => {
                tracing::error!("Failed to delete session: {:#}", e);
                format!("Failed to save ledger: {}", e)
            }
        });
        self.clamp_selection();
    }

    pub fn cycle_stats_subject(&mut self) {
        self.stats_subject = self.stats_subject.next();
    }
}
