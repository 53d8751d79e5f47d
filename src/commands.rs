//! Subcommand implementations
//!
//! Each command works on a freshly recovered timer and ledger, so a run can be
//! started in one invocation and ended in another. Commands that do not apply
//! to the current timer state print a message instead of failing.

use crate::catalog::{Syllabus, TaskList};
use crate::clock::{format_clock, format_duration, Clock};
use crate::domain::{SessionEdit, StudySession, Subject, SubjectSelection, TimerStatus};
use crate::ledger::SessionLedger;
use crate::persistence::KeyValueStore;
use crate::report::total_duration;
use crate::timer::{StudyTimer, TimerControls};
use anyhow::{anyhow, bail, Result};

/// Options of `studylog start` describing what is being studied
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub subject: Option<Subject>,
    pub chapter: Option<u32>,
    pub material: Option<String>,
    pub title: Option<String>,
    pub task: Option<String>,
}

impl StartOptions {
    /// Resolve the options against the catalog. A task wins over a chapter,
    /// which wins over a custom title.
    pub fn selection(&self, syllabus: &Syllabus, tasks: &TaskList) -> Result<SubjectSelection> {
        if let Some(task_id) = &self.task {
            let task = tasks
                .find(task_id)
                .ok_or_else(|| anyhow!("Unknown task: {}", task_id))?;
            return Ok(TaskList::selection(task));
        }

        match (self.subject, self.chapter) {
            (Some(subject), Some(serial)) => {
                Ok(syllabus.selection(subject, serial, self.material.clone()))
            }
            (Some(_), None) => bail!("--subject needs --chapter"),
            (None, Some(_)) => bail!("--chapter needs --subject"),
            (None, None) => Ok(SubjectSelection::Custom {
                title: self.title.clone().unwrap_or_default(),
            }),
        }
    }
}

pub fn start<S: KeyValueStore, C: Clock>(
    timer: &mut StudyTimer<S, C>,
    selection: SubjectSelection,
) -> String {
    match timer.controls() {
        TimerControls::Idle(idle) => {
            let title = selection.title();
            idle.start(selection);
            format!("Started: {}", title)
        }
        _ => format!(
            "A run is already {} ({}); end or discard it first",
            timer.status().to_tag(),
            format_clock(timer.elapsed_seconds())
        ),
    }
}

pub fn pause<S: KeyValueStore, C: Clock>(timer: &mut StudyTimer<S, C>) -> String {
    match timer.controls() {
        TimerControls::Running(running) => {
            format!("Paused at {}", format_clock(running.pause()))
        }
        TimerControls::Paused(_) => "Timer is already paused".to_string(),
        TimerControls::Idle(_) => "No timer is running".to_string(),
    }
}

pub fn resume<S: KeyValueStore, C: Clock>(timer: &mut StudyTimer<S, C>) -> String {
    match timer.controls() {
        TimerControls::Paused(paused) => {
            paused.resume();
            format!("Resumed at {}", format_clock(timer.elapsed_seconds()))
        }
        TimerControls::Running(_) => "Timer is already running".to_string(),
        TimerControls::Idle(_) => "No timer is running".to_string(),
    }
}

pub fn end<S: KeyValueStore, C: Clock, L: KeyValueStore>(
    timer: &mut StudyTimer<S, C>,
    ledger: &mut SessionLedger<L>,
) -> Result<String> {
    let recorded = match timer.controls() {
        TimerControls::Running(running) => running.end(ledger)?,
        TimerControls::Paused(paused) => paused.end(ledger)?,
        TimerControls::Idle(_) => return Ok("No timer is running".to_string()),
    };

    Ok(match recorded {
        Some(session) => format!(
            "Recorded {} \"{}\" ({})",
            session.short_id(),
            session.title,
            format_clock(session.duration)
        ),
        None => "Run ended with no elapsed time, nothing recorded".to_string(),
    })
}

pub fn discard<S: KeyValueStore, C: Clock>(timer: &mut StudyTimer<S, C>) -> String {
    let elapsed = timer.elapsed_seconds();
    match timer.controls() {
        TimerControls::Running(running) => running.discard(),
        TimerControls::Paused(paused) => paused.discard(),
        TimerControls::Idle(_) => return "No timer is running".to_string(),
    }
    format!("Discarded run ({})", format_clock(elapsed))
}

pub fn status<S: KeyValueStore, C: Clock>(timer: &StudyTimer<S, C>) -> String {
    match (timer.status(), timer.selection()) {
        (TimerStatus::Idle, _) | (_, None) => "idle".to_string(),
        (status, Some(selection)) => format!(
            "{}  {}  {}",
            status.to_tag(),
            format_clock(timer.elapsed_seconds()),
            selection.title()
        ),
    }
}

/// Ledger listing, oldest first, with a total line
pub fn list_sessions<S: KeyValueStore>(ledger: &SessionLedger<S>) -> String {
    if ledger.is_empty() {
        return "No sessions recorded".to_string();
    }

    let mut out = String::new();
    for session in ledger.sorted_by_end_time() {
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            session.short_id(),
            session.local_start().format("%Y-%m-%d %H:%M"),
            format_clock(session.duration),
            session.title
        ));
    }
    out.push_str(&format!(
        "{} sessions, {}",
        ledger.len(),
        format_duration(total_duration(ledger.sessions()))
    ));
    out
}

/// Find the one session whose ID starts with `prefix`
pub fn resolve_session<'a, S: KeyValueStore>(
    ledger: &'a SessionLedger<S>,
    prefix: &str,
) -> Result<&'a StudySession> {
    if prefix.is_empty() {
        bail!("Session ID must not be empty");
    }
    match ledger.find_by_prefix(prefix).as_slice() {
        [] => bail!("No session matches '{}'", prefix),
        [session] => Ok(*session),
        matches => bail!(
            "'{}' matches {} sessions; use a longer prefix",
            prefix,
            matches.len()
        ),
    }
}

pub fn edit<S: KeyValueStore>(
    ledger: &mut SessionLedger<S>,
    prefix: &str,
    edit: &SessionEdit,
) -> Result<String> {
    if edit.is_empty() {
        bail!("Nothing to change; pass --title, --subject, --material or --duration");
    }
    let updated = edit.apply(resolve_session(ledger, prefix)?);
    let short_id = updated.short_id().to_string();
    ledger.update(updated)?;
    Ok(format!("Updated session {}", short_id))
}

pub fn delete<S: KeyValueStore>(ledger: &mut SessionLedger<S>, prefix: &str) -> Result<String> {
    let session = resolve_session(ledger, prefix)?;
    let (id, short_id, title) = (
        session.id.clone(),
        session.short_id().to_string(),
        session.title.clone(),
    );
    ledger.remove(&id)?;
    Ok(format!("Deleted session {} \"{}\"", short_id, title))
}
