//! Study timer
//!
//! A wall-clock stopwatch with Idle, Running and Paused states. Elapsed time is
//! always recomputed from the clock and the last resume instant, so time that
//! passes while the process is suspended or not running at all is counted.
//! Every transition writes the matching snapshot synchronously, which is what
//! lets `StudyTimer::recover` pick a run back up after a restart.
//!
//! Transitions are only reachable through [`StudyTimer::controls`], which hands
//! out a handle for the current state exposing just the legal operations.

use crate::clock::{seconds_between, Clock};
use crate::domain::{StudySession, SubjectSelection, TimerStatus};
use crate::ledger::SessionLedger;
use crate::persistence::{
    KeyValueStore, PausedSnapshot, RecoveredSnapshot, RunningSnapshot, SnapshotManager,
};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

/// A run that is currently counting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Running {
    /// Most recent start/resume instant
    pub started_at: DateTime<Utc>,
    /// Seconds banked by earlier running intervals of this run
    pub accumulated_seconds: u64,
    /// Instant of the original start
    pub session_started_at: DateTime<Utc>,
    pub selection: SubjectSelection,
}

impl Running {
    fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        self.accumulated_seconds
            .saturating_add(seconds_between(self.started_at, now))
    }

    fn snapshot(&self) -> RunningSnapshot {
        RunningSnapshot {
            started_at: self.started_at,
            accumulated_seconds: self.accumulated_seconds,
            session_started_at: Some(self.session_started_at),
            selection: self.selection.clone(),
        }
    }
}

/// A run frozen at its pause instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paused {
    pub accumulated_seconds: u64,
    pub session_started_at: DateTime<Utc>,
    pub selection: SubjectSelection,
}

impl Paused {
    fn snapshot(&self) -> PausedSnapshot {
        PausedSnapshot {
            accumulated_seconds: self.accumulated_seconds,
            session_started_at: Some(self.session_started_at),
            selection: self.selection.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimerState {
    #[default]
    Idle,
    Running(Running),
    Paused(Paused),
}

/// Run data left over once a run is closed
struct FinishedRun {
    selection: SubjectSelection,
    session_started_at: DateTime<Utc>,
    elapsed_seconds: u64,
}

pub struct StudyTimer<S: KeyValueStore, C: Clock> {
    clock: C,
    snapshots: SnapshotManager<S>,
    state: TimerState,
    /// Selection of the current or most recent run, for prefilling the next one
    last_selection: SubjectSelection,
}

impl<S: KeyValueStore, C: Clock> StudyTimer<S, C> {
    /// Rebuild the timer from whatever snapshot the store holds
    pub fn recover(store: S, clock: C) -> Self {
        let snapshots = SnapshotManager::new(store);

        let state = match snapshots.load() {
            RecoveredSnapshot::Running(snapshot) => {
                let session_started_at = snapshot.session_started_at.or_else(|| {
                    run_start(snapshot.started_at, snapshot.accumulated_seconds)
                });
                match session_started_at {
                    Some(session_started_at) => {
                        tracing::info!(
                            "Recovered running timer (started {}, {}s banked)",
                            snapshot.started_at,
                            snapshot.accumulated_seconds
                        );
                        TimerState::Running(Running {
                            started_at: snapshot.started_at,
                            accumulated_seconds: snapshot.accumulated_seconds,
                            session_started_at,
                            selection: snapshot.selection,
                        })
                    }
                    None => {
                        tracing::warn!(
                            "Discarding running snapshot with out-of-range time ({}s banked)",
                            snapshot.accumulated_seconds
                        );
                        snapshots.clear();
                        TimerState::Idle
                    }
                }
            }
            RecoveredSnapshot::Paused(snapshot) => {
                let session_started_at = snapshot
                    .session_started_at
                    .or_else(|| run_start(clock.now(), snapshot.accumulated_seconds));
                match session_started_at {
                    Some(session_started_at) => {
                        tracing::info!(
                            "Recovered paused timer ({}s banked)",
                            snapshot.accumulated_seconds
                        );
                        TimerState::Paused(Paused {
                            accumulated_seconds: snapshot.accumulated_seconds,
                            session_started_at,
                            selection: snapshot.selection,
                        })
                    }
                    None => {
                        tracing::warn!(
                            "Discarding paused snapshot with out-of-range time ({}s banked)",
                            snapshot.accumulated_seconds
                        );
                        snapshots.clear();
                        TimerState::Idle
                    }
                }
            }
            RecoveredSnapshot::None => TimerState::Idle,
        };

        let last_selection = match &state {
            TimerState::Running(run) => run.selection.clone(),
            TimerState::Paused(paused) => paused.selection.clone(),
            TimerState::Idle => SubjectSelection::default(),
        };

        Self {
            clock,
            snapshots,
            state,
            last_selection,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn status(&self) -> TimerStatus {
        match self.state {
            TimerState::Idle => TimerStatus::Idle,
            TimerState::Running(_) => TimerStatus::Running,
            TimerState::Paused(_) => TimerStatus::Paused,
        }
    }

    /// Elapsed seconds of the current run, recomputed from the clock
    pub fn elapsed_seconds(&self) -> u64 {
        match &self.state {
            TimerState::Idle => 0,
            TimerState::Running(run) => run.elapsed_at(self.clock.now()),
            TimerState::Paused(paused) => paused.accumulated_seconds,
        }
    }

    /// Selection of the run in progress, if any
    pub fn selection(&self) -> Option<&SubjectSelection> {
        match &self.state {
            TimerState::Idle => None,
            TimerState::Running(run) => Some(&run.selection),
            TimerState::Paused(paused) => Some(&paused.selection),
        }
    }

    /// Selection of the current or most recently ended run
    pub fn last_selection(&self) -> &SubjectSelection {
        &self.last_selection
    }

    /// Handle exposing the transitions that are legal right now
    pub fn controls(&mut self) -> TimerControls<'_, S, C> {
        match self.state {
            TimerState::Idle => TimerControls::Idle(IdleTimer { timer: self }),
            TimerState::Running(_) => TimerControls::Running(RunningTimer { timer: self }),
            TimerState::Paused(_) => TimerControls::Paused(PausedTimer { timer: self }),
        }
    }

    /// Close the current run: compute final elapsed, clear both snapshots and go idle
    fn finish(&mut self, now: DateTime<Utc>) -> Option<FinishedRun> {
        let finished = match std::mem::take(&mut self.state) {
            TimerState::Running(run) => FinishedRun {
                elapsed_seconds: run.elapsed_at(now),
                session_started_at: run.session_started_at,
                selection: run.selection,
            },
            TimerState::Paused(paused) => FinishedRun {
                elapsed_seconds: paused.accumulated_seconds,
                session_started_at: paused.session_started_at,
                selection: paused.selection,
            },
            TimerState::Idle => return None,
        };
        self.snapshots.clear();
        Some(finished)
    }

    /// Put a run back, snapshot included, after it could not be recorded
    fn restore(&mut self, state: TimerState) {
        match &state {
            TimerState::Running(run) => self.snapshots.write_running(&run.snapshot()),
            TimerState::Paused(paused) => self.snapshots.write_paused(&paused.snapshot()),
            TimerState::Idle => {}
        }
        self.state = state;
    }
}

/// Instant `accumulated` seconds before `at`, if representable
fn run_start(at: DateTime<Utc>, accumulated: u64) -> Option<DateTime<Utc>> {
    let banked = Duration::try_seconds(i64::try_from(accumulated).ok()?)?;
    at.checked_sub_signed(banked)
}

/// State-dependent view of a timer
pub enum TimerControls<'a, S: KeyValueStore, C: Clock> {
    Idle(IdleTimer<'a, S, C>),
    Running(RunningTimer<'a, S, C>),
    Paused(PausedTimer<'a, S, C>),
}

pub struct IdleTimer<'a, S: KeyValueStore, C: Clock> {
    timer: &'a mut StudyTimer<S, C>,
}

pub struct RunningTimer<'a, S: KeyValueStore, C: Clock> {
    timer: &'a mut StudyTimer<S, C>,
}

pub struct PausedTimer<'a, S: KeyValueStore, C: Clock> {
    timer: &'a mut StudyTimer<S, C>,
}

impl<S: KeyValueStore, C: Clock> IdleTimer<'_, S, C> {
    /// Begin a new run with the given selection
    pub fn start(self, selection: SubjectSelection) {
        let timer = self.timer;
        timer.snapshots.clear();

        let now = timer.clock.now();
        let run = Running {
            started_at: now,
            accumulated_seconds: 0,
            session_started_at: now,
            selection: selection.clone(),
        };
        timer.snapshots.write_running(&run.snapshot());
        timer.state = TimerState::Running(run);
        timer.last_selection = selection;
        tracing::info!("Timer started: {}", timer.last_selection.title());
    }
}

impl<S: KeyValueStore, C: Clock> RunningTimer<'_, S, C> {
    /// Freeze the run. Returns the elapsed seconds at the pause instant.
    pub fn pause(self) -> u64 {
        let timer = self.timer;
        let now = timer.clock.now();

        let TimerState::Running(run) = std::mem::take(&mut timer.state) else {
            return 0;
        };
        let paused = Paused {
            accumulated_seconds: run.elapsed_at(now),
            session_started_at: run.session_started_at,
            selection: run.selection,
        };

        // Paused record first: a crash in between leaves the previous state recoverable
        timer.snapshots.write_paused(&paused.snapshot());
        timer.snapshots.remove_running();

        let elapsed = paused.accumulated_seconds;
        timer.state = TimerState::Paused(paused);
        tracing::info!("Timer paused at {}s", elapsed);
        elapsed
    }

    /// Finish the run, recording a session if any time elapsed
    pub fn end<L: KeyValueStore>(
        self,
        ledger: &mut SessionLedger<L>,
    ) -> Result<Option<StudySession>> {
        end_run(self.timer, ledger)
    }

    /// Abandon the run without recording anything
    pub fn discard(self) {
        discard_run(self.timer);
    }
}

impl<S: KeyValueStore, C: Clock> PausedTimer<'_, S, C> {
    /// Continue counting from the frozen elapsed time
    pub fn resume(self) {
        let timer = self.timer;
        let now = timer.clock.now();

        let TimerState::Paused(paused) = std::mem::take(&mut timer.state) else {
            return;
        };
        let run = Running {
            started_at: now,
            accumulated_seconds: paused.accumulated_seconds,
            session_started_at: paused.session_started_at,
            selection: paused.selection,
        };

        timer.snapshots.write_running(&run.snapshot());
        timer.snapshots.remove_paused();

        tracing::info!("Timer resumed at {}s", run.accumulated_seconds);
        timer.state = TimerState::Running(run);
    }

    /// Finish the run, recording a session if any time elapsed
    pub fn end<L: KeyValueStore>(
        self,
        ledger: &mut SessionLedger<L>,
    ) -> Result<Option<StudySession>> {
        end_run(self.timer, ledger)
    }

    /// Abandon the run without recording anything
    pub fn discard(self) {
        discard_run(self.timer);
    }
}

fn end_run<S: KeyValueStore, C: Clock, L: KeyValueStore>(
    timer: &mut StudyTimer<S, C>,
    ledger: &mut SessionLedger<L>,
) -> Result<Option<StudySession>> {
    let now = timer.clock.now();
    let previous = timer.state.clone();
    let Some(run) = timer.finish(now) else {
        return Ok(None);
    };
    timer.last_selection = run.selection.clone();

    if run.elapsed_seconds == 0 {
        tracing::info!("Timer ended with no elapsed time, nothing recorded");
        return Ok(None);
    }

    let session = StudySession::from_run(
        &run.selection,
        run.session_started_at,
        now,
        run.elapsed_seconds,
    );
    match ledger.append(session) {
        Ok(recorded) => Ok(Some(recorded)),
        Err(e) => {
            // Snapshots are cleared before the append so a crash never counts a run twice
            tracing::error!("Failed to record session, keeping the run: {:#}", e);
            timer.restore(previous);
            Err(e)
        }
    }
}

fn discard_run<S: KeyValueStore, C: Clock>(timer: &mut StudyTimer<S, C>) {
    let now = timer.clock.now();
    if let Some(run) = timer.finish(now) {
        tracing::info!("Timer discarded after {}s", run.elapsed_seconds);
    }
    timer.last_selection = SubjectSelection::default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use crate::domain::{SessionKind, Subject};
    use crate::persistence::snapshot::{PAUSED_KEY, RUNNING_KEY};
    use crate::persistence::{FailingStore, MemoryStore};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    struct Fixture {
        store: MemoryStore,
        clock: ManualClock,
        timer: StudyTimer<MemoryStore, ManualClock>,
        ledger: SessionLedger<MemoryStore>,
    }

    fn fixture(start: DateTime<Utc>) -> Fixture {
        let store = MemoryStore::new();
        let clock = ManualClock::new(start);
        let timer = StudyTimer::recover(store.clone(), clock.clone());
        let ledger = SessionLedger::load(store.clone()).unwrap();
        Fixture {
            store,
            clock,
            timer,
            ledger,
        }
    }

    fn optics_notes() -> SubjectSelection {
        SubjectSelection::Chapter {
            subject: Subject::Physics,
            chapter_serial: 5,
            chapter_name: "Optics".to_string(),
            material: Some("Notes".to_string()),
        }
    }

    fn start(timer: &mut StudyTimer<MemoryStore, ManualClock>, selection: SubjectSelection) {
        match timer.controls() {
            TimerControls::Idle(idle) => idle.start(selection),
            _ => panic!("timer should be idle"),
        }
    }

    fn pause(timer: &mut StudyTimer<MemoryStore, ManualClock>) -> u64 {
        match timer.controls() {
            TimerControls::Running(running) => running.pause(),
            _ => panic!("timer should be running"),
        }
    }

    fn resume(timer: &mut StudyTimer<MemoryStore, ManualClock>) {
        match timer.controls() {
            TimerControls::Paused(paused) => paused.resume(),
            _ => panic!("timer should be paused"),
        }
    }

    fn end(
        timer: &mut StudyTimer<MemoryStore, ManualClock>,
        ledger: &mut SessionLedger<MemoryStore>,
    ) -> Option<StudySession> {
        match timer.controls() {
            TimerControls::Running(running) => running.end(ledger).unwrap(),
            TimerControls::Paused(paused) => paused.end(ledger).unwrap(),
            TimerControls::Idle(_) => panic!("timer should be active"),
        }
    }

    fn discard(timer: &mut StudyTimer<MemoryStore, ManualClock>) {
        match timer.controls() {
            TimerControls::Running(running) => running.discard(),
            TimerControls::Paused(paused) => paused.discard(),
            TimerControls::Idle(_) => panic!("timer should be active"),
        }
    }

    #[test]
    fn test_idle_elapsed_is_zero() {
        let f = fixture(at(10, 0, 0));
        assert_eq!(f.timer.status(), TimerStatus::Idle);
        assert_eq!(f.timer.elapsed_seconds(), 0);
        assert!(f.timer.selection().is_none());
    }

    #[test]
    fn test_start_writes_running_snapshot() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());

        assert_eq!(f.timer.status(), TimerStatus::Running);
        assert!(f.store.contains(RUNNING_KEY));
        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_start_clears_stale_paused_snapshot() {
        let mut f = fixture(at(10, 0, 0));
        f.store.set(PAUSED_KEY, "stale").unwrap();
        start(&mut f.timer, optics_notes());

        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_elapsed_follows_wall_clock() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());

        f.clock.advance(95);
        assert_eq!(f.timer.elapsed_seconds(), 95);
        // Reading elapsed is side-effect free
        assert_eq!(f.timer.elapsed_seconds(), 95);
    }

    #[test]
    fn test_pause_replaces_running_snapshot() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(30);

        assert_eq!(pause(&mut f.timer), 30);
        assert_eq!(f.timer.status(), TimerStatus::Paused);
        assert!(f.store.contains(PAUSED_KEY));
        assert!(!f.store.contains(RUNNING_KEY));

        // Paused time does not count
        f.clock.advance(600);
        assert_eq!(f.timer.elapsed_seconds(), 30);
    }

    #[test]
    fn test_resume_replaces_paused_snapshot() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(30);
        pause(&mut f.timer);
        f.clock.advance(100);
        resume(&mut f.timer);

        assert_eq!(f.timer.status(), TimerStatus::Running);
        assert!(f.store.contains(RUNNING_KEY));
        assert!(!f.store.contains(PAUSED_KEY));
        f.clock.advance(10);
        assert_eq!(f.timer.elapsed_seconds(), 40);
    }

    #[test]
    fn test_pause_then_resume_without_time_changes_nothing() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(42);

        let before = f.timer.elapsed_seconds();
        pause(&mut f.timer);
        resume(&mut f.timer);
        assert_eq!(f.timer.elapsed_seconds(), before);
    }

    #[test]
    fn test_scenario_pause_resume_end() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());

        f.clock.set(at(10, 0, 30));
        assert_eq!(pause(&mut f.timer), 30);
        f.clock.set(at(10, 5, 0));
        resume(&mut f.timer);
        f.clock.set(at(10, 5, 20));

        let session = end(&mut f.timer, &mut f.ledger).unwrap();
        assert_eq!(session.duration, 50);
        assert_eq!(session.subject, Some(Subject::Physics));
        assert_eq!(session.chapter_serial, Some(5));
        assert_eq!(session.material.as_deref(), Some("Notes"));
        assert_eq!(session.kind, SessionKind::Chapter);
        assert_eq!(session.start_time, at(10, 0, 0));
        assert_eq!(session.end_time, at(10, 5, 20));

        assert_eq!(f.ledger.len(), 1);
        assert_eq!(f.timer.status(), TimerStatus::Idle);
        assert!(!f.store.contains(RUNNING_KEY));
        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_duration_is_sum_of_running_intervals() {
        let mut f = fixture(at(9, 0, 0));
        start(&mut f.timer, SubjectSelection::default());

        let intervals = [(120, 3000), (45, 10), (600, 86_400), (7, 0)];
        let mut expected = 0;
        for (i, (running, gap)) in intervals.iter().enumerate() {
            f.clock.advance(*running);
            expected += *running as u64;
            if i + 1 < intervals.len() {
                pause(&mut f.timer);
                f.clock.advance(*gap);
                resume(&mut f.timer);
            }
        }

        let session = end(&mut f.timer, &mut f.ledger).unwrap();
        assert_eq!(session.duration, expected);
    }

    #[test]
    fn test_end_from_paused_uses_frozen_elapsed() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(70);
        pause(&mut f.timer);
        f.clock.advance(3600);

        let session = end(&mut f.timer, &mut f.ledger).unwrap();
        assert_eq!(session.duration, 70);
    }

    #[test]
    fn test_end_with_zero_elapsed_records_nothing() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());

        assert_eq!(end(&mut f.timer, &mut f.ledger), None);
        assert!(f.ledger.is_empty());
        assert_eq!(f.timer.status(), TimerStatus::Idle);
        assert!(!f.store.contains(RUNNING_KEY));
    }

    #[test]
    fn test_end_keeps_last_selection() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(5);
        end(&mut f.timer, &mut f.ledger);

        assert_eq!(f.timer.last_selection(), &optics_notes());
    }

    #[test]
    fn test_discard_never_records() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(1800);
        discard(&mut f.timer);

        assert!(f.ledger.is_empty());
        assert_eq!(f.timer.status(), TimerStatus::Idle);
        assert_eq!(f.timer.last_selection(), &SubjectSelection::default());
        assert!(!f.store.contains(RUNNING_KEY));
        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_discard_from_paused() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(20);
        pause(&mut f.timer);
        discard(&mut f.timer);

        assert!(f.ledger.is_empty());
        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_start_then_immediate_discard() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, SubjectSelection::default());
        discard(&mut f.timer);

        assert!(f.ledger.is_empty());
        assert!(!f.store.contains(RUNNING_KEY));
        assert!(!f.store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_recover_running_counts_downtime() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(30);
        pause(&mut f.timer);
        f.clock.advance(60);
        resume(&mut f.timer);
        drop(f.timer);

        // Process is gone for two hours
        f.clock.advance(7200);
        let recovered = StudyTimer::recover(f.store.clone(), f.clock.clone());
        assert_eq!(recovered.status(), TimerStatus::Running);
        assert_eq!(recovered.elapsed_seconds(), 30 + 7200);
        assert_eq!(recovered.selection(), Some(&optics_notes()));
    }

    #[test]
    fn test_recover_from_raw_running_snapshot() {
        let store = MemoryStore::new();
        let snapshots = SnapshotManager::new(store.clone());
        let t0 = at(8, 0, 0);
        snapshots.write_running(&RunningSnapshot {
            started_at: t0,
            accumulated_seconds: 300,
            session_started_at: None,
            selection: SubjectSelection::default(),
        });

        let clock = ManualClock::new(at(8, 20, 0));
        let timer = StudyTimer::recover(store, clock);
        assert_eq!(timer.elapsed_seconds(), 300 + 1200);
        match timer.state() {
            TimerState::Running(run) => assert_eq!(run.session_started_at, at(7, 55, 0)),
            other => panic!("expected running, got {:?}", other),
        }
    }

    #[test]
    fn test_recover_paused() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(45);
        pause(&mut f.timer);
        f.clock.advance(9999);

        let recovered = StudyTimer::recover(f.store.clone(), f.clock.clone());
        assert_eq!(recovered.status(), TimerStatus::Paused);
        assert_eq!(recovered.elapsed_seconds(), 45);
    }

    #[test]
    fn test_recovered_run_records_original_start() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(100);

        let mut recovered = StudyTimer::recover(f.store.clone(), f.clock.clone());
        f.clock.advance(20);
        let session = end(&mut recovered, &mut f.ledger).unwrap();
        assert_eq!(session.start_time, at(10, 0, 0));
        assert_eq!(session.duration, 120);
    }

    #[test]
    fn test_recover_with_corrupt_snapshot_is_idle() {
        let store = MemoryStore::new();
        store.set(RUNNING_KEY, "garbage").unwrap();

        let timer = StudyTimer::recover(store.clone(), ManualClock::new(at(10, 0, 0)));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert!(!store.contains(RUNNING_KEY));
        assert!(!store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_recover_with_out_of_range_banked_time_is_idle() {
        let store = MemoryStore::new();
        store
            .set(
                RUNNING_KEY,
                r#"{"started_at":"2024-03-01T10:00:00Z","accumulated_seconds":1000000000000000,"selection":{"kind":"custom","title":""}}"#,
            )
            .unwrap();

        let timer = StudyTimer::recover(store.clone(), ManualClock::new(at(10, 0, 0)));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert!(!store.contains(RUNNING_KEY));

        store
            .set(
                PAUSED_KEY,
                r#"{"accumulated_seconds":18446744073709551615,"selection":{"kind":"custom","title":""}}"#,
            )
            .unwrap();
        let timer = StudyTimer::recover(store.clone(), ManualClock::new(at(10, 0, 0)));
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert!(!store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_elapsed_saturates_on_huge_banked_time() {
        let store = MemoryStore::new();
        store
            .set(
                RUNNING_KEY,
                r#"{"started_at":"2024-03-01T10:00:00Z","accumulated_seconds":18446744073709551615,"session_started_at":"2024-03-01T10:00:00Z","selection":{"kind":"custom","title":""}}"#,
            )
            .unwrap();
        let clock = ManualClock::new(at(10, 0, 0));
        let timer = StudyTimer::recover(store, clock.clone());

        clock.advance(10);
        assert_eq!(timer.status(), TimerStatus::Running);
        assert_eq!(timer.elapsed_seconds(), u64::MAX);
    }

    #[test]
    fn test_end_keeps_run_when_ledger_write_fails() {
        let mut f = fixture(at(10, 0, 0));
        let mut broken = SessionLedger::load(FailingStore).unwrap();
        start(&mut f.timer, optics_notes());
        f.clock.advance(1800);

        let result = match f.timer.controls() {
            TimerControls::Running(running) => running.end(&mut broken),
            _ => panic!("timer should be running"),
        };
        assert!(result.is_err());
        assert!(broken.is_empty());
        assert_eq!(f.timer.status(), TimerStatus::Running);
        assert_eq!(f.timer.elapsed_seconds(), 1800);
        assert!(f.store.contains(RUNNING_KEY));

        // The run survives a restart and can still be recorded
        let mut recovered = StudyTimer::recover(f.store.clone(), f.clock.clone());
        assert_eq!(recovered.elapsed_seconds(), 1800);
        let session = end(&mut recovered, &mut f.ledger).unwrap();
        assert_eq!(session.duration, 1800);
        assert_eq!(session.start_time, at(10, 0, 0));
    }

    #[test]
    fn test_end_from_paused_keeps_run_when_ledger_write_fails() {
        let mut f = fixture(at(10, 0, 0));
        let mut broken = SessionLedger::load(FailingStore).unwrap();
        start(&mut f.timer, optics_notes());
        f.clock.advance(90);
        pause(&mut f.timer);

        let result = match f.timer.controls() {
            TimerControls::Paused(paused) => paused.end(&mut broken),
            _ => panic!("timer should be paused"),
        };
        assert!(result.is_err());
        assert_eq!(f.timer.status(), TimerStatus::Paused);
        assert!(f.store.contains(PAUSED_KEY));
        assert!(!f.store.contains(RUNNING_KEY));
    }

    #[test]
    fn test_backwards_clock_never_reduces_banked_time() {
        let mut f = fixture(at(10, 0, 0));
        start(&mut f.timer, optics_notes());
        f.clock.advance(60);
        pause(&mut f.timer);
        resume(&mut f.timer);

        f.clock.advance(-300);
        assert_eq!(f.timer.elapsed_seconds(), 60);
        assert_eq!(pause(&mut f.timer), 60);
    }
}
