//! Change coalescing
//!
//! Text edits, caret moves and structural changes arrive in bursts. Each one
//! restarts a single-shot timer and ORs its kind into the pending set, so
//! work only runs once input has been quiet for the update interval.
//!
//! The timer is an injected [`Scheduler`]. Hosts drive a real clock through
//! [`DeadlineScheduler`]; tests advance a [`VirtualScheduler`].

use crate::config::DesignerConfig;
use crate::error::ConfigError;
use bitflags::bitflags;
use std::time::{Duration, Instant};

bitflags! {
    /// Kinds of change waiting to be processed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeKind: u8 {
        /// The source text changed
        const DOCUMENT = 1 << 0;
        /// The caret moved
        const SELECTION = 1 << 1;
        /// Something outside the text changed the dialog (localization, styles)
        const STRUCTURE = 1 << 2;
    }
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(pub u64);

/// Single-shot delayed callbacks.
pub trait Scheduler {
    /// Arrange for `token` to be delivered after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerToken;

    /// Drop a scheduled timer. Unknown tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

/// Coalescer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerState {
    Idle,
    Pending { token: TimerToken },
    Firing,
}

/// Which kind of work a fired update needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    FullRebuild,
    Reconcile,
    SelectionOnly,
}

/// Work to run for one fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePlan {
    pub changes: ChangeKind,
    /// Reparse the document text
    pub reparse: bool,
    /// Diff controls against the rendered set
    pub reconcile: bool,
    /// Recompute the selected control
    pub refresh_selection: bool,
}

impl UpdatePlan {
    fn from_changes(changes: ChangeKind) -> Self {
        let document = changes.contains(ChangeKind::DOCUMENT);
        Self {
            changes,
            reparse: document,
            reconcile: document || changes.contains(ChangeKind::STRUCTURE),
            refresh_selection: document || changes.contains(ChangeKind::SELECTION),
        }
    }

    pub fn kind(&self) -> UpdateKind {
        if self.reparse {
            UpdateKind::FullRebuild
        } else if self.reconcile {
            UpdateKind::Reconcile
        } else {
            UpdateKind::SelectionOnly
        }
    }
}

/// Debounce state machine.
#[derive(Debug, Clone)]
pub struct ChangeCoalescer {
    delay: Duration,
    state: CoalescerState,
    pending: ChangeKind,
}

impl ChangeCoalescer {
    /// A coalescer waiting `delay` after the last change. Zero is rejected.
    pub fn new(delay: Duration) -> Result<Self, ConfigError> {
        Ok(Self::with_delay(check_delay(delay)?))
    }

    /// A coalescer using the configured update interval.
    pub fn from_config(config: &DesignerConfig) -> Self {
        Self::with_delay(config.update_delay())
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            state: CoalescerState::Idle,
            pending: ChangeKind::empty(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Takes effect from the next notification. Zero is rejected.
    pub fn set_delay(&mut self, delay: Duration) -> Result<(), ConfigError> {
        self.delay = check_delay(delay)?;
        Ok(())
    }

    pub fn state(&self) -> CoalescerState {
        self.state
    }

    pub fn pending(&self) -> ChangeKind {
        self.pending
    }

    /// Record a change and restart the timer.
    pub fn notify<S: Scheduler>(&mut self, kind: ChangeKind, scheduler: &mut S) -> TimerToken {
        if let CoalescerState::Pending { token } = self.state {
            scheduler.cancel(token);
        }
        self.pending |= kind;
        let token = scheduler.schedule(self.delay);
        self.state = CoalescerState::Pending { token };
        token
    }

    /// Handle a delivered timer. Stale tokens yield `None`.
    ///
    /// On success the pending set is cleared and the coalescer is `Firing`
    /// until [`finish`](Self::finish).
    pub fn fire(&mut self, token: TimerToken) -> Option<UpdatePlan> {
        match self.state {
            CoalescerState::Pending { token: current } if current == token => {
                let changes = std::mem::take(&mut self.pending);
                self.state = CoalescerState::Firing;
                Some(UpdatePlan::from_changes(changes))
            }
            _ => None,
        }
    }

    /// End a firing. A notification that arrived meanwhile stays pending.
    pub fn finish(&mut self) {
        if self.state == CoalescerState::Firing {
            self.state = CoalescerState::Idle;
        }
    }

    /// Drop pending work and stop the timer.
    pub fn cancel<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let CoalescerState::Pending { token } = self.state {
            scheduler.cancel(token);
        }
        self.pending = ChangeKind::empty();
        self.state = CoalescerState::Idle;
    }
}

fn check_delay(delay: Duration) -> Result<Duration, ConfigError> {
    if delay.is_zero() {
        return Err(ConfigError::NonPositiveUpdateInterval(0.0));
    }
    Ok(delay)
}

/// Scheduler driven by an explicit virtual clock.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now: Duration,
    next_token: u64,
    timers: Vec<(TimerToken, Duration)>,
    scheduled: usize,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Timers currently armed.
    pub fn armed(&self) -> usize {
        self.timers.len()
    }

    /// Total timers ever scheduled.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled
    }

    /// Move the clock forward and return the timers that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(TimerToken, Duration)> = Vec::new();
        self.timers.retain(|&(token, deadline)| {
            if deadline <= now {
                due.push((token, deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(token, deadline)| (deadline, token));
        due.into_iter().map(|(token, _)| token).collect()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.timers.push((token, self.now + delay));
        self.scheduled += 1;
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.timers.retain(|&(t, _)| t != token);
    }
}

/// Scheduler on the wall clock. The host polls [`due`](Self::due).
#[derive(Debug, Clone, Default)]
pub struct DeadlineScheduler {
    next_token: u64,
    timers: Vec<(TimerToken, Instant)>,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|&(_, deadline)| deadline).min()
    }

    /// Timers whose deadline has passed at `now`; they are disarmed.
    pub fn due(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut ready = Vec::new();
        self.timers.retain(|&(token, deadline)| {
            if deadline <= now {
                ready.push(token);
                false
            } else {
                true
            }
        });
        ready
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.timers.push((token, Instant::now() + delay));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.timers.retain(|&(t, _)| t != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_starts_idle() {
        let coalescer = ChangeCoalescer::new(DELAY).unwrap();
        assert_eq!(coalescer.state(), CoalescerState::Idle);
        assert!(coalescer.pending().is_empty());
    }

    #[test]
    fn test_zero_delay_is_rejected() {
        assert!(matches!(
            ChangeCoalescer::new(Duration::ZERO),
            Err(ConfigError::NonPositiveUpdateInterval(_))
        ));

        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();
        assert!(coalescer.set_delay(Duration::ZERO).is_err());
        assert_eq!(coalescer.delay(), DELAY);

        coalescer.set_delay(Duration::from_millis(50)).unwrap();
        assert_eq!(coalescer.delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_from_config() {
        let coalescer = ChangeCoalescer::from_config(&DesignerConfig::default());
        assert_eq!(coalescer.delay(), DELAY);
    }

    #[test]
    fn test_burst_produces_one_update() {
        let mut scheduler = VirtualScheduler::new();
        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();

        let mut fired = Vec::new();
        for _ in 0..10 {
            coalescer.notify(ChangeKind::DOCUMENT, &mut scheduler);
            for token in scheduler.advance(Duration::from_millis(100)) {
                fired.extend(coalescer.fire(token));
            }
        }
        assert!(fired.is_empty());
        assert_eq!(scheduler.armed(), 1);

        for token in scheduler.advance(DELAY) {
            fired.extend(coalescer.fire(token));
        }
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].changes, ChangeKind::DOCUMENT);
        assert_eq!(coalescer.state(), CoalescerState::Firing);

        coalescer.finish();
        assert_eq!(coalescer.state(), CoalescerState::Idle);
    }

    #[test]
    fn test_pending_set_is_union() {
        let mut scheduler = VirtualScheduler::new();
        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();

        coalescer.notify(ChangeKind::SELECTION, &mut scheduler);
        coalescer.notify(ChangeKind::STRUCTURE, &mut scheduler);
        let token = coalescer.notify(ChangeKind::SELECTION, &mut scheduler);
        assert_eq!(coalescer.pending(), ChangeKind::SELECTION | ChangeKind::STRUCTURE);

        let due = scheduler.advance(DELAY);
        assert_eq!(due, vec![token]);
        let plan = coalescer.fire(token).unwrap();
        assert_eq!(plan.changes, ChangeKind::SELECTION | ChangeKind::STRUCTURE);
        assert!(coalescer.pending().is_empty());
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut scheduler = VirtualScheduler::new();
        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();

        let first = coalescer.notify(ChangeKind::DOCUMENT, &mut scheduler);
        let second = coalescer.notify(ChangeKind::DOCUMENT, &mut scheduler);
        assert_ne!(first, second);
        assert_eq!(coalescer.fire(first), None);
        assert!(coalescer.fire(second).is_some());
        assert_eq!(coalescer.fire(second), None);
    }

    #[test]
    fn test_plan_kinds() {
        let full = UpdatePlan::from_changes(ChangeKind::DOCUMENT);
        assert_eq!(full.kind(), UpdateKind::FullRebuild);
        assert!(full.reconcile);
        assert!(full.refresh_selection);

        let structure = UpdatePlan::from_changes(ChangeKind::STRUCTURE);
        assert_eq!(structure.kind(), UpdateKind::Reconcile);
        assert!(!structure.reparse);
        assert!(!structure.refresh_selection);

        let both = UpdatePlan::from_changes(ChangeKind::STRUCTURE | ChangeKind::SELECTION);
        assert_eq!(both.kind(), UpdateKind::Reconcile);
        assert!(both.refresh_selection);

        let selection = UpdatePlan::from_changes(ChangeKind::SELECTION);
        assert_eq!(selection.kind(), UpdateKind::SelectionOnly);
        assert!(!selection.reconcile);
    }

    #[test]
    fn test_notify_while_firing_stays_pending() {
        let mut scheduler = VirtualScheduler::new();
        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();

        let token = coalescer.notify(ChangeKind::DOCUMENT, &mut scheduler);
        scheduler.advance(DELAY);
        coalescer.fire(token).unwrap();

        let next = coalescer.notify(ChangeKind::SELECTION, &mut scheduler);
        coalescer.finish();
        assert_eq!(coalescer.state(), CoalescerState::Pending { token: next });
        assert_eq!(coalescer.pending(), ChangeKind::SELECTION);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = VirtualScheduler::new();
        let mut coalescer = ChangeCoalescer::new(DELAY).unwrap();
        let token = coalescer.notify(ChangeKind::DOCUMENT, &mut scheduler);
        coalescer.cancel(&mut scheduler);
        assert_eq!(scheduler.armed(), 0);
        assert_eq!(coalescer.fire(token), None);
        assert_eq!(coalescer.state(), CoalescerState::Idle);
    }

    #[test]
    fn test_deadline_scheduler() {
        let mut scheduler = DeadlineScheduler::new();
        let start = Instant::now();
        let token = scheduler.schedule(Duration::from_millis(50));
        assert!(scheduler.due(start).is_empty());
        assert!(scheduler.next_deadline().is_some());

        let later = start + Duration::from_secs(1);
        assert_eq!(scheduler.due(later), vec![token]);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
