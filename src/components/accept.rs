use std::time::{Duration, Instant};

use tracing::debug;

use crate::timer::TimerSlot;

/// Fade duration, and the delay between the accept key and the commit.
pub const ACCEPT_DELAY: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptPhase {
    /// No completion to show.
    Idle,
    /// Ghost text is showing.
    Suggested,
    /// Ghost text is fading; a commit is pending.
    Accepting,
    /// The composed value was emitted; waiting for the host to catch up.
    Committed,
}

/// Lifecycle of one completion, from suggestion to commit.
#[derive(Debug)]
pub struct AcceptState {
    phase: AcceptPhase,
    value: String,
    completion: String,
    fade_started: Option<Instant>,
    commit: TimerSlot<String>,
}

impl AcceptState {
    pub fn new(value: &str, completion: &str) -> Self {
        Self {
            phase: phase_for(completion),
            value: value.to_owned(),
            completion: completion.to_owned(),
            fade_started: None,
            commit: TimerSlot::new(),
        }
    }

    pub fn phase(&self) -> AcceptPhase {
        self.phase
    }

    pub fn completion(&self) -> &str {
        &self.completion
    }

    /// Takes in the host's current pair. A different pair drops any pending
    /// commit, since it was composed from stale text, and restores full
    /// visibility.
    pub fn observe(&mut self, value: &str, completion: &str) -> bool {
        if self.value == value && self.completion == completion {
            return false;
        }
        if self.commit.cancel().is_some() {
            debug!("value or completion changed during accept; pending commit dropped");
        }
        self.value.clear();
        self.value.push_str(value);
        self.completion.clear();
        self.completion.push_str(completion);
        self.fade_started = None;

        let next = phase_for(completion);
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, "completion phase changed");
        }
        self.phase = next;
        true
    }

    /// Starts, or restarts, the accept sequence. Without a completion this
    /// does nothing and returns `false`.
    pub fn accept(&mut self, now: Instant) -> bool {
        if self.completion.is_empty() {
            return false;
        }
        let composed = format!("{}{}", self.value, self.completion);
        let restarted = self.commit.is_armed();
        self.commit.arm(now + ACCEPT_DELAY, composed);
        self.fade_started.get_or_insert(now);
        self.phase = AcceptPhase::Accepting;
        debug!(restarted, "accept started");
        true
    }

    /// Returns the composed value once the delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let composed = self.commit.fire(now)?;
        self.phase = AcceptPhase::Committed;
        debug!(len = composed.len(), "completion committed");
        Some(composed)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.commit.deadline()
    }

    /// Fade level of the ghost text at `now`, from 1.0 (fully shown) to 0.0.
    pub fn visibility(&self, now: Instant) -> f32 {
        match self.phase {
            AcceptPhase::Idle | AcceptPhase::Suggested => 1.0,
            AcceptPhase::Committed => 0.0,
            AcceptPhase::Accepting => {
                let Some(started) = self.fade_started else {
                    return 1.0;
                };
                let elapsed = now.saturating_duration_since(started).as_secs_f32();
                (1.0 - elapsed / ACCEPT_DELAY.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        self.phase == AcceptPhase::Accepting && self.visibility(now) > 0.0
    }

    /// Drops a pending commit. Used on teardown.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.commit.cancel().is_some();
        if cancelled {
            debug!("pending commit cancelled");
            self.phase = phase_for(&self.completion);
            self.fade_started = None;
        }
        cancelled
    }
}

fn phase_for(completion: &str) -> AcceptPhase {
    if completion.is_empty() {
        AcceptPhase::Idle
    } else {
        AcceptPhase::Suggested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn new_completion_is_suggested() {
        let state = AcceptState::new("Hello", " there!");

        assert_eq!(state.phase(), AcceptPhase::Suggested);
        assert_eq!(state.visibility(Instant::now()), 1.0);
    }

    #[test]
    fn commit_arrives_after_the_delay() {
        let start = Instant::now();
        let mut state = AcceptState::new("Hello", " there!");

        assert!(state.accept(start));
        assert_eq!(state.phase(), AcceptPhase::Accepting);
        assert_eq!(state.poll(start + millis(149)), None);
        assert_eq!(
            state.poll(start + ACCEPT_DELAY),
            Some("Hello there!".to_owned())
        );
        assert_eq!(state.phase(), AcceptPhase::Committed);
        assert_eq!(state.poll(start + millis(500)), None);
    }

    #[test]
    fn accept_without_completion_is_a_no_op() {
        let start = Instant::now();
        let mut state = AcceptState::new("Hello", "");

        assert!(!state.accept(start));
        assert_eq!(state.phase(), AcceptPhase::Idle);
        assert_eq!(state.deadline(), None);
    }

    #[test]
    fn retrigger_replaces_the_pending_commit() {
        let start = Instant::now();
        let mut state = AcceptState::new("Hi", "!");

        state.accept(start);
        state.accept(start + millis(100));

        assert_eq!(state.poll(start + ACCEPT_DELAY), None);
        assert_eq!(
            state.poll(start + millis(100) + ACCEPT_DELAY),
            Some("Hi!".to_owned())
        );
        assert_eq!(state.poll(start + millis(1000)), None);
    }

    #[test]
    fn fade_runs_from_first_trigger() {
        let start = Instant::now();
        let mut state = AcceptState::new("a", "b");

        state.accept(start);
        let halfway = state.visibility(start + millis(75));
        state.accept(start + millis(75));

        assert!((halfway - 0.5).abs() < 0.01);
        assert_eq!(state.visibility(start + millis(75)), halfway);
        assert_eq!(state.visibility(start + millis(200)), 0.0);
        assert!(!state.is_fading(start + millis(200)));
    }

    #[test]
    fn changed_inputs_drop_a_stale_commit() {
        let start = Instant::now();
        let mut state = AcceptState::new("Hel", "lo");

        state.accept(start);
        assert!(state.observe("Help", ""));

        assert_eq!(state.poll(start + ACCEPT_DELAY), None);
        assert_eq!(state.phase(), AcceptPhase::Idle);
    }

    #[test]
    fn new_pair_after_commit_restores_visibility() {
        let start = Instant::now();
        let mut state = AcceptState::new("Hello", " there!");
        state.accept(start);
        state.poll(start + ACCEPT_DELAY);
        assert_eq!(state.visibility(start + ACCEPT_DELAY), 0.0);

        state.observe("Hello there!", " How are you?");

        assert_eq!(state.phase(), AcceptPhase::Suggested);
        assert_eq!(state.visibility(start + ACCEPT_DELAY), 1.0);
    }

    #[test]
    fn observing_the_same_pair_changes_nothing() {
        let start = Instant::now();
        let mut state = AcceptState::new("x", "y");
        state.accept(start);

        assert!(!state.observe("x", "y"));
        assert_eq!(state.deadline(), Some(start + ACCEPT_DELAY));
    }

    #[test]
    fn cancel_returns_to_suggested() {
        let start = Instant::now();
        let mut state = AcceptState::new("x", "y");
        state.accept(start);

        assert!(state.cancel());
        assert_eq!(state.phase(), AcceptPhase::Suggested);
        assert_eq!(state.poll(start + ACCEPT_DELAY), None);
        assert!(!state.cancel());
    }
}
