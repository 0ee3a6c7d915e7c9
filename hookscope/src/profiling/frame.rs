//! Invocation stack frames.

use crate::domain::{Duration, Priority, Timestamp};

/// One in-flight event invocation.
///
/// Lives on the tracker's stack from the start probe to the stop probe of
/// its event. Only the top frame is ever mutated.
#[derive(Debug, Clone)]
pub struct InvocationFrame {
    pub event_name: String,
    pub start_time: Timestamp,
    /// When the currently running phase began.
    pub phase_start_time: Timestamp,
    /// Ascending priorities at which a phase probe fires for this event.
    pub phase_boundaries: Vec<Priority>,
    /// Next boundary to close. Never exceeds `phase_boundaries.len()`.
    pub current_phase_index: usize,
    /// Time spent in nested invocations since the current phase began.
    pub sub_call_time: Duration,
}

impl InvocationFrame {
    #[must_use]
    pub fn new(event_name: &str, now: Timestamp, phase_boundaries: Vec<Priority>) -> Self {
        Self {
            event_name: event_name.to_string(),
            start_time: now,
            phase_start_time: now,
            phase_boundaries,
            current_phase_index: 0,
            sub_call_time: Duration::ZERO,
        }
    }

    /// The boundary the next phase probe will close, if any are left.
    #[must_use]
    pub fn current_boundary(&self) -> Option<Priority> {
        self.phase_boundaries.get(self.current_phase_index).copied()
    }

    /// Close the running phase at `now`.
    ///
    /// Returns the closed boundary and the time attributed to it (elapsed
    /// minus nested time), or `None` when every boundary is already closed.
    pub fn close_phase(&mut self, now: Timestamp) -> Option<(Priority, Duration)> {
        let boundary = self.current_boundary()?;
        let elapsed = now.duration_since(self.phase_start_time).saturating_sub(self.sub_call_time);
        self.phase_start_time = now;
        self.sub_call_time = Duration::ZERO;
        self.current_phase_index += 1;
        Some((boundary, elapsed))
    }
}
