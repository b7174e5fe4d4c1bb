//! Temporal hysteresis state machine.
//!
//! Converts a noisy per-frame "did anything pass the threshold policy"
//! signal into a stable binary scene state. A minimum run length of
//! consistent frames is required before the state flips, independently in
//! each direction, so single-frame noise cannot cause flicker.

/// A crossing of the debounced state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The scene became performative.
    Entered,
    /// The scene stopped being performative.
    Exited,
}

impl Transition {
    /// The new boolean state implied by the transition.
    pub fn is_performative(self) -> bool {
        matches!(self, Transition::Entered)
    }
}

/// Debounced detection state for one session.
///
/// Invariant: at most one of the two streaks is nonzero. Both are zero
/// only right after initialization, a full reset, or a frames-threshold
/// change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectionState {
    is_performative: bool,
    match_streak: u32,
    non_match_streak: u32,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_performative(&self) -> bool {
        self.is_performative
    }

    pub fn match_streak(&self) -> u32 {
        self.match_streak
    }

    pub fn non_match_streak(&self) -> u32 {
        self.non_match_streak
    }

    /// Feed one processed frame into the state machine.
    ///
    /// `has_match` is whether the frame's pass set was non-empty. Returns
    /// a transition when, and only when, a run-length threshold is crossed
    /// in the relevant direction; a no-op "transition" to the same state
    /// never emits.
    pub fn observe(
        &mut self,
        has_match: bool,
        frames_enter: u32,
        frames_exit: u32,
    ) -> Option<Transition> {
        if has_match {
            self.match_streak += 1;
            self.non_match_streak = 0;
        } else {
            self.non_match_streak += 1;
            self.match_streak = 0;
        }

        if !self.is_performative && self.match_streak >= frames_enter {
            self.is_performative = true;
            Some(Transition::Entered)
        } else if self.is_performative && self.non_match_streak >= frames_exit {
            self.is_performative = false;
            Some(Transition::Exited)
        } else {
            None
        }
    }

    /// Reset to the initial state. Done on session start and stop.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Forget the current match streak. A partially-built streak under an
    /// old `frames_enter` must not count toward a new one.
    pub fn reset_match_streak(&mut self) {
        self.match_streak = 0;
    }

    /// Forget the current non-match streak (see `reset_match_streak`).
    pub fn reset_non_match_streak(&mut self) {
        self.non_match_streak = 0;
    }
}
