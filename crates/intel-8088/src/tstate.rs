//! T-state machine.
//!
//! Every bus cycle runs T1-T4, stretched by wait states (Tw) while READY is
//! low; Ti fills the gaps between bus cycles. The 8088 samples READY at the
//! end of T3, so a low READY observed entering T3 inserts Tw, and data
//! becomes valid on the cycle READY is seen high again.

use std::fmt;

/// T-state within (or between) bus cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TState {
    /// Idle: no bus cycle in progress.
    Ti,
    T1,
    T2,
    T3,
    /// Wait state inserted by a low READY.
    Tw,
    T4,
}

impl TState {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Ti => "Ti",
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::T3 => "T3",
            Self::Tw => "Tw",
            Self::T4 => "T4",
        }
    }

    /// Advance one clock.
    ///
    /// `ale` forces T1 from any state (a new bus cycle has started). `ready`
    /// is the READY pin on the current edge, `prev_ready` on the previous
    /// one. Returns the new state and whether the data bus holds valid data
    /// on this cycle.
    #[must_use]
    pub fn advance(self, ale: bool, ready: bool, prev_ready: bool) -> (Self, bool) {
        if ale {
            return (Self::T1, false);
        }
        match self {
            Self::Ti => (Self::Ti, false),
            Self::T1 => (Self::T2, false),
            Self::T2 => (Self::T3, ready),
            Self::T3 => {
                if !prev_ready {
                    (Self::Tw, ready)
                } else if ready {
                    (Self::T4, false)
                } else {
                    (Self::Tw, false)
                }
            }
            Self::Tw => {
                if prev_ready {
                    (Self::T4, false)
                } else {
                    (Self::Tw, ready)
                }
            }
            Self::T4 => (Self::Ti, false),
        }
    }
}

impl fmt::Display for TState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
