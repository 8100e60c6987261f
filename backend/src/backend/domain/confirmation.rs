//! Two-phase "click again to confirm" deletes.
//!
//! The first request for a target arms the confirmation. A second request for
//! the same target before the window closes confirms it. Anything else (a
//! different target, or the same one after expiry) re-arms.
//!
//! Time is passed in rather than read, so the machine stays deterministic.

use std::time::{Duration, Instant};

pub const CONFIRMATION_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationState {
    Idle,
    Armed { target: String, expires_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Nothing was deleted; repeat the request within `expires_in`
    Armed { expires_in: Duration },
    /// The caller may now delete the target
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    state: ConfirmationState,
    window: Duration,
}

impl Default for DeleteConfirmation {
    fn default() -> Self {
        Self::new(CONFIRMATION_WINDOW)
    }
}

impl DeleteConfirmation {
    pub fn new(window: Duration) -> Self {
        Self {
            state: ConfirmationState::Idle,
            window,
        }
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    pub fn request(&mut self, target: &str, now: Instant) -> ConfirmationOutcome {
        match &self.state {
            ConfirmationState::Armed {
                target: armed,
                expires_at,
            } if armed == target && now < *expires_at => {
                self.state = ConfirmationState::Idle;
                ConfirmationOutcome::Confirmed
            }
            _ => {
                self.state = ConfirmationState::Armed {
                    target: target.to_string(),
                    expires_at: now + self.window,
                };
                ConfirmationOutcome::Armed {
                    expires_in: self.window,
                }
            }
        }
    }
}
