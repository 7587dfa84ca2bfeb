//! Supervisor lifecycle base
//!
//! Start/stop discipline shared by supervised components: `start` and
//! `stop` are idempotent, and a stopped component cannot be restarted.
//! The owning component holds its own quit channel; this module only
//! arbitrates the transitions.

use crate::error::{Error, Result};
use std::fmt;

/// Lifecycle phase of a supervised component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Constructed, not yet started
    Idle,

    /// Background task running
    Running,

    /// Stopped; terminal
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Idle => write!(f, "Idle"),
            ServiceState::Running => write!(f, "Running"),
            ServiceState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Lifecycle state machine for a single-shot supervised service
#[derive(Debug)]
pub struct Lifecycle {
    /// Component name, for error messages
    name: &'static str,

    /// Current phase
    state: ServiceState,
}

impl Lifecycle {
    /// Create an idle lifecycle
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: ServiceState::Idle,
        }
    }

    /// Current phase
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Whether the component may still be configured
    pub fn is_idle(&self) -> bool {
        self.state == ServiceState::Idle
    }

    /// Arbitrate a start request
    ///
    /// Returns `Ok(true)` when the caller should spawn its task,
    /// `Ok(false)` when already running (re-entrant no-op), and
    /// `InvalidState` once stopped: the service is single-shot.
    pub fn begin_start(&mut self) -> Result<bool> {
        match self.state {
            ServiceState::Idle => {
                self.state = ServiceState::Running;
                Ok(true)
            }
            ServiceState::Running => Ok(false),
            ServiceState::Stopped => Err(Error::InvalidState(format!(
                "{} already stopped",
                self.name
            ))),
        }
    }

    /// Arbitrate a stop request
    ///
    /// Returns `true` when the caller should tear its task down. Stopping
    /// an idle or already-stopped component is a no-op, but the component
    /// still lands in `Stopped`.
    pub fn begin_stop(&mut self) -> bool {
        let teardown = self.state == ServiceState::Running;
        self.state = ServiceState::Stopped;
        teardown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_reentrant_while_running() {
        let mut lifecycle = Lifecycle::new("test");
        assert!(lifecycle.begin_start().unwrap());
        assert!(!lifecycle.begin_start().unwrap());
        assert_eq!(lifecycle.state(), ServiceState::Running);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut lifecycle = Lifecycle::new("test");
        lifecycle.begin_start().unwrap();
        assert!(lifecycle.begin_stop());
        assert!(!lifecycle.begin_stop());
        assert_eq!(lifecycle.state(), ServiceState::Stopped);
    }

    #[test]
    fn start_after_stop_is_rejected() {
        let mut lifecycle = Lifecycle::new("test");
        lifecycle.begin_start().unwrap();
        lifecycle.begin_stop();
        assert!(lifecycle.begin_start().is_err());
    }

    #[test]
    fn stop_before_start_is_terminal() {
        let mut lifecycle = Lifecycle::new("test");
        assert!(!lifecycle.begin_stop());
        assert_eq!(lifecycle.state(), ServiceState::Stopped);
        assert!(lifecycle.begin_start().is_err());
    }
}
