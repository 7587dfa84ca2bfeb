//! Validator switch protocol values
//!
//! A `SwitchValidator` names one active validator to retire and one
//! standby to promote. The manager emits it with `origin = Local`; the
//! consensus coordinator answers with the same value carrying
//! `origin = Remote` and an empty reason on success. Values carry peer
//! ids only; records are looked up at application time.

use crate::validator::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reason string carried by locally originated switch requests
pub const SWITCH_REASON: &str = "Switch";

/// Where a switch value originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchOrigin {
    /// Emitted by this manager's tick loop
    Local,

    /// Returned by the consensus coordinator
    Remote,
}

impl fmt::Display for SwitchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchOrigin::Local => write!(f, "Local"),
            SwitchOrigin::Remote => write!(f, "Remote"),
        }
    }
}

/// Request or outcome of one validator switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchValidator {
    /// Active validator being switched out
    pub remove: PeerId,

    /// Standby validator being promoted
    pub add: PeerId,

    /// Empty on success; diagnostic text otherwise
    pub reason: String,

    /// Origin of this value
    pub origin: SwitchOrigin,
}

impl SwitchValidator {
    /// Build a locally originated switch request
    pub fn request(remove: PeerId, add: PeerId) -> Self {
        Self {
            remove,
            add,
            reason: SWITCH_REASON.to_string(),
            origin: SwitchOrigin::Local,
        }
    }

    /// Turn this value into a coordinator outcome
    ///
    /// An empty reason marks success.
    pub fn into_outcome(self, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            origin: SwitchOrigin::Remote,
            ..self
        }
    }

    /// Whether this outcome reports success
    pub fn is_success(&self) -> bool {
        self.reason.is_empty()
    }
}

impl fmt::Display for SwitchValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwitchValidator{{remove:{} add:{} reason:{:?} origin:{}}}",
            self.remove, self.add, self.reason, self.origin
        )
    }
}

/// Applied switch outcome, kept in the manager's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchEvent {
    /// Validator switched out
    pub removed: PeerId,

    /// Validator promoted
    pub promoted: PeerId,

    /// Whether the switch was applied
    pub success: bool,

    /// Coordinator-supplied reason on failure
    pub reason: String,

    /// Unix timestamp of application
    pub timestamp: u64,
}

impl SwitchEvent {
    /// Record the application of a switch outcome
    pub fn new(outcome: &SwitchValidator) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        Self {
            removed: outcome.remove.clone(),
            promoted: outcome.add.clone(),
            success: outcome.is_success(),
            reason: outcome.reason.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_switch_reason_and_local_origin() {
        let sv = SwitchValidator::request(PeerId::from("dead"), PeerId::from("fresh"));
        assert_eq!(sv.reason, SWITCH_REASON);
        assert_eq!(sv.origin, SwitchOrigin::Local);
        assert!(!sv.is_success());
    }

    #[test]
    fn outcome_flips_origin_and_success_tracks_reason() {
        let sv = SwitchValidator::request(PeerId::from("dead"), PeerId::from("fresh"));

        let ok = sv.clone().into_outcome("");
        assert_eq!(ok.origin, SwitchOrigin::Remote);
        assert!(ok.is_success());

        let rejected = sv.into_outcome("rejected");
        assert_eq!(rejected.origin, SwitchOrigin::Remote);
        assert!(!rejected.is_success());
    }

    #[test]
    fn event_captures_outcome_fields() {
        let outcome = SwitchValidator::request(PeerId::from("a"), PeerId::from("b")).into_outcome("");
        let event = SwitchEvent::new(&outcome);
        assert_eq!(event.removed, PeerId::from("a"));
        assert_eq!(event.promoted, PeerId::from("b"));
        assert!(event.success);
        assert!(event.reason.is_empty());
    }
}
