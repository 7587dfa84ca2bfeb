//! Per-validator liveness state
//!
//! This module implements the health record kept for every committee
//! member and standby:
//! - Lifecycle state machine (`Unused`/`Switching`/`Used`/`Removed`)
//! - Atomic inactivity counter driven by the manager's ticker
//! - Serializable snapshot for diagnostics
//! - Address-order sorting for the backup pool

use crate::validator::{Address, PeerId, Validator};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Consecutive silent ticks after which a validator is switched out
pub const HEALTH_OUT: i32 = 600;

/// Lifecycle state of a health record
///
/// Wire and log representation is the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    /// Standby, eligible for promotion
    Unused,

    /// Part of an in-flight switch, either side
    Switching,

    /// Serving in the active committee
    Used,

    /// Switched out; terminal
    Removed,
}

impl HealthState {
    /// Numeric wire value
    pub fn wire_value(&self) -> u8 {
        match self {
            HealthState::Unused => 0,
            HealthState::Switching => 1,
            HealthState::Used => 2,
            HealthState::Removed => 3,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Unused => write!(f, "Unused"),
            HealthState::Switching => write!(f, "Switching"),
            HealthState::Used => write!(f, "Used"),
            HealthState::Removed => write!(f, "Removed"),
        }
    }
}

/// Mutable liveness record for one validator
///
/// The tick counter is atomic: the manager's ticker is its only writer
/// on the increment side, while transport threads reset it through
/// `update`. State changes only happen at transition points under the
/// manager's mutex.
#[derive(Debug)]
pub struct Health {
    /// Network identity, unique across active set and backup pool
    peer_id: PeerId,

    /// Peer IP, diagnostics only
    ip: String,

    /// Peer port, diagnostics only
    port: u16,

    /// Consecutive seconds without a liveness signal
    tick: AtomicI32,

    /// Lifecycle state
    state: RwLock<HealthState>,

    /// The validator this record tracks
    validator: Validator,
}

impl Health {
    /// Create a record in the given lifecycle state
    pub fn new(
        peer_id: PeerId,
        ip: impl Into<String>,
        port: u16,
        state: HealthState,
        validator: Validator,
    ) -> Self {
        Self {
            peer_id,
            ip: ip.into(),
            port,
            tick: AtomicI32::new(0),
            state: RwLock::new(state),
            validator,
        }
    }

    /// Create a record born `Used`, for the active set
    pub fn active(peer_id: PeerId, ip: impl Into<String>, port: u16, validator: Validator) -> Self {
        Self::new(peer_id, ip, port, HealthState::Used, validator)
    }

    /// Create a record born `Unused`, for the backup pool
    pub fn standby(peer_id: PeerId, ip: impl Into<String>, port: u16, validator: Validator) -> Self {
        Self::new(peer_id, ip, port, HealthState::Unused, validator)
    }

    /// Network identity
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Peer IP
    pub fn ip(&self) -> &str {
        &self.ip
    }

    /// Peer port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The tracked validator
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Current inactivity counter
    pub fn tick(&self) -> i32 {
        self.tick.load(Ordering::SeqCst)
    }

    /// Increment the inactivity counter, returning the new value
    pub fn advance_tick(&self) -> i32 {
        self.tick.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Reset the inactivity counter to zero
    pub fn reset_tick(&self) {
        self.tick.store(0, Ordering::SeqCst);
    }

    /// Current lifecycle state
    pub fn state(&self) -> HealthState {
        *self.state.read()
    }

    /// Transition to a new lifecycle state
    pub fn set_state(&self, state: HealthState) {
        *self.state.write() = state;
    }

    /// Serializable snapshot of this record
    pub fn report(&self) -> HealthReport {
        HealthReport {
            peer_id: self.peer_id.clone(),
            ip: self.ip.clone(),
            port: self.port,
            tick: self.tick(),
            state: self.state(),
            address: self.validator.address,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id:{},ip:{},port:{},tick:{},state:{},addr:{}",
            self.peer_id,
            self.ip,
            self.port,
            self.tick(),
            self.state().wire_value(),
            self.validator.address
        )
    }
}

/// Point-in-time snapshot of a health record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Network identity
    pub peer_id: PeerId,

    /// Peer IP
    pub ip: String,

    /// Peer port
    pub port: u16,

    /// Inactivity counter at snapshot time
    pub tick: i32,

    /// Lifecycle state at snapshot time
    pub state: HealthState,

    /// Validator address
    pub address: Address,
}

/// Sort records ascending by validator address
pub(crate) fn sort_by_address(records: &mut [Arc<Health>]) {
    records.sort_by(|a, b| a.validator().address.cmp(&b.validator().address));
}
