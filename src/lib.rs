//! # Meridian Consensus
//!
//! PBFT committee engine for the Meridian hybrid fast/snail chain.
//!
//! This crate implements:
//! - Validator health management (per-peer liveness tracking)
//! - Silent-validator detection and orderly replacement from a ranked
//!   backup pool
//! - The switch request/response protocol spoken with the consensus
//!   coordinator
//! - Canonical heartbeat signing bytes
//!
//! The health manager runs as a supervised background task: transport
//! threads feed it verified peer-alive signals, a once-per-second ticker
//! advances each active validator's inactivity counter, and validators
//! silent past the threshold are swapped for the first unused standby in
//! validator-address order.

#![warn(missing_docs, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod health;
pub mod health_manager;
pub mod heartbeat;
pub mod service;
pub mod switch;
pub mod validator;

pub use error::{Error, Result};
pub use health::{Health, HealthReport, HealthState, HEALTH_OUT};
pub use health_manager::{HealthConfig, HealthManager, HealthStatus, TICK_INTERVAL_MS};
pub use heartbeat::Heartbeat;
pub use service::{Lifecycle, ServiceState};
pub use switch::{SwitchEvent, SwitchOrigin, SwitchValidator, SWITCH_REASON};
pub use validator::{Address, PeerId, Validator, ADDRESS_LEN};
