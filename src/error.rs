//! Crate-wide error type
//!
//! Structural errors (lifecycle misuse, canonicalization failures) surface
//! to the caller. Transient conditions (dropped switch dispatches,
//! outcomes naming unknown peers) are logged where they occur and never
//! propagate.

use crate::validator::PeerId;
use thiserror::Error;

/// Errors produced by the committee engine
#[derive(Debug, Error)]
pub enum Error {
    /// Operation rejected because the component is in the wrong lifecycle phase
    #[error("invalid lifecycle state: {0}")]
    InvalidState(String),

    /// A switch outcome named a peer not present in the expected set
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// Heartbeat canonicalization failed
    #[error("heartbeat serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An outgoing switch request could not be posted
    #[error("switch dispatch dropped")]
    DispatchDropped,
}

/// Crate result alias
pub type Result<T> = std::result::Result<T, Error>;
