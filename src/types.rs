//! Core types for the link-layer framing engine
//!
//! This module defines the error type shared by every pipeline stage and a
//! handful of aliases used throughout the crate.
//!
//! All failures in this crate are local and synchronous: a malformed frame
//! produces a tagged [`LinkError`] for the immediate caller and has no
//! effect on any other frame or on the link endpoint as a whole.

/// Result type for link-layer operations
pub type LinkResult<T> = Result<T, LinkError>;

/// A sequence of individual bits, least-significant bit of each source byte
/// first (the AX.25 serialization order).
pub type BitBuf = Vec<bool>;

/// Errors that can occur while assembling or parsing frames
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("framing error: {0}")]
    Framing(String),

    #[error("FCS mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    Integrity { computed: u16, received: u16 },

    #[error("destination address does not match the local station")]
    AddressMismatch,

    #[error("unexpected PID 0x{0:02X}")]
    ProtocolId(u8),

    #[error("unknown supervisory control byte 0x{0:02X}")]
    UnknownSupervisoryCode(u8),

    /// Logged and reported to the caller, but intended to drive the ARQ
    /// hook rather than tear the link down.
    #[error("sequence mismatch: expected N(S) {expected}, received {received}")]
    SequenceMismatch { expected: u8, received: u8 },

    #[error("configuration error: {0}")]
    Config(String),
}
