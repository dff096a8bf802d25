//! Errors in the library.
use thiserror::Error;

/// Errors raised by the replay memory.
#[derive(Error, Debug)]
pub enum ReplayMemoryError {
    /// Invalid construction or call-site parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record's payload does not match the shape fixed by the first insert.
    #[error("Malformed record: {field} has {got} bytes, expected {expected}")]
    MalformedRecord {
        /// Name of the offending payload field.
        field: &'static str,
        /// Expected payload length in bytes.
        expected: usize,
        /// Actual payload length in bytes.
        got: usize,
    },

    /// A priority value that is not finite and strictly positive.
    #[error("Invalid priority: {0} (must be finite and > 0)")]
    InvalidPriority(f64),

    /// Sampling was requested on a memory holding no records.
    #[error("Cannot sample from an empty memory")]
    EmptyMemory,

    /// `update_priorities` was called with sequences of different lengths.
    #[error("Length mismatch: {indices} indices vs {priorities} priorities")]
    LengthMismatch {
        /// Number of slot indices passed.
        indices: usize,
        /// Number of priorities passed.
        priorities: usize,
    },

    /// A slot index that does not refer to an occupied slot.
    #[error("Invalid slot index {index}: only {len} slots occupied")]
    InvalidSlot {
        /// The offending index.
        index: usize,
        /// Number of occupied slots.
        len: usize,
    },

    /// A stored payload could not be decompressed.
    #[error("Payload decompression failed: {0}")]
    Decompression(String),
}
