//! Protocol constants shared between the signing infrastructure and the
//! client state machine.

/// Length in bytes of the random nonce included in every signature header.
/// Combined with the creator identity it makes transaction IDs unique.
pub const NONCE_LENGTH: usize = 24;

/// Seek target meaning "keep delivering until the stream is closed".
pub const SEEK_LARGEST_BLOCK_NUMBER: u64 = u64::MAX;
