//! # Error Types
//!
//! Defines the errors raised by the transaction codec and address checks.

use thiserror::Error;

/// Errors that can occur while decoding a transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No bytes at all.
    #[error("Empty transaction payload")]
    Empty,

    /// The stream ended before the value was complete.
    #[error("Truncated transaction payload")]
    Truncated,

    /// The leading layout tag is neither single nor group.
    #[error("Unknown layout tag: 0x{0:02x}")]
    UnknownLayout(u8),

    /// Bytes were left over after a complete value.
    #[error("Trailing bytes after transaction: {0} left")]
    TrailingBytes(usize),

    /// A length prefix asked for more than the decoder allows.
    #[error("Transaction payload exceeds size limit")]
    TooLarge,

    /// Content disagreed with its own framing.
    #[error("Malformed transaction payload: {0}")]
    Malformed(String),

    /// A group payload with fewer than two members.
    #[error("Group payload carries {count} member(s), need at least 2")]
    GroupTooSmall { count: usize },

    /// A group payload was given where a single transaction was expected.
    #[error("Expected a single transaction, got a group")]
    UnexpectedGroup,

    /// Hex text could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

impl From<bincode::Error> for DecodeError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                DecodeError::Truncated
            }
            bincode::ErrorKind::SizeLimit => DecodeError::TooLarge,
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// Errors raised while encoding an executor payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value's `Serialize` impl failed or produced an unbounded sequence.
    #[error("Payload encoding failed: {0}")]
    Serialize(String),
}

impl From<bincode::Error> for EncodeError {
    fn from(err: bincode::Error) -> Self {
        EncodeError::Serialize(err.to_string())
    }
}

/// Errors related to address validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Empty address")]
    Empty,

    /// Not valid base58.
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    /// Not valid hex (0x-style addresses).
    #[error("Invalid hex address: {0}")]
    InvalidHex(String),

    /// Decoded payload has the wrong length.
    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The trailing 4-byte checksum does not match.
    #[error("Address checksum mismatch")]
    ChecksumMismatch,

    /// The version byte is not a known address kind.
    #[error("Unknown address version: {0}")]
    UnknownVersion(u8),
}
