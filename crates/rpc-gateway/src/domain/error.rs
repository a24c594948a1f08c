//! Gateway error types with stable JSON-RPC error codes.
//!
//! Clients branch on `code`, never on `message`. Downstream errors keep the
//! code the module reported.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use shared_bus::BusError;
use shared_types::{AddressError, DecodeError, EncodeError};

/// JSON-RPC error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Gateway errors (-32100 to -32199)
    pub const GROUP_TOO_SMALL: i32 = -32100;
    pub const GROUP_TOO_LARGE: i32 = -32101;
    pub const ALREADY_GROUPED: i32 = -32102;
    pub const INVALID_ADDRESS: i32 = -32103;
    pub const UNSUPPORTED_ACTION: i32 = -32104;
    pub const INVALID_ENCODING: i32 = -32105;
    pub const DECODING: i32 = -32106;
    pub const INDEX_OUT_OF_RANGE: i32 = -32107;
    pub const INVALID_EXPIRE: i32 = -32108;
}

/// Errors returned by gateway operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("transaction group needs at least 2 members, got {count}")]
    GroupTooSmall { count: usize },

    #[error("transaction group allows at most {max} members, got {count}")]
    GroupTooLarge { count: usize, max: usize },

    /// A member already carries group-link fields.
    #[error("transaction {index} already belongs to a group")]
    AlreadyGrouped { index: usize },

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: AddressError },

    #[error("invalid params: {0}")]
    InvalidParam(String),

    /// The executor or action cannot be built here.
    #[error("unsupported action: {0}")]
    UnsupportedAction(String),

    /// Input text is not valid hex.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("decoding failed: {0}")]
    Decoding(DecodeError),

    #[error("index {index} out of range for {len} transaction(s)")]
    IndexOutOfRange { index: i32, len: usize },

    #[error("invalid expire {0}")]
    InvalidExpire(String),

    /// Error reported by a module, relayed as is.
    #[error(transparent)]
    Downstream(BusError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_param(details: impl Into<String>) -> Self {
        ApiError::InvalidParam(details.into())
    }

    pub fn internal(details: impl Into<String>) -> Self {
        ApiError::Internal(details.into())
    }

    pub fn invalid_address(address: &str, reason: AddressError) -> Self {
        ApiError::InvalidAddress {
            address: address.to_string(),
            reason,
        }
    }

    /// Stable JSON-RPC code of this error.
    pub fn code(&self) -> i32 {
        match self {
            ApiError::GroupTooSmall { .. } => codes::GROUP_TOO_SMALL,
            ApiError::GroupTooLarge { .. } => codes::GROUP_TOO_LARGE,
            ApiError::AlreadyGrouped { .. } => codes::ALREADY_GROUPED,
            ApiError::InvalidAddress { .. } => codes::INVALID_ADDRESS,
            ApiError::InvalidParam(_) => codes::INVALID_PARAMS,
            ApiError::UnsupportedAction(_) => codes::UNSUPPORTED_ACTION,
            ApiError::InvalidEncoding(_) => codes::INVALID_ENCODING,
            ApiError::Decoding(_) => codes::DECODING,
            ApiError::IndexOutOfRange { .. } => codes::INDEX_OUT_OF_RANGE,
            ApiError::InvalidExpire(_) => codes::INVALID_EXPIRE,
            ApiError::Downstream(err) => err.code,
            ApiError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// True if the error was raised locally, before any bus interaction.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ApiError::Downstream(_) | ApiError::Internal(_))
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let message = match self {
            ApiError::Downstream(err) => err.message.clone(),
            other => other.to_string(),
        };
        let mut state = serializer.serialize_struct("ApiError", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &message)?;
        state.end()
    }
}

impl From<BusError> for ApiError {
    fn from(err: BusError) -> Self {
        ApiError::Downstream(err)
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidHex(details) => ApiError::InvalidEncoding(details),
            other => ApiError::Decoding(other),
        }
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;
