//! # Shared Types Crate
//!
//! This crate contains the transaction entities, the transaction codec and
//! address validation used by the gateway and the module bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The transaction layout and its hash identity
//!   are defined here and nowhere else.
//! - **Determinism**: Encoding is a pure function of every field in a fixed
//!   order; `decode(encode(tx)) == tx` for every transaction.
//! - **Stable Identity**: A transaction's hash ignores its signature and its
//!   group header, so signing a transaction or linking it into a group never
//!   changes the identity other members point at.

pub mod address;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod hex_bytes;

pub use address::{check_address, exec_address, pubkey_to_address, AddressKind};
pub use codec::TxCodec;
pub use entities::*;
pub use errors::*;
