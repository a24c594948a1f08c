//! # Address Checks
//!
//! Structural validation of account addresses and derivation of executor
//! addresses. No key material is handled here.
//!
//! Two address families are accepted:
//!
//! - base58check: `version || ripemd160(sha256(pubkey)) || checksum[4]`
//! - `0x`-prefixed 20-byte hex

use crate::errors::AddressError;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte of a normal address.
pub const NORMAL_VERSION: u8 = 0;

/// Version byte of a multi-signature address.
pub const MULTISIG_VERSION: u8 = 5;

/// Prefix mixed into executor names before deriving their address.
pub const EXEC_ADDRESS_SEED: &[u8] = b"address seed bytes for public key";

const HASH160_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;
const BASE58_PAYLOAD_LEN: usize = 1 + HASH160_LEN + CHECKSUM_LEN;

/// Family of a structurally valid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Normal,
    MultiSig,
    Eth,
}

/// Validate an address and report its family.
pub fn check_address(addr: &str) -> Result<AddressKind, AddressError> {
    if addr.is_empty() {
        return Err(AddressError::Empty);
    }

    if let Some(digits) = addr.strip_prefix("0x").or_else(|| addr.strip_prefix("0X")) {
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != HASH160_LEN {
            return Err(AddressError::InvalidLength {
                expected: HASH160_LEN,
                actual: bytes.len(),
            });
        }
        return Ok(AddressKind::Eth);
    }

    let raw = bs58::decode(addr)
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
    if raw.len() != BASE58_PAYLOAD_LEN {
        return Err(AddressError::InvalidLength {
            expected: BASE58_PAYLOAD_LEN,
            actual: raw.len(),
        });
    }

    let (body, checksum) = raw.split_at(1 + HASH160_LEN);
    if checksum != &double_sha256(body)[..CHECKSUM_LEN] {
        return Err(AddressError::ChecksumMismatch);
    }

    match body[0] {
        NORMAL_VERSION => Ok(AddressKind::Normal),
        MULTISIG_VERSION => Ok(AddressKind::MultiSig),
        other => Err(AddressError::UnknownVersion(other)),
    }
}

/// Derive the normal address of a public key.
pub fn pubkey_to_address(pubkey: &[u8]) -> String {
    hash160_to_address(NORMAL_VERSION, &hash160(pubkey))
}

/// Derive the address owned by an executor.
pub fn exec_address(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(EXEC_ADDRESS_SEED);
    hasher.update(name.as_bytes());
    pubkey_to_address(&hasher.finalize())
}

fn hash160_to_address(version: u8, hash: &[u8; HASH160_LEN]) -> String {
    let mut payload = Vec::with_capacity(BASE58_PAYLOAD_LEN);
    payload.push(version);
    payload.extend_from_slice(hash);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(payload).into_string()
}

fn hash160(data: &[u8]) -> [u8; HASH160_LEN] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}
