//! # Core Transaction Entities
//!
//! Defines the transaction as it travels between clients, the gateway and the
//! module bus, plus the expiry encoding it carries.
//!
//! ## Clusters
//!
//! - **Identity**: `TxHash`
//! - **Transaction**: `Transaction`, `TxSignature`, `RawTransaction`
//! - **Expiry**: `Expiry` and the raw-integer conventions behind it

use crate::codec::TxCodec;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Length of a transaction hash in bytes.
pub const HASH_LEN: usize = 32;

/// A 32-byte SHA-256 transaction hash.
///
/// Serializes as a `0x`-prefixed hex string in JSON and as 32 raw bytes in
/// the binary codec.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TxHash(pub [u8; HASH_LEN]);

impl TxHash {
    /// The all-zero hash.
    pub const ZERO: TxHash = TxHash([0u8; HASH_LEN]);

    /// Build from a slice, failing unless it is exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; HASH_LEN]>::try_from(bytes).ok().map(TxHash)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for TxHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for TxHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let digits = s.strip_prefix("0x").unwrap_or(&s);
            let bytes = hex::decode(digits)
                .map_err(|e| de::Error::custom(format!("invalid hash hex: {}", e)))?;
            TxHash::from_slice(&bytes).ok_or_else(|| {
                de::Error::custom(format!("hash must be {} bytes, got {}", HASH_LEN, bytes.len()))
            })
        } else {
            <[u8; HASH_LEN]>::deserialize(deserializer).map(TxHash)
        }
    }
}

// =============================================================================
// CLUSTER B: TRANSACTION
// =============================================================================

/// Signature attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxSignature {
    /// Signature scheme identifier.
    pub ty: i32,
    /// Signer public key.
    #[serde(with = "crate::hex_bytes")]
    pub pubkey: Vec<u8>,
    /// Signature bytes.
    #[serde(with = "crate::hex_bytes")]
    pub signature: Vec<u8>,
}

/// A transaction as submitted by clients.
///
/// Field order is the encoding order. Do not reorder fields: the codec and
/// every hash computed so far depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    /// Name of the executor that runs this transaction (e.g. `coins`).
    #[serde(with = "crate::hex_bytes")]
    pub execer: Vec<u8>,
    /// Executor-specific action payload.
    #[serde(with = "crate::hex_bytes")]
    pub payload: Vec<u8>,
    /// Signature over the transaction, absent until signed.
    pub signature: Option<TxSignature>,
    /// Fee in the smallest coin unit.
    pub fee: i64,
    /// Raw expiry, see [`Expiry`].
    pub expire: i64,
    /// Random nonce distinguishing otherwise identical transactions.
    pub nonce: i64,
    /// Recipient address.
    pub to: String,
    /// Number of members of the group this transaction belongs to, 0 if none.
    pub group_count: i32,
    /// Hash of the group's head member.
    pub header: Option<TxHash>,
    /// Hash of the next group member.
    pub next: Option<TxHash>,
    /// Chain identifier.
    pub chain_id: i32,
}

impl Transaction {
    /// Create an unsigned transaction for an executor.
    pub fn new(execer: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            execer: execer.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    /// Hash identity of this transaction.
    pub fn hash(&self) -> TxHash {
        TxCodec::hash(self)
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        TxCodec::size(self)
    }

    /// Executor name, lossily decoded as UTF-8.
    pub fn execer_name(&self) -> String {
        String::from_utf8_lossy(&self.execer).into_owned()
    }

    /// True if any group-link field is populated.
    pub fn is_grouped(&self) -> bool {
        self.group_count != 0 || self.header.is_some() || self.next.is_some()
    }

    /// Decoded expiry.
    pub fn expiry(&self) -> Expiry {
        Expiry::from_raw(self.expire)
    }

    pub fn set_expiry(&mut self, expiry: Expiry) {
        self.expire = expiry.to_raw();
    }
}

/// A decoded wire payload: a single transaction or a whole group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTransaction {
    Single(Transaction),
    Group(Vec<Transaction>),
}

impl RawTransaction {
    /// Number of transactions carried.
    pub fn len(&self) -> usize {
        match self {
            RawTransaction::Single(_) => 1,
            RawTransaction::Group(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RawTransaction::Group(_))
    }

    /// The head transaction: the single transaction or the first group member.
    pub fn head(&self) -> Option<&Transaction> {
        match self {
            RawTransaction::Single(tx) => Some(tx),
            RawTransaction::Group(txs) => txs.first(),
        }
    }
}

// =============================================================================
// CLUSTER C: EXPIRY
// =============================================================================

/// Raw values at or above this bound are unix timestamps, below it block heights.
pub const EXPIRE_BOUND: i64 = 1_000_000_000;

/// Raw values at or above this flag encode a tx-height expiry.
pub const TX_HEIGHT_FLAG: i64 = 1 << 62;

/// Interpreted transaction expiry.
///
/// The raw `expire` field packs all variants into one integer:
///
/// | raw value                    | meaning                     |
/// |------------------------------|-----------------------------|
/// | `<= 0`                       | never expires               |
/// | `1 .. EXPIRE_BOUND`          | block height                |
/// | `EXPIRE_BOUND .. TX_HEIGHT_FLAG` | unix timestamp (seconds) |
/// | `>= TX_HEIGHT_FLAG`          | tx height (`raw - flag`)    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    BlockHeight(i64),
    UnixTime(i64),
    TxHeight(i64),
}

impl Expiry {
    pub fn from_raw(raw: i64) -> Self {
        if raw <= 0 {
            Expiry::Never
        } else if raw >= TX_HEIGHT_FLAG {
            Expiry::TxHeight(raw - TX_HEIGHT_FLAG)
        } else if raw >= EXPIRE_BOUND {
            Expiry::UnixTime(raw)
        } else {
            Expiry::BlockHeight(raw)
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Expiry::Never => 0,
            Expiry::BlockHeight(h) => h,
            Expiry::UnixTime(t) => t,
            Expiry::TxHeight(h) => h.saturating_add(TX_HEIGHT_FLAG),
        }
    }
}
