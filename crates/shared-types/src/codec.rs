//! # Transaction Codec
//!
//! Deterministic binary encoding of transactions and transaction groups.
//!
//! ## Wire Layout
//!
//! ```text
//! single: [0x01][body]
//! group:  [0x02][count: u64 LE]([len: u64 LE][body])*count
//! ```
//!
//! `body` is the fixed-int little-endian bincode form of [`Transaction`],
//! fields in declaration order. The decoder refuses trailing bytes and any
//! length prefix that would read past [`MAX_PAYLOAD_SIZE`].
//!
//! ## Hash Identity
//!
//! The hash is SHA-256 over the body of a copy with `signature` and `header`
//! cleared. A group's head points at itself through `header`, so `header`
//! must stay outside its own hash.

use crate::entities::{RawTransaction, Transaction, TxHash};
use crate::errors::{DecodeError, EncodeError};
use bincode::Options;
use sha2::{Digest, Sha256};

/// Layout tag of a single transaction.
pub const LAYOUT_SINGLE: u8 = 0x01;

/// Layout tag of a transaction group.
pub const LAYOUT_GROUP: u8 = 0x02;

/// Largest payload the decoder will allocate for.
pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024;

fn encode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

fn decode_options() -> impl Options {
    encode_options().with_limit(MAX_PAYLOAD_SIZE)
}

/// Stateless transaction codec.
pub struct TxCodec;

impl TxCodec {
    /// Encode a single transaction with its layout tag.
    pub fn encode(tx: &Transaction) -> Vec<u8> {
        let body = Self::encode_body(tx);
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(LAYOUT_SINGLE);
        out.extend_from_slice(&body);
        out
    }

    /// Encode an ordered group of transactions with the group layout tag.
    pub fn encode_group(members: &[Transaction]) -> Vec<u8> {
        let bodies: Vec<Vec<u8>> = members.iter().map(Self::encode_body).collect();
        let mut out = vec![LAYOUT_GROUP];
        // A list of byte strings has a known length and cannot fail to serialize.
        out.extend(encode_options().serialize(&bodies).unwrap_or_default());
        out
    }

    /// Encode either layout.
    pub fn encode_raw(raw: &RawTransaction) -> Vec<u8> {
        match raw {
            RawTransaction::Single(tx) => Self::encode(tx),
            RawTransaction::Group(members) => Self::encode_group(members),
        }
    }

    /// Decode exactly one single transaction.
    pub fn decode(bytes: &[u8]) -> Result<Transaction, DecodeError> {
        match Self::decode_raw(bytes)? {
            RawTransaction::Single(tx) => Ok(tx),
            RawTransaction::Group(_) => Err(DecodeError::UnexpectedGroup),
        }
    }

    /// Decode a payload of either layout.
    pub fn decode_raw(bytes: &[u8]) -> Result<RawTransaction, DecodeError> {
        let (&tag, rest) = bytes.split_first().ok_or(DecodeError::Empty)?;
        match tag {
            LAYOUT_SINGLE => Self::decode_body(rest).map(RawTransaction::Single),
            LAYOUT_GROUP => {
                let bodies: Vec<Vec<u8>> = decode_exact(rest)?;
                if bodies.len() < 2 {
                    return Err(DecodeError::GroupTooSmall {
                        count: bodies.len(),
                    });
                }
                let members = bodies
                    .iter()
                    .map(|body| Self::decode_body(body))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawTransaction::Group(members))
            }
            other => Err(DecodeError::UnknownLayout(other)),
        }
    }

    /// Hash identity over the canonical hashing form.
    pub fn hash(tx: &Transaction) -> TxHash {
        let mut canonical = tx.clone();
        canonical.signature = None;
        canonical.header = None;
        let digest = Sha256::digest(Self::encode_body(&canonical));
        TxHash(digest.into())
    }

    /// Length of [`TxCodec::encode`] output.
    pub fn size(tx: &Transaction) -> usize {
        encode_options()
            .serialized_size(tx)
            .map(|n| n as usize + 1)
            .unwrap_or(0)
    }

    /// Decode hex text, with or without a `0x` prefix, into raw bytes.
    pub fn decode_hex_tx(text: &str) -> Result<Vec<u8>, DecodeError> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return Err(DecodeError::InvalidHex("empty input".to_string()));
        }
        hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))
    }

    /// `0x`-prefixed hex of an encoded payload.
    pub fn to_hex(bytes: &[u8]) -> String {
        format!("0x{}", hex::encode(bytes))
    }

    /// Encode an executor action into transaction payload bytes.
    pub fn encode_payload<T: serde::Serialize>(action: &T) -> Result<Vec<u8>, EncodeError> {
        Ok(encode_options().serialize(action)?)
    }

    /// Decode transaction payload bytes into an executor action.
    pub fn decode_payload<T: serde::de::DeserializeOwned>(payload: &[u8]) -> Result<T, DecodeError> {
        decode_exact(payload)
    }

    // Every `Transaction` field is a fixed-shape scalar, string, byte vector or
    // option of those, none of which bincode can refuse.
    fn encode_body(tx: &Transaction) -> Vec<u8> {
        encode_options().serialize(tx).unwrap_or_default()
    }

    fn decode_body(body: &[u8]) -> Result<Transaction, DecodeError> {
        decode_exact(body)
    }
}

fn decode_exact<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut cursor = bytes;
    let value = decode_options().deserialize_from(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(DecodeError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TxSignature;
    use proptest::prelude::*;

    fn sample_tx() -> Transaction {
        Transaction {
            execer: b"coins".to_vec(),
            payload: vec![1, 2, 3, 4],
            signature: None,
            fee: 100_000,
            expire: 0,
            nonce: 42,
            to: "1MY4pMgjpS2vWiaSDZasRhN47pcwEire32".to_string(),
            group_count: 0,
            header: None,
            next: None,
            chain_id: 0,
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let tx = sample_tx();
        assert_eq!(TxCodec::encode(&tx), TxCodec::encode(&tx.clone()));
        assert_eq!(TxCodec::encode(&tx)[0], LAYOUT_SINGLE);
    }

    #[test]
    fn test_reencode_reproduces_bytes() {
        let bytes = TxCodec::encode(&sample_tx());
        let decoded = TxCodec::decode(&bytes).unwrap();
        assert_eq!(TxCodec::encode(&decoded), bytes);
    }

    #[test]
    fn test_size_matches_encoding() {
        let tx = sample_tx();
        assert_eq!(TxCodec::size(&tx), TxCodec::encode(&tx).len());
    }

    #[test]
    fn test_hash_ignores_signature_and_header() {
        let tx = sample_tx();
        let mut signed = tx.clone();
        signed.signature = Some(TxSignature {
            ty: 1,
            pubkey: vec![2; 33],
            signature: vec![3; 64],
        });
        signed.header = Some(TxHash([9; 32]));
        assert_eq!(TxCodec::hash(&tx), TxCodec::hash(&signed));

        let mut changed = tx.clone();
        changed.fee += 1;
        assert_ne!(TxCodec::hash(&tx), TxCodec::hash(&changed));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert_eq!(TxCodec::decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn test_decode_rejects_unknown_layout() {
        let mut bytes = TxCodec::encode(&sample_tx());
        bytes[0] = 0x7f;
        assert_eq!(TxCodec::decode(&bytes), Err(DecodeError::UnknownLayout(0x7f)));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let bytes = TxCodec::encode(&sample_tx());
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(TxCodec::decode(cut), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = TxCodec::encode(&sample_tx());
        bytes.extend_from_slice(&[0, 0]);
        assert_eq!(TxCodec::decode(&bytes), Err(DecodeError::TrailingBytes(2)));
    }

    #[test]
    fn test_decode_rejects_oversized_length_prefix() {
        // execer length prefix claims u64::MAX bytes
        let mut bytes = vec![LAYOUT_SINGLE];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(TxCodec::decode(&bytes), Err(DecodeError::TooLarge));
    }

    #[test]
    fn test_group_round_trip() {
        let mut second = sample_tx();
        second.nonce = 7;
        let members = vec![sample_tx(), second];

        let bytes = TxCodec::encode_group(&members);
        assert_eq!(bytes[0], LAYOUT_GROUP);
        assert_eq!(
            TxCodec::decode_raw(&bytes).unwrap(),
            RawTransaction::Group(members)
        );
        assert_eq!(TxCodec::decode(&bytes), Err(DecodeError::UnexpectedGroup));
    }

    #[test]
    fn test_group_of_one_is_rejected() {
        let bytes = TxCodec::encode_group(&[sample_tx()]);
        assert_eq!(
            TxCodec::decode_raw(&bytes),
            Err(DecodeError::GroupTooSmall { count: 1 })
        );
    }

    #[test]
    fn test_group_member_with_bad_length_prefix() {
        let mut bytes = TxCodec::encode_group(&[sample_tx(), sample_tx()]);
        // first member's length prefix starts after tag + count
        let len_at = 1 + 8;
        let len = u64::from_le_bytes(bytes[len_at..len_at + 8].try_into().unwrap());
        bytes[len_at..len_at + 8].copy_from_slice(&(len - 1).to_le_bytes());
        assert!(TxCodec::decode_raw(&bytes).is_err());
    }

    #[test]
    fn test_decode_hex_tx() {
        let bytes = TxCodec::encode(&sample_tx());
        let hex_text = TxCodec::to_hex(&bytes);
        assert_eq!(TxCodec::decode_hex_tx(&hex_text).unwrap(), bytes);
        assert_eq!(
            TxCodec::decode_hex_tx(hex_text.trim_start_matches("0x")).unwrap(),
            bytes
        );
        assert!(matches!(
            TxCodec::decode_hex_tx("0xzz"),
            Err(DecodeError::InvalidHex(_))
        ));
        assert!(matches!(
            TxCodec::decode_hex_tx(""),
            Err(DecodeError::InvalidHex(_))
        ));
    }

    /// Serializes as a sequence of unknown length, which bincode refuses.
    struct UnsizedSeq;

    impl serde::Serialize for UnsizedSeq {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeSeq;
            let mut seq = serializer.serialize_seq(None)?;
            seq.serialize_element(&1u8)?;
            seq.end()
        }
    }

    #[test]
    fn test_encode_payload_reports_serializer_failure() {
        assert!(matches!(
            TxCodec::encode_payload(&UnsizedSeq),
            Err(EncodeError::Serialize(_))
        ));
        let bytes = TxCodec::encode_payload(&(7u64, "coins".to_string())).unwrap();
        let back: (u64, String) = TxCodec::decode_payload(&bytes).unwrap();
        assert_eq!(back, (7, "coins".to_string()));
    }

    fn arb_hash() -> impl Strategy<Value = Option<TxHash>> {
        proptest::option::of(any::<[u8; 32]>().prop_map(TxHash))
    }

    fn arb_signature() -> impl Strategy<Value = Option<TxSignature>> {
        proptest::option::of(
            (
                any::<i32>(),
                proptest::collection::vec(any::<u8>(), 0..40),
                proptest::collection::vec(any::<u8>(), 0..80),
            )
                .prop_map(|(ty, pubkey, signature)| TxSignature {
                    ty,
                    pubkey,
                    signature,
                }),
        )
    }

    prop_compose! {
        fn arb_tx()(
            execer in proptest::collection::vec(any::<u8>(), 0..16),
            payload in proptest::collection::vec(any::<u8>(), 0..256),
            signature in arb_signature(),
            fee in any::<i64>(),
            expire in any::<i64>(),
            nonce in any::<i64>(),
            to in "[a-zA-Z0-9]{0,40}",
            group_count in 0i32..=20,
            header in arb_hash(),
            next in arb_hash(),
            chain_id in any::<i32>(),
        ) -> Transaction {
            Transaction {
                execer, payload, signature, fee, expire, nonce, to,
                group_count, header, next, chain_id,
            }
        }
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(tx in arb_tx()) {
            let bytes = TxCodec::encode(&tx);
            prop_assert_eq!(TxCodec::decode(&bytes).unwrap(), tx);
        }

        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = TxCodec::decode_raw(&bytes);
        }
    }
}
