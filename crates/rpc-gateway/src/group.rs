//! # Transaction Groups
//!
//! Chains independent transactions into one atomic, hash-linked group.
//!
//! ## Link Invariants
//!
//! For a group `tx[0..n]`, `2 <= n <= max`:
//!
//! - `tx[i].group_count == n` for every member
//! - `tx[i].next == hash(tx[i+1])` for `i < n-1`, the last member has no `next`
//! - `tx[j].header == hash(tx[0])` for every member
//! - only the head pays: `tx[k].fee == 0` for `k > 0`
//!
//! Hashes ignore `header`, so the head can point at itself and later
//! `header` writes never invalidate a `next` link.

use crate::domain::config::{GatewayConfig, MAX_GROUP_SIZE};
use crate::domain::error::{ApiError, ApiResult};
use shared_types::{RawTransaction, Transaction, TxCodec, TxHash};
use tracing::debug;

/// Fee for `size` bytes at `fee_rate` per started kilobyte.
pub fn real_fee(size: usize, fee_rate: i64) -> ApiResult<i64> {
    let kilobytes = i64::try_from(size / 1000 + 1)
        .map_err(|_| ApiError::invalid_param("transaction too large"))?;
    kilobytes
        .checked_mul(fee_rate)
        .ok_or_else(|| ApiError::invalid_param("fee overflows"))
}

/// Builds groups under a size limit and a fee rate.
#[derive(Debug, Clone)]
pub struct TxGroupBuilder {
    max_size: usize,
    fee_rate: i64,
    max_fee: i64,
}

impl TxGroupBuilder {
    /// Builder with no minimum fee and no fee ceiling.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.clamp(2, MAX_GROUP_SIZE),
            fee_rate: 0,
            max_fee: 0,
        }
    }

    /// Size limit and fee ceiling from `config`, with no minimum fee: the
    /// head pays exactly what the members paid.
    ///
    /// Builders that need a floor, such as fee-payer groups, set one with
    /// [`TxGroupBuilder::with_fee_rate`].
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.group.max_size).with_max_fee(config.chain.max_tx_fee)
    }

    /// Fee per started kilobyte used for the group's minimum fee; 0 disables it.
    #[must_use]
    pub fn with_fee_rate(mut self, fee_rate: i64) -> Self {
        self.fee_rate = fee_rate.max(0);
        self
    }

    /// Ceiling on the head fee; 0 disables it.
    #[must_use]
    pub fn with_max_fee(mut self, max_fee: i64) -> Self {
        self.max_fee = max_fee.max(0);
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn fee_rate(&self) -> i64 {
        self.fee_rate
    }

    /// Check a member count against the group bounds.
    pub fn check_size(&self, count: usize) -> ApiResult<()> {
        if count < 2 {
            return Err(ApiError::GroupTooSmall { count });
        }
        if count > self.max_size {
            return Err(ApiError::GroupTooLarge {
                count,
                max: self.max_size,
            });
        }
        Ok(())
    }

    /// Link `txs` into a new group. The input is left untouched.
    ///
    /// The head fee becomes `max(sum of fees, minimum group fee)` and every
    /// other member's fee becomes 0.
    pub fn build(&self, txs: &[Transaction]) -> ApiResult<TxGroup> {
        self.check_size(txs.len())?;
        if let Some(index) = txs.iter().position(Transaction::is_grouped) {
            return Err(ApiError::AlreadyGrouped { index });
        }
        if txs.iter().any(|tx| tx.fee < 0) {
            return Err(ApiError::invalid_param("fee cannot be negative"));
        }

        let mut members = txs.to_vec();
        let count = members.len();
        let mut total_fee: i64 = 0;
        let mut min_fee: i64 = 0;

        for i in (0..count).rev() {
            let tx = &mut members[i];
            tx.group_count = count as i32;
            total_fee = total_fee
                .checked_add(tx.fee)
                .ok_or_else(|| ApiError::invalid_param("group fee overflows"))?;
            // Occupy the header slot so the size matches the final encoding.
            tx.header = Some(TxHash::ZERO);
            tx.fee = 0;
            min_fee = min_fee
                .checked_add(real_fee(tx.size(), self.fee_rate)?)
                .ok_or_else(|| ApiError::invalid_param("group fee overflows"))?;

            if i == 0 {
                tx.fee = total_fee.max(min_fee);
            } else {
                let hash = tx.hash();
                members[i - 1].next = Some(hash);
            }
        }

        let head_fee = members[0].fee;
        if self.max_fee > 0 && head_fee > self.max_fee {
            return Err(ApiError::invalid_param(format!(
                "group fee {} exceeds maximum {}",
                head_fee, self.max_fee
            )));
        }

        let mut group = TxGroup { members };
        group.set_headers();
        debug!(
            members = count,
            head_fee,
            header = %group.header(),
            "Transaction group built"
        );
        Ok(group)
    }
}

impl Default for TxGroupBuilder {
    fn default() -> Self {
        Self::new(MAX_GROUP_SIZE)
    }
}

/// A linked transaction group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxGroup {
    members: Vec<Transaction>,
}

impl TxGroup {
    /// Adopt already-linked members, checking every link invariant.
    pub fn from_members(members: Vec<Transaction>) -> ApiResult<Self> {
        let group = Self { members };
        group.verify()?;
        Ok(group)
    }

    /// Decode a group payload and check its links.
    pub fn decode(bytes: &[u8]) -> ApiResult<Self> {
        match TxCodec::decode_raw(bytes)? {
            RawTransaction::Group(members) => Self::from_members(members),
            RawTransaction::Single(_) => Err(ApiError::invalid_param(
                "expected a transaction group, got a single transaction",
            )),
        }
    }

    pub fn members(&self) -> &[Transaction] {
        &self.members
    }

    /// Mutable access to members. Call [`TxGroup::relink`] after mutating.
    pub fn members_mut(&mut self) -> &mut [Transaction] {
        &mut self.members
    }

    pub fn into_members(self) -> Vec<Transaction> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Hash of the head member, which every member's `header` points at.
    pub fn header(&self) -> TxHash {
        self.members.first().map(Transaction::hash).unwrap_or_default()
    }

    pub fn hashes(&self) -> Vec<TxHash> {
        self.members.iter().map(Transaction::hash).collect()
    }

    pub fn encode(&self) -> Vec<u8> {
        TxCodec::encode_group(&self.members)
    }

    /// Recompute `next`, `header` and `group_count` after member mutation.
    /// Fees are left as they are.
    pub fn relink(&mut self) {
        let count = self.members.len();
        if count == 0 {
            return;
        }
        for tx in self.members.iter_mut() {
            tx.group_count = count as i32;
        }
        self.members[count - 1].next = None;
        for i in (1..count).rev() {
            let hash = self.members[i].hash();
            self.members[i - 1].next = Some(hash);
        }
        self.set_headers();
    }

    /// Check every link invariant.
    pub fn verify(&self) -> ApiResult<()> {
        let count = self.members.len();
        if count < 2 {
            return Err(ApiError::GroupTooSmall { count });
        }
        if count > MAX_GROUP_SIZE {
            return Err(ApiError::GroupTooLarge {
                count,
                max: MAX_GROUP_SIZE,
            });
        }

        let header = self.header();
        for (i, tx) in self.members.iter().enumerate() {
            if tx.group_count != count as i32 {
                return Err(broken(i, "group_count does not match group size"));
            }
            if tx.header != Some(header) {
                return Err(broken(i, "header does not point at the head"));
            }
            let expected_next = self.members.get(i + 1).map(Transaction::hash);
            if tx.next != expected_next {
                return Err(broken(i, "next does not point at the following member"));
            }
            if i > 0 && tx.fee != 0 {
                return Err(broken(i, "only the head may carry a fee"));
            }
        }
        Ok(())
    }

    fn set_headers(&mut self) {
        let header = self.header();
        for tx in self.members.iter_mut() {
            tx.header = Some(header);
        }
    }
}

fn broken(index: usize, reason: &str) -> ApiError {
    ApiError::invalid_param(format!("group member {}: {}", index, reason))
}
