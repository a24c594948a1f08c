//! Rewriting of encoded transactions.
//!
//! Takes hex of a single transaction or a group, overrides recipient, expiry
//! and fee, and re-encodes. Groups are relinked after the change so every
//! `next`/`header` hash stays valid.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::expire::parse_expire;
use crate::domain::types::ReWriteRawTx;
use crate::group::TxGroup;
use crate::ports::TimeSource;
use chain_forks::ForkTable;
use shared_types::{check_address, Expiry, RawTransaction, Transaction, TxCodec};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Applies [`ReWriteRawTx`] overrides to encoded transactions.
pub struct RawTxRewriter {
    forks: Arc<ForkTable>,
    clock: Arc<dyn TimeSource>,
    min_duration: Duration,
}

/// Overrides after validation.
#[derive(Debug, Default)]
struct Overrides {
    to: Option<String>,
    fee: Option<i64>,
    expiry: Option<Expiry>,
}

impl Overrides {
    fn apply(&self, tx: &mut Transaction) {
        self.apply_to(tx);
        self.apply_expiry(tx);
    }

    fn apply_to(&self, tx: &mut Transaction) {
        if let Some(to) = &self.to {
            tx.to = to.clone();
        }
    }

    fn apply_expiry(&self, tx: &mut Transaction) {
        if let Some(expiry) = self.expiry {
            tx.set_expiry(expiry);
        }
    }
}

impl RawTxRewriter {
    pub fn new(forks: Arc<ForkTable>, clock: Arc<dyn TimeSource>, min_duration: Duration) -> Self {
        Self {
            forks,
            clock,
            min_duration,
        }
    }

    /// Rewrite and return the encoded bytes.
    ///
    /// `index` 0 addresses the whole group, `k` addresses member `k-1`. A
    /// single transaction only accepts index 0. With index 0 the expiry
    /// applies to every member while the recipient and the fee apply to the
    /// head only. The fee always lands on the head member, where the group
    /// fee lives.
    pub fn rewrite(&self, req: &ReWriteRawTx) -> ApiResult<Vec<u8>> {
        let bytes = TxCodec::decode_hex_tx(&req.tx)?;
        let raw = TxCodec::decode_raw(&bytes)?;
        let overrides = self.overrides(req)?;

        let out = match raw {
            RawTransaction::Single(mut tx) => {
                if req.index != 0 {
                    return Err(ApiError::IndexOutOfRange {
                        index: req.index,
                        len: 1,
                    });
                }
                overrides.apply(&mut tx);
                if let Some(fee) = overrides.fee {
                    tx.fee = fee;
                }
                TxCodec::encode(&tx)
            }
            RawTransaction::Group(members) => {
                let len = members.len();
                let target = usize::try_from(req.index)
                    .ok()
                    .filter(|index| *index <= len)
                    .ok_or(ApiError::IndexOutOfRange {
                        index: req.index,
                        len,
                    })?;

                let mut group = TxGroup::from_members(members)?;
                {
                    let members = group.members_mut();
                    if target == 0 {
                        members.iter_mut().for_each(|tx| overrides.apply_expiry(tx));
                        overrides.apply_to(&mut members[0]);
                    } else {
                        overrides.apply(&mut members[target - 1]);
                    }
                    if let Some(fee) = overrides.fee {
                        members[0].fee = fee;
                    }
                }
                group.relink();
                group.verify()?;
                group.encode()
            }
        };

        debug!(
            index = req.index,
            changed = out != bytes,
            size = out.len(),
            "Raw transaction rewritten"
        );
        Ok(out)
    }

    fn overrides(&self, req: &ReWriteRawTx) -> ApiResult<Overrides> {
        let mut overrides = Overrides::default();

        let to = req.to.trim();
        if !to.is_empty() {
            check_address(to).map_err(|e| ApiError::invalid_address(to, e))?;
            overrides.to = Some(to.to_string());
        }

        if req.fee < 0 {
            return Err(ApiError::invalid_param("fee cannot be negative"));
        }
        if req.fee > 0 {
            overrides.fee = Some(req.fee);
        }

        if !req.expire.trim().is_empty() {
            overrides.expiry = Some(parse_expire(
                &req.expire,
                self.clock.now(),
                self.min_duration,
                &self.forks,
            )?);
        }

        Ok(overrides)
    }
}
