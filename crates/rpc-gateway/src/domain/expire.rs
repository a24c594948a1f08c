//! Expiry expressions.
//!
//! | expression   | meaning                                        |
//! |--------------|------------------------------------------------|
//! | `H:<n>`      | expires `n` blocks after inclusion (tx height) |
//! | `<n>`        | expires at block height `n`                    |
//! | `130s`, `1h` | expires that long from now                     |

use crate::domain::error::{ApiError, ApiResult};
use chain_forks::{ForkTable, FORK_NOT_ACTIVATED};
use shared_types::Expiry;
use std::time::Duration;

const TX_HEIGHT_PREFIX: &str = "H:";

/// Fork gating tx-height expiry.
pub const FORK_TX_HEIGHT: &str = "ForkTxHeight";

/// A parsed expiry expression, not yet anchored to a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireSpec {
    TxHeight(i64),
    BlockHeight(i64),
    Duration(Duration),
}

impl ExpireSpec {
    pub fn parse(expr: &str) -> ApiResult<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(ApiError::InvalidExpire("empty expression".into()));
        }

        if let Some(height) = expr.strip_prefix(TX_HEIGHT_PREFIX) {
            let height: i64 = height
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidExpire(format!("{:?}: bad tx height", expr)))?;
            if height <= 0 {
                return Err(ApiError::InvalidExpire(format!(
                    "{:?}: tx height must be positive",
                    expr
                )));
            }
            return Ok(ExpireSpec::TxHeight(height));
        }

        if let Ok(height) = expr.parse::<i64>() {
            if height < 0 {
                return Err(ApiError::InvalidExpire(format!(
                    "{:?}: block height cannot be negative",
                    expr
                )));
            }
            return Ok(ExpireSpec::BlockHeight(height));
        }

        humantime::parse_duration(expr)
            .map(ExpireSpec::Duration)
            .map_err(|e| ApiError::InvalidExpire(format!("{:?}: {}", expr, e)))
    }

    /// Anchor to `now` (unix seconds) and produce the transaction expiry.
    ///
    /// Durations shorter than `min_duration` are raised to it. Tx-height
    /// expiry is refused unless `ForkTxHeight` is scheduled.
    pub fn resolve(
        self,
        now: u64,
        min_duration: Duration,
        forks: &ForkTable,
    ) -> ApiResult<Expiry> {
        match self {
            ExpireSpec::TxHeight(height) => {
                if forks.resolve(forks.default_title(), FORK_TX_HEIGHT) == FORK_NOT_ACTIVATED {
                    return Err(ApiError::InvalidExpire(format!(
                        "tx height expiry needs {}",
                        FORK_TX_HEIGHT
                    )));
                }
                Ok(Expiry::TxHeight(height))
            }
            ExpireSpec::BlockHeight(0) => Ok(Expiry::Never),
            ExpireSpec::BlockHeight(height) if height >= shared_types::EXPIRE_BOUND => {
                Err(ApiError::InvalidExpire(format!(
                    "block height {} collides with timestamp range",
                    height
                )))
            }
            ExpireSpec::BlockHeight(height) => Ok(Expiry::BlockHeight(height)),
            ExpireSpec::Duration(duration) => {
                let secs = duration.max(min_duration).as_secs();
                let at = now
                    .checked_add(secs)
                    .and_then(|t| i64::try_from(t).ok())
                    .ok_or_else(|| ApiError::InvalidExpire("duration overflows".into()))?;
                Ok(Expiry::UnixTime(at))
            }
        }
    }
}

/// Parse and anchor in one step.
pub fn parse_expire(
    expr: &str,
    now: u64,
    min_duration: Duration,
    forks: &ForkTable,
) -> ApiResult<Expiry> {
    ExpireSpec::parse(expr)?.resolve(now, min_duration, forks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_forks::ForkTableBuilder;

    const NOW: u64 = 1_700_000_000;
    const MIN: Duration = Duration::from_secs(120);

    #[test]
    fn test_parse_forms() {
        assert_eq!(ExpireSpec::parse("H:10").unwrap(), ExpireSpec::TxHeight(10));
        assert_eq!(ExpireSpec::parse("500").unwrap(), ExpireSpec::BlockHeight(500));
        assert_eq!(
            ExpireSpec::parse("130s").unwrap(),
            ExpireSpec::Duration(Duration::from_secs(130))
        );
        assert_eq!(
            ExpireSpec::parse("1h30m").unwrap(),
            ExpireSpec::Duration(Duration::from_secs(5400))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for expr in ["", "H:", "H:0", "H:-3", "H:abc", "-5", "soon"] {
            assert!(
                matches!(ExpireSpec::parse(expr), Err(ApiError::InvalidExpire(_))),
                "{:?}",
                expr
            );
        }
    }

    #[test]
    fn test_duration_is_floored() {
        let forks = ForkTable::default();
        assert_eq!(
            parse_expire("10s", NOW, MIN, &forks).unwrap(),
            Expiry::UnixTime(NOW as i64 + 120)
        );
        assert_eq!(
            parse_expire("300s", NOW, MIN, &forks).unwrap(),
            Expiry::UnixTime(NOW as i64 + 300)
        );
    }

    #[test]
    fn test_block_height() {
        let forks = ForkTable::default();
        assert_eq!(
            parse_expire("1200", NOW, MIN, &forks).unwrap(),
            Expiry::BlockHeight(1200)
        );
        assert_eq!(parse_expire("0", NOW, MIN, &forks).unwrap(), Expiry::Never);
        assert!(parse_expire("2000000000", NOW, MIN, &forks).is_err());
    }

    #[test]
    fn test_tx_height_needs_fork() {
        let forks = ForkTable::default();
        assert_eq!(
            parse_expire("H:20", NOW, MIN, &forks).unwrap(),
            Expiry::TxHeight(20)
        );

        let mut builder = ForkTableBuilder::local();
        builder.register_system(FORK_TX_HEIGHT, -1).unwrap();
        let disabled = builder.build();
        assert!(matches!(
            parse_expire("H:20", NOW, MIN, &disabled),
            Err(ApiError::InvalidExpire(_))
        ));
    }
}
