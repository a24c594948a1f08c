//! Built-in system fork schedules.

/// System forks known to every node, with their main-chain activation heights.
pub const SYSTEM_FORKS: &[(&str, i64)] = &[
    ("ForkChainParamV1", 110_000),
    ("ForkCheckTxDup", 75_260),
    ("ForkBlockHash", 209_186),
    ("ForkMinerTime", 350_000),
    ("ForkTransferExec", 100_000),
    ("ForkExecKey", 200_000),
    ("ForkTxGroup", 200_000),
    ("ForkResetTx0", 200_000),
    ("ForkWithdraw", 200_000),
    ("ForkExecRollback", 450_000),
    ("ForkCheckBlockTime", 1_200_000),
    ("ForkMultiSignAddress", 1_298_600),
    ("ForkStateDBSet", 1_572_391),
    ("ForkLocalDBAccess", 1_572_391),
    ("ForkTxHeight", 1_600_000),
    ("ForkTxGroupPara", 1_687_250),
    ("ForkBlockCheck", 1_725_000),
    ("ForkBase58AddressCheck", 1_800_000),
    ("ForkChainParamV2", 1_987_000),
    ("ForkEnableParaRegExec", 0),
    ("ForkCacheDriver", 2_580_000),
    ("ForkTicketFundAddrV1", 3_350_000),
    ("ForkRootHash", 4_500_000),
];

/// Forks that stay at height 1 on a development chain.
const LOCAL_DELAYED: &[&str] = &["ForkBlockHash", "ForkRootHash"];

/// Which system schedule a chain follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSchedule {
    /// Development chain: everything active from genesis except the forks in
    /// `LOCAL_DELAYED`, which activate at 1.
    Local,
    /// Main chain heights from [`SYSTEM_FORKS`].
    Mainnet,
}

impl SystemSchedule {
    /// Schedule for a chain title.
    pub fn for_title(title: &str) -> Self {
        if title == crate::DEFAULT_TITLE {
            SystemSchedule::Local
        } else {
            SystemSchedule::Mainnet
        }
    }

    /// Iterate `(fork, height)` pairs of this schedule.
    pub fn forks(self) -> impl Iterator<Item = (&'static str, i64)> {
        SYSTEM_FORKS.iter().map(move |&(name, height)| match self {
            SystemSchedule::Mainnet => (name, height),
            SystemSchedule::Local if LOCAL_DELAYED.contains(&name) => (name, 1),
            SystemSchedule::Local => (name, 0),
        })
    }
}
