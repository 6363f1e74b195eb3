use near_primitives::serialize::dec_format;
use serde::{Deserialize, Serialize};

use super::{Balance, Duration, Timestamp, STAKING_DISABLED_WHITELIST};
use crate::arith::saturating_sub;
use crate::errors::LockupError;

/// Snapshot of a lockup contract taken at `block_timestamp`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockupState {
    /// The account ID of the owner.
    pub owner: String,
    /// The amount in yocto-NEAR tokens locked for this account.
    #[serde(with = "dec_format")]
    pub lockup_amount: Balance,
    /// The amount of tokens that were withdrawn by NEAR foundation due to early termination
    /// of vesting.
    #[serde(with = "dec_format")]
    pub termination_withdrawn_tokens: Balance,
    /// [deprecated] the duration of the lockup period from the moment the transfers
    /// are enabled.
    #[serde(default, with = "dec_format")]
    pub lockup_duration: Duration,
    /// Duration of the linear release. `0` means there is no release schedule.
    #[serde(default, with = "dec_format")]
    pub release_duration: Duration,
    /// The absolute lockup timestamp, `0` if the contract doesn't define one.
    #[serde(default, with = "dec_format")]
    pub lockup_timestamp: Timestamp,
    #[serde(with = "dec_format")]
    pub block_timestamp: Timestamp,
    /// Set for contract versions that started the release at the wrong moment.
    #[serde(default)]
    pub has_broken_timestamp: bool,
    #[serde(default)]
    pub vesting_information: Option<VestingInformation>,
    pub staking_pool_whitelist_account_id: String,
    #[serde(default)]
    pub staking_pool_account_id: Option<String>,
}

impl LockupState {
    pub fn is_staking_allowed(&self) -> bool {
        self.staking_pool_whitelist_account_id != STAKING_DISABLED_WHITELIST
    }
}

/// Contains information about vesting: the schedule, its hash or termination status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "FlatVestingInformation", into = "FlatVestingInformation")]
pub enum VestingInformation {
    /// Vesting was terminated early, the remaining unvested amount is fixed.
    Terminated {
        unvested_amount: Balance,
        status: Option<TerminationStatus>,
    },
    /// Public linear vesting schedule.
    Scheduled {
        start: Timestamp,
        cliff: Option<Timestamp>,
        end: Option<Timestamp>,
    },
    /// The schedule is hashed for privacy, the unvested amount can't be computed.
    Private { vesting_hash: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    VestingTerminatedWithDeficit,
    UnstakingInProgress,
    EverythingUnstaked,
    WithdrawingFromStakingPoolInProgress,
    ReadyToWithdraw,
    WithdrawingFromAccountInProgress,
}

/// Wire form: the shape is given by which fields are populated.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct FlatVestingInformation {
    #[serde(
        default,
        with = "dec_format",
        skip_serializing_if = "Option::is_none"
    )]
    unvested_amount: Option<Balance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    termination_status: Option<TerminationStatus>,
    #[serde(
        default,
        with = "dec_format",
        skip_serializing_if = "Option::is_none"
    )]
    start: Option<Timestamp>,
    #[serde(
        default,
        with = "dec_format",
        skip_serializing_if = "Option::is_none"
    )]
    cliff: Option<Timestamp>,
    #[serde(
        default,
        with = "dec_format",
        skip_serializing_if = "Option::is_none"
    )]
    end: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vesting_hash: Option<String>,
}

impl TryFrom<FlatVestingInformation> for VestingInformation {
    type Error = LockupError;

    fn try_from(flat: FlatVestingInformation) -> Result<Self, Self::Error> {
        if let Some(unvested_amount) = flat.unvested_amount {
            Ok(Self::Terminated {
                unvested_amount,
                status: flat.termination_status,
            })
        } else if let Some(start) = flat.start {
            Ok(Self::Scheduled {
                start,
                cliff: flat.cliff,
                end: flat.end,
            })
        } else if let Some(vesting_hash) = flat.vesting_hash {
            Ok(Self::Private { vesting_hash })
        } else {
            Err(LockupError::MalformedSchedule(
                "neither unvested amount, schedule start nor vesting hash is present".to_string(),
            ))
        }
    }
}

impl From<VestingInformation> for FlatVestingInformation {
    fn from(vesting_information: VestingInformation) -> Self {
        match vesting_information {
            VestingInformation::Terminated {
                unvested_amount,
                status,
            } => Self {
                unvested_amount: Some(unvested_amount),
                termination_status: status,
                ..Default::default()
            },
            VestingInformation::Scheduled { start, cliff, end } => Self {
                start: Some(start),
                cliff,
                end,
                ..Default::default()
            },
            VestingInformation::Private { vesting_hash } => Self {
                vesting_hash: Some(vesting_hash),
                ..Default::default()
            },
        }
    }
}

/// A lockup account together with the amounts derived from its state.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountLockup {
    pub lockup_account_id: String,
    pub lockup_state: LockupState,
    #[serde(with = "dec_format")]
    pub locked_amount: Balance,
    #[serde(with = "dec_format")]
    pub liquid_amount: Balance,
}

impl AccountLockup {
    pub fn new(lockup_account_id: String, lockup_state: LockupState) -> Result<Self, LockupError> {
        let locked_amount = super::compute_locked_amount(&lockup_state)?;
        // Liquid is whatever is neither locked nor already withdrawn by the foundation
        let liquid_amount = saturating_sub(
            saturating_sub(lockup_state.lockup_amount, locked_amount),
            lockup_state.termination_withdrawn_tokens,
        );
        Ok(Self {
            lockup_account_id,
            lockup_state,
            locked_amount,
            liquid_amount,
        })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(
            self.lockup_state.vesting_information,
            Some(VestingInformation::Terminated { .. })
        ) || self.lockup_state.termination_withdrawn_tokens > 0
    }

    pub fn is_private_schedule(&self) -> bool {
        matches!(
            self.lockup_state.vesting_information,
            Some(VestingInformation::Private { .. })
        )
    }
}
