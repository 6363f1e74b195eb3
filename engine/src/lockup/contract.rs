// Borsh layout of the lockup contract state
// https://github.com/near/core-contracts/blob/master/lockup/src/types.rs
// https://github.com/near/core-contracts/blob/master/lockup/src/lib.rs
// JSON wrappers of the contract (U64, U128, Base64VecU8) are stored as their raw values.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Balance, Duration, LockupState, TerminationStatus, Timestamp};
use crate::errors::LockupError;

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct LockupContract {
    /// The account ID of the owner.
    pub owner_account_id: String,

    /// Information about lockup schedule and the amount.
    pub lockup_information: LockupInformation,

    /// Information about vesting including schedule or termination status.
    pub vesting_information: VestingInformation,

    /// Account ID of the staking pool whitelist contract.
    pub staking_pool_whitelist_account_id: String,

    /// Information about staking and delegation.
    /// `Some` means the staking information is available and the staking pool contract is selected.
    /// `None` means there is no staking pool selected.
    pub staking_information: Option<StakingInformation>,

    /// The account ID that the NEAR Foundation, that has the ability to terminate vesting.
    pub foundation_account_id: Option<String>,
}

/// Contains information about token lockups.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct LockupInformation {
    /// The amount in yocto-NEAR tokens locked for this account.
    pub lockup_amount: Balance,
    /// The amount of tokens that were withdrawn by NEAR foundation due to early termination
    /// of vesting.
    pub termination_withdrawn_tokens: Balance,
    /// [deprecated] - the duration in nanoseconds of the lockup period from
    /// the moment the transfers are enabled.
    pub lockup_duration: Duration,
    /// If present, it is the duration when the full lockup amount will be available.
    pub release_duration: Option<Duration>,
    /// The optional absolute lockup timestamp in nanoseconds which locks the tokens until this
    /// timestamp passes.
    pub lockup_timestamp: Option<Timestamp>,
    /// The information about the transfers.
    pub transfers_information: TransfersInformation,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub enum TransfersInformation {
    /// The timestamp when the transfers were enabled.
    TransfersEnabled { transfers_timestamp: Timestamp },
    /// The account ID of the transfers poll contract, to check if the transfers are enabled.
    TransfersDisabled { transfer_poll_account_id: String },
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    /// There are no transactions in progress.
    Idle,
    /// There is a transaction in progress.
    Busy,
}

/// Contains information about current stake and delegation.
#[derive(BorshDeserialize, BorshSerialize, Debug, Clone)]
pub struct StakingInformation {
    /// The Account ID of the staking pool contract.
    pub staking_pool_account_id: String,
    /// Contains status whether there is a transaction in progress.
    pub status: TransactionStatus,
    /// The amount of tokens that were deposited from this account to the staking pool.
    pub deposit_amount: Balance,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq)]
pub struct VestingSchedule {
    pub start_timestamp: Timestamp,
    pub cliff_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq)]
pub enum VestingInformation {
    None,
    /// Vesting schedule is hashed for privacy and only will be revealed if the NEAR foundation
    /// has to terminate vesting.
    VestingHash(Vec<u8>),
    /// Explicit vesting schedule.
    VestingSchedule(VestingSchedule),
    /// The early termination of the vesting is currently in progress.
    Terminating(TerminationInformation),
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq)]
pub struct TerminationInformation {
    /// The amount of tokens that are unvested and has to be transferred back to NEAR Foundation.
    pub unvested_amount: Balance,
    /// The status of the withdrawal.
    pub status: ContractTerminationStatus,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Copy, PartialEq)]
pub enum ContractTerminationStatus {
    VestingTerminatedWithDeficit,
    UnstakingInProgress,
    EverythingUnstaked,
    WithdrawingFromStakingPoolInProgress,
    ReadyToWithdraw,
    WithdrawingFromAccountInProgress,
}

impl From<ContractTerminationStatus> for TerminationStatus {
    fn from(status: ContractTerminationStatus) -> Self {
        match status {
            ContractTerminationStatus::VestingTerminatedWithDeficit => {
                Self::VestingTerminatedWithDeficit
            }
            ContractTerminationStatus::UnstakingInProgress => Self::UnstakingInProgress,
            ContractTerminationStatus::EverythingUnstaked => Self::EverythingUnstaked,
            ContractTerminationStatus::WithdrawingFromStakingPoolInProgress => {
                Self::WithdrawingFromStakingPoolInProgress
            }
            ContractTerminationStatus::ReadyToWithdraw => Self::ReadyToWithdraw,
            ContractTerminationStatus::WithdrawingFromAccountInProgress => {
                Self::WithdrawingFromAccountInProgress
            }
        }
    }
}

impl LockupContract {
    /// Snapshot of the contract at `block_timestamp`.
    ///
    /// If owner of the lockup account didn't call the `check_transfers_vote` contract method,
    /// the contract still thinks transfers are disabled. The calculator assumes they were
    /// enabled at phase2, so `transfers_information` is ignored here.
    pub fn into_lockup_state(
        self,
        block_timestamp: Timestamp,
        has_broken_timestamp: bool,
    ) -> LockupState {
        let vesting_information = match self.vesting_information {
            VestingInformation::None => None,
            VestingInformation::VestingHash(hash) => Some(super::VestingInformation::Private {
                vesting_hash: base64::encode(hash),
            }),
            VestingInformation::VestingSchedule(schedule) => {
                Some(super::VestingInformation::Scheduled {
                    start: schedule.start_timestamp,
                    cliff: Some(schedule.cliff_timestamp),
                    end: Some(schedule.end_timestamp),
                })
            }
            VestingInformation::Terminating(termination) => {
                Some(super::VestingInformation::Terminated {
                    unvested_amount: termination.unvested_amount,
                    status: Some(termination.status.into()),
                })
            }
        };

        LockupState {
            owner: self.owner_account_id,
            lockup_amount: self.lockup_information.lockup_amount,
            termination_withdrawn_tokens: self.lockup_information.termination_withdrawn_tokens,
            lockup_duration: self.lockup_information.lockup_duration,
            release_duration: self.lockup_information.release_duration.unwrap_or(0),
            lockup_timestamp: self.lockup_information.lockup_timestamp.unwrap_or(0),
            block_timestamp,
            has_broken_timestamp,
            vesting_information,
            staking_pool_whitelist_account_id: self.staking_pool_whitelist_account_id,
            staking_pool_account_id: self
                .staking_information
                .map(|staking| staking.staking_pool_account_id),
        }
    }
}

// The lockup contract implementation had a bug that affected lockup start date.
// https://github.com/near/core-contracts/pull/136
// For each contract, we should choose the logic based on the binary version of the contract
pub fn is_broken_timestamp_contract(
    code_hash: &str,
    account_id: &str,
) -> Result<bool, LockupError> {
    match code_hash {
        // The first implementation, with the bug
        "3kVY9qcVRoW3B5498SMX6R3rtSLiCdmBzKs7zcnzDJ7Q" => Ok(true),
        // We have 6 lockups created at 6th of April 2021, assume it's buggy
        "DiC9bKCqUHqoYqUXovAnqugiuntHWnM3cAc7KrgaHTu" => Ok(true),
        // Another 5 lockups created in May/June 2021, assume they are OK
        "Cw7bnyp4B6ypwvgZuMmJtY6rHsxP2D4PC8deqeJ3HP7D" => Ok(false),
        // The most fresh one
        "4Pfw2RU6e35dUsHQQoFYfwX8KFFvSRNwMSNLXuSFHXrC" => Ok(false),
        other => Err(LockupError::UnknownContractVersion {
            account_id: account_id.to_string(),
            code_hash: other.to_string(),
        }),
    }
}
