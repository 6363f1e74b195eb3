// This is almost a copy of https://github.com/near/core-contracts/blob/master/lockup/src/getters.rs#L64
// The integer widths and the order of operations are the contract's, keep them as is.

use super::{
    Balance, Duration, LockupState, Timestamp, VestingInformation, PHASE2_TIMESTAMP, U256,
};
use crate::arith::{max, saturating_sub};
use crate::errors::LockupError;

/// Returns the amount of tokens that are locked in the account due to lockup or vesting.
pub fn compute_locked_amount(state: &LockupState) -> Result<Balance, LockupError> {
    let fully_locked = saturating_sub(state.lockup_amount, state.termination_withdrawn_tokens);
    let block_timestamp = state.block_timestamp;

    if block_timestamp <= PHASE2_TIMESTAMP {
        // Transfers were not enabled yet, release and vesting don't apply
        return Ok(fully_locked);
    }

    let lockup_timestamp = effective_lockup_timestamp(state.lockup_duration, state.lockup_timestamp);
    if block_timestamp < lockup_timestamp {
        // The entire balance is still locked before the lockup timestamp.
        return Ok(fully_locked);
    }

    let unreleased_amount = unreleased_amount(state);
    let unvested_amount = unvested_amount(state)?;

    Ok(max(
        saturating_sub(unreleased_amount, state.termination_withdrawn_tokens),
        unvested_amount,
    ))
}

fn effective_lockup_timestamp(lockup_duration: Duration, lockup_timestamp: Timestamp) -> Timestamp {
    max(
        PHASE2_TIMESTAMP.saturating_add(lockup_duration),
        lockup_timestamp,
    )
}

/// Moment the linear release starts.
///
/// The first parameter is the lockup *duration* counted from `PHASE2_TIMESTAMP`,
/// not a timestamp, the same way the lockup contract's `get_locked_amount` takes it.
/// Fixed contracts never start before `lockup_timestamp`, so the release starts at
/// `max(PHASE2_TIMESTAMP + lockup_duration, lockup_timestamp)`.
///
/// The lockup contract implementation had a bug that affected lockup start date
/// (<https://github.com/near/core-contracts/pull/136>). Versions with
/// `has_broken_timestamp` start the release at `PHASE2_TIMESTAMP`, when transfers
/// were enabled.
pub fn start_of_release(
    lockup_duration: Duration,
    lockup_timestamp: Timestamp,
    has_broken_timestamp: bool,
) -> Timestamp {
    if has_broken_timestamp {
        PHASE2_TIMESTAMP
    } else {
        effective_lockup_timestamp(lockup_duration, lockup_timestamp)
    }
}

/// Amount not yet released by the linear release schedule.
pub fn unreleased_amount(state: &LockupState) -> Balance {
    let release_duration = state.release_duration;
    if release_duration == 0 {
        return 0;
    }

    let start_timestamp = start_of_release(
        state.lockup_duration,
        state.lockup_timestamp,
        state.has_broken_timestamp,
    );
    let end_timestamp = start_timestamp.saturating_add(release_duration);
    if end_timestamp < state.block_timestamp {
        // Everything is released
        return 0;
    }

    let time_left = U256::from(end_timestamp - state.block_timestamp);
    let unreleased_amount =
        U256::from(state.lockup_amount) * time_left / U256::from(release_duration);
    // The unreleased amount can't be larger than lockup_amount because the
    // time_left is smaller than total_time.
    unreleased_amount.as_u128()
}

/// Amount not yet vested. Private schedules and missing vesting count as fully vested.
pub fn unvested_amount(state: &LockupState) -> Result<Balance, LockupError> {
    let lockup_amount = state.lockup_amount;
    let block_timestamp = state.block_timestamp;

    match &state.vesting_information {
        Some(VestingInformation::Terminated {
            unvested_amount, ..
        }) => Ok(*unvested_amount),
        Some(VestingInformation::Scheduled { start, cliff, end }) => {
            if matches!(cliff, Some(cliff) if block_timestamp < *cliff) {
                // Before the cliff, nothing is vested
                return Ok(lockup_amount);
            }
            if matches!(end, Some(end) if block_timestamp >= *end) {
                // After the end, everything is vested
                return Ok(0);
            }
            let end = end.ok_or_else(|| {
                LockupError::MalformedSchedule("schedule has no end timestamp".to_string())
            })?;
            if end <= *start {
                return Err(LockupError::MalformedSchedule(format!(
                    "schedule ends at {} before it starts at {}",
                    end, start
                )));
            }
            if block_timestamp < *start {
                return Ok(lockup_amount);
            }
            // cannot overflow since block_timestamp < end
            let time_left = U256::from(end - block_timestamp);
            let total_time = U256::from(end - *start);
            let unvested_amount = U256::from(lockup_amount) * time_left / total_time;
            Ok(unvested_amount.as_u128())
        }
        // Vesting is private, so we can assume the vesting started before lockup date.
        Some(VestingInformation::Private { .. }) | None => Ok(0),
    }
}
