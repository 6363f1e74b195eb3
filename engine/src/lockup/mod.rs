#![allow(
    clippy::assign_op_pattern,
    clippy::manual_range_contains,
    clippy::ptr_offset_with_cast
)]

use sha2::{Digest, Sha256};
use tracing::debug;
use uint::construct_uint;

use crate::accessor::ContractViewAccessor;
use crate::errors::RpcError;

mod balance;
pub mod contract;
mod types;

pub use balance::{compute_locked_amount, start_of_release, unreleased_amount, unvested_amount};
pub use types::{AccountLockup, LockupState, TerminationStatus, VestingInformation};

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

/// Raw type for balance in yocto-NEAR
pub type Balance = u128;
/// Raw type for duration in nanoseconds
pub type Duration = u64;
/// Raw type for timestamp in nanoseconds
pub type Timestamp = u64;

// The timestamp (nanos) when transfers were enabled in the Mainnet after community voting
// Tuesday, 13 October 2020 18:38:58.293
pub const PHASE2_TIMESTAMP: Timestamp = 1602614338293769340;

/// Master account that creates lockups on Mainnet.
pub const MAINNET_LOCKUP_MASTER: &str = "lockup.near";

/// Whitelist account id the lockup factory sets when staking is not allowed.
pub const STAKING_DISABLED_WHITELIST: &str = "system";

/// Lockup account id the lockup factory assigns to `owner_account_id`:
/// the first 20 bytes of `sha256(owner_account_id)` in hex, under `lockup_master`.
pub fn lockup_account_id(owner_account_id: &str, lockup_master: &str) -> String {
    let hash = Sha256::digest(owner_account_id.as_bytes());
    format!("{}.{}", hex::encode(&hash[..20]), lockup_master)
}

/// Whether the account id has the shape the lockup factory produces.
pub fn is_lockup_account(account_id: &str) -> bool {
    match account_id.split_once('.') {
        Some((prefix, master)) => {
            prefix.len() == 40
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
                && master.starts_with("lockup.")
        }
        None => false,
    }
}

/// Accepts `@alice.near`, a wallet send-money link or a plain account id.
pub fn normalize_account_id(input: &str) -> String {
    input
        .trim()
        .trim_start_matches("https://wallet.near.org/send-money/")
        .replace('@', "")
        .to_lowercase()
}

/// Reads the lockup behind `account_id` (either the owner or the lockup itself)
/// and derives its locked and liquid amounts.
pub async fn view_account_lockup<A>(
    accessor: &A,
    account_id: &str,
    lockup_master: &str,
) -> Result<AccountLockup, RpcError>
where
    A: ContractViewAccessor + ?Sized,
{
    let account_id = normalize_account_id(account_id);
    let lockup_account_id = if is_lockup_account(&account_id) {
        account_id
    } else {
        lockup_account_id(&account_id, lockup_master)
    };
    debug!(
        target: crate::ENGINE,
        "Reading lockup contract state of {}", lockup_account_id
    );

    let lockup_state = accessor
        .get_lockup_contract_state(&lockup_account_id)
        .await?;
    Ok(AccountLockup::new(lockup_account_id, lockup_state)?)
}
