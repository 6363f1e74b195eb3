//! Derives user-facing facts from raw NEAR contract state: locked and liquid
//! lockup balances, and explained multisig requests across a team's wallets.

pub mod accessor;
pub mod arith;
pub mod errors;
pub mod lockup;
pub mod multisig;
pub mod rpc;

pub use accessor::{AccessKeyInfo, AccessKeyPermission, ContractViewAccessor};
pub use errors::{AggregationError, ExplanationError, LockupError, RpcError};
pub use lockup::{compute_locked_amount, lockup_account_id, AccountLockup, LockupState};
pub use multisig::{
    aggregate_request_rows, aggregate_request_rows_with_timeout, decode_function_call_args,
    discover_multisig_accounts, explain_action, usable_keys_for_signing, Action, Explanation,
    MultisigRequest, RequestRow, Wallet,
};
pub use rpc::JsonRpcAccessor;

// Category for logging
pub(crate) const ENGINE: &str = "team_wallet_engine";
