//! Multisig requests of a team's wallets: decoding, explanation and aggregation.

mod aggregator;
mod decoder;
pub mod explainer;
mod keys;
mod types;

pub use aggregator::{
    aggregate_request_rows, aggregate_request_rows_with_registry,
    aggregate_request_rows_with_timeout,
};
pub use decoder::decode_function_call_args;
pub use explainer::{explain_action, ExplainerRegistry};
pub use keys::{discover_multisig_accounts, usable_keys_for_signing};
pub use types::{
    Action, Explanation, FunctionCallArgs, FunctionCallPermission, MultisigRequest,
    RequestBody, RequestRow, Wallet,
};

/// Change methods of the multisig contract
pub const MULTISIG_CHANGE_METHODS: [&str; 4] = [
    "add_request",
    "add_request_and_confirm",
    "delete_request",
    "confirm",
];

/// Methods a confirmation-only access key of the multisig contract may call
pub const MULTISIG_CONFIRM_METHODS: [&str; 1] = ["confirm"];
