use serde_json::json;
use sha2::{Digest, Sha256};

use super::{format_near_amount, ActionContext, ActionHandler, Beneficiary};
use crate::accessor::AccessKeyPermission;
use crate::errors::ExplanationError;
use crate::multisig::{Action, MULTISIG_CHANGE_METHODS, MULTISIG_CONFIRM_METHODS};

const LOCKUP_STAKING_POOL_METHODS: [&str; 8] = [
    "deposit_to_staking_pool",
    "deposit_and_stake",
    "stake",
    "unstake",
    "unstake_all",
    "withdraw_from_staking_pool",
    "withdraw_all_from_staking_pool",
    "refresh_staking_pool_balance",
];

const LOCKUP_ADMINISTRATION_METHODS: [&str; 5] = [
    "unselect_staking_pool",
    "check_transfers_vote",
    "terminate_vesting",
    "termination_prepare_to_withdraw",
    "termination_withdraw",
];

const STAKING_POOL_METHODS: [&str; 7] = [
    "deposit",
    "deposit_and_stake",
    "stake",
    "unstake",
    "unstake_all",
    "withdraw",
    "withdraw_all",
];

fn amount_or(context: &ActionContext<'_>, field: &str, fallback: &str) -> String {
    context
        .arg_balance(field)
        .map(|amount| format!("{} NEAR", format_near_amount(amount)))
        .unwrap_or_else(|| fallback.to_string())
}

/// Requests forwarded to another multisig contract (e.g. the foundation's).
pub struct MultisigRequestOperation;

impl ActionHandler for MultisigRequestOperation {
    fn name(&self) -> &'static str {
        "multisig_request_operation"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_call_to(&MULTISIG_CHANGE_METHODS)
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        if !context.is_call_to(&["add_request", "add_request_and_confirm"]) {
            return Ok(Beneficiary::None);
        }
        context
            .args()
            .and_then(|args| args.get("request")?.get("receiver_id")?.as_str())
            .map(|receiver_id| Beneficiary::Account(receiver_id.to_string()))
            .ok_or_else(|| ExplanationError::MalformedArguments {
                receiver_id: context.receiver_id.to_string(),
                method_name: context.method_name().unwrap_or_default().to_string(),
                field: "request.receiver_id",
            })
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        let request_id = context
            .args()
            .and_then(|args| args.get("request_id")?.as_u64())
            .map(|request_id| format!("#{}", request_id))
            .unwrap_or_else(|| "unknown".to_string());
        match context.method_name().unwrap_or_default() {
            "confirm" => format!("Confirm request {} on {}", request_id, context.receiver_id),
            "delete_request" => format!("Delete request {} on {}", request_id, context.receiver_id),
            method_name => format!(
                "Propose a request to {} on multisig {}{}",
                actual_receiver.unwrap_or("unknown receiver"),
                context.receiver_id,
                if method_name == "add_request_and_confirm" {
                    " and confirm it"
                } else {
                    ""
                }
            ),
        }
    }
}

/// `transfer` on a lockup sends liquid tokens out of the lockup.
pub struct LockupTransfer;

impl ActionHandler for LockupTransfer {
    fn name(&self) -> &'static str {
        "lockup_transfer"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_lockup_receiver() && context.is_call_to(&["transfer"])
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::Account(
            context.required_arg("receiver_id")?.to_string(),
        ))
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        let amount = amount_or(context, "amount", "an unknown amount");
        match actual_receiver {
            Some(receiver) if receiver == context.wallet_id => format!(
                "Withdraw {} from lockup {} to {}",
                amount, context.receiver_id, receiver
            ),
            Some(receiver) => format!(
                "Transfer {} from lockup {} to {}",
                amount, context.receiver_id, receiver
            ),
            None => format!("Transfer {} from lockup {}", amount, context.receiver_id),
        }
    }
}

pub struct LockupSelectStakingPool;

impl ActionHandler for LockupSelectStakingPool {
    fn name(&self) -> &'static str {
        "lockup_select_staking_pool"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_lockup_receiver() && context.is_call_to(&["select_staking_pool"])
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::Account(
            context.required_arg("staking_pool_account_id")?.to_string(),
        ))
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        format!(
            "Select staking pool {} for lockup {}",
            actual_receiver.unwrap_or("unknown"),
            context.receiver_id
        )
    }
}

/// Staking through a lockup; the tokens end up in the pool the lockup has selected.
pub struct LockupStakingPoolOperation;

impl ActionHandler for LockupStakingPoolOperation {
    fn name(&self) -> &'static str {
        "lockup_staking_pool_operation"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_lockup_receiver() && context.is_call_to(&LOCKUP_STAKING_POOL_METHODS)
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::View {
            account_id: context.receiver_id.to_string(),
            method_name: "get_staking_pool_account_id",
            args: json!({}),
        })
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        let pool = actual_receiver.unwrap_or("the selected staking pool");
        let lockup = context.receiver_id;
        match context.method_name().unwrap_or_default() {
            "deposit_to_staking_pool" => format!(
                "Deposit {} from lockup {} to {}",
                amount_or(context, "amount", "tokens"),
                lockup,
                pool
            ),
            "deposit_and_stake" => format!(
                "Stake {} from lockup {} with {}",
                amount_or(context, "amount", "tokens"),
                lockup,
                pool
            ),
            "stake" => format!(
                "Stake {} already deposited by lockup {} with {}",
                amount_or(context, "amount", "tokens"),
                lockup,
                pool
            ),
            "unstake" => format!(
                "Unstake {} of lockup {} from {}",
                amount_or(context, "amount", "tokens"),
                lockup,
                pool
            ),
            "unstake_all" => format!("Unstake everything of lockup {} from {}", lockup, pool),
            "withdraw_from_staking_pool" => format!(
                "Withdraw {} from {} back to lockup {}",
                amount_or(context, "amount", "tokens"),
                pool,
                lockup
            ),
            "withdraw_all_from_staking_pool" => {
                format!("Withdraw everything from {} back to lockup {}", pool, lockup)
            }
            _ => format!("Refresh balance of lockup {} in {}", lockup, pool),
        }
    }
}

pub struct LockupAdministration;

impl ActionHandler for LockupAdministration {
    fn name(&self) -> &'static str {
        "lockup_administration"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_lockup_receiver() && context.is_call_to(&LOCKUP_ADMINISTRATION_METHODS)
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        if context.is_call_to(&["termination_withdraw"]) {
            return Ok(Beneficiary::Account(
                context.required_arg("receiver_id")?.to_string(),
            ));
        }
        Ok(Beneficiary::None)
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        let lockup = context.receiver_id;
        match context.method_name().unwrap_or_default() {
            "unselect_staking_pool" => format!("Unselect the staking pool of lockup {}", lockup),
            "check_transfers_vote" => format!("Check whether transfers are enabled for lockup {}", lockup),
            "terminate_vesting" => {
                let private = context
                    .args()
                    .map_or(false, |args| args.get("vesting_schedule_with_salt").is_some());
                format!(
                    "Terminate {}vesting of lockup {}",
                    if private { "private " } else { "" },
                    lockup
                )
            }
            "termination_prepare_to_withdraw" => {
                format!("Prepare terminated lockup {} for withdrawal", lockup)
            }
            _ => format!(
                "Withdraw unvested tokens of terminated lockup {} to {}",
                lockup,
                actual_receiver.unwrap_or("unknown")
            ),
        }
    }
}

/// NEP-141 transfers: the nominal receiver is the token contract.
pub struct FungibleTokenTransfer;

impl ActionHandler for FungibleTokenTransfer {
    fn name(&self) -> &'static str {
        "fungible_token_transfer"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_call_to(&["ft_transfer", "ft_transfer_call"])
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::Account(
            context.required_arg("receiver_id")?.to_string(),
        ))
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        let amount = context.arg_str("amount").unwrap_or("an unknown amount of");
        let description = format!(
            "Transfer {} {} tokens to {}",
            amount,
            context.receiver_id,
            actual_receiver.unwrap_or("unknown")
        );
        match context.arg_str("memo") {
            Some(memo) if !memo.is_empty() => format!("{} (memo: {})", description, memo),
            _ => description,
        }
    }
}

/// NEP-145 storage registration, usually of the account about to receive tokens.
pub struct StorageDeposit;

impl ActionHandler for StorageDeposit {
    fn name(&self) -> &'static str {
        "storage_deposit"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.is_call_to(&["storage_deposit"])
    }

    fn beneficiary(&self, context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(context
            .arg_str("account_id")
            .map_or(Beneficiary::None, |account_id| {
                Beneficiary::Account(account_id.to_string())
            }))
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        format!(
            "Register {} on {} with a {} NEAR storage deposit",
            actual_receiver.unwrap_or(context.wallet_id),
            context.receiver_id,
            format_near_amount(context.deposit())
        )
    }
}

/// Direct calls to a staking pool contract.
pub struct StakingPoolOperation;

impl ActionHandler for StakingPoolOperation {
    fn name(&self) -> &'static str {
        "staking_pool_operation"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        !context.is_lockup_receiver() && context.is_call_to(&STAKING_POOL_METHODS)
    }

    fn describe(&self, context: &ActionContext<'_>, _actual_receiver: Option<&str>) -> String {
        let pool = context.receiver_id;
        let deposit = format_near_amount(context.deposit());
        match context.method_name().unwrap_or_default() {
            "deposit" => format!("Deposit {} NEAR to {}", deposit, pool),
            "deposit_and_stake" => format!("Stake {} NEAR with {}", deposit, pool),
            "stake" => format!(
                "Stake {} already deposited with {}",
                amount_or(context, "amount", "tokens"),
                pool
            ),
            "unstake" => format!(
                "Unstake {} from {}",
                amount_or(context, "amount", "tokens"),
                pool
            ),
            "unstake_all" => format!("Unstake everything from {}", pool),
            "withdraw" => format!(
                "Withdraw {} from {}",
                amount_or(context, "amount", "tokens"),
                pool
            ),
            _ => format!("Withdraw everything from {}", pool),
        }
    }
}

pub struct NativeTransfer;

impl ActionHandler for NativeTransfer {
    fn name(&self) -> &'static str {
        "native_transfer"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        matches!(context.action, Action::Transfer { .. })
    }

    fn describe(&self, context: &ActionContext<'_>, _actual_receiver: Option<&str>) -> String {
        let amount = match context.action {
            Action::Transfer { amount } => *amount,
            _ => 0,
        };
        format!(
            "Transfer {} NEAR to {}",
            format_near_amount(amount),
            context.receiver_id
        )
    }
}

pub struct AccessKey;

impl ActionHandler for AccessKey {
    fn name(&self) -> &'static str {
        "access_key"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        matches!(
            context.action,
            Action::AddKey { .. } | Action::DeleteKey { .. }
        )
    }

    fn describe(&self, context: &ActionContext<'_>, _actual_receiver: Option<&str>) -> String {
        match (context.action, context.action.added_key_permission()) {
            (Action::AddKey { public_key, .. }, Some(AccessKeyPermission::FullAccess)) => format!(
                "Add full access key {} to {}",
                public_key, context.receiver_id
            ),
            (
                Action::AddKey { public_key, .. },
                Some(AccessKeyPermission::FunctionCall {
                    receiver_id,
                    method_names,
                    ..
                }),
            ) if receiver_id == context.receiver_id
                && method_names == MULTISIG_CONFIRM_METHODS =>
            {
                format!(
                    "Add confirmation key {} to multisig {}",
                    public_key, context.receiver_id
                )
            }
            (
                Action::AddKey { public_key, .. },
                Some(AccessKeyPermission::FunctionCall {
                    receiver_id,
                    method_names,
                    ..
                }),
            ) => format!(
                "Add key {} to {} allowed to call {} on {}",
                public_key,
                context.receiver_id,
                if method_names.is_empty() {
                    "any method".to_string()
                } else {
                    method_names.join(", ")
                },
                receiver_id
            ),
            (Action::DeleteKey { public_key }, _) => {
                format!("Delete key {} from {}", public_key, context.receiver_id)
            }
            _ => format!("Change access keys of {}", context.receiver_id),
        }
    }
}

pub struct MultisigConfiguration;

impl ActionHandler for MultisigConfiguration {
    fn name(&self) -> &'static str {
        "multisig_configuration"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        matches!(
            context.action,
            Action::SetNumConfirmations { .. } | Action::SetActiveRequestsLimit { .. }
        )
    }

    fn describe(&self, context: &ActionContext<'_>, _actual_receiver: Option<&str>) -> String {
        match context.action {
            Action::SetNumConfirmations { num_confirmations } => format!(
                "Require {} confirmations for requests on {}",
                num_confirmations, context.receiver_id
            ),
            Action::SetActiveRequestsLimit {
                active_requests_limit,
            } => format!(
                "Allow {} active requests per key on {}",
                active_requests_limit, context.receiver_id
            ),
            _ => format!("Reconfigure multisig {}", context.receiver_id),
        }
    }
}

pub struct AccountManagement;

impl ActionHandler for AccountManagement {
    fn name(&self) -> &'static str {
        "account_management"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        matches!(
            context.action,
            Action::CreateAccount | Action::DeployContract { .. } | Action::Stake { .. }
        )
    }

    fn describe(&self, context: &ActionContext<'_>, _actual_receiver: Option<&str>) -> String {
        match context.action {
            Action::CreateAccount => format!("Create account {}", context.receiver_id),
            Action::DeployContract { code } => match base64::decode(code) {
                Ok(code) => format!(
                    "Deploy contract with code sha256 {} to {}",
                    hex::encode(Sha256::digest(code)),
                    context.receiver_id
                ),
                Err(_) => format!("Deploy contract to {}", context.receiver_id),
            },
            Action::Stake { amount, public_key } => format!(
                "Stake {} NEAR on {} as a validator with key {}",
                format_near_amount(*amount),
                context.receiver_id,
                public_key
            ),
            _ => format!("Manage account {}", context.receiver_id),
        }
    }
}
