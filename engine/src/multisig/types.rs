use std::collections::BTreeSet;

use near_primitives::serialize::dec_format;
use serde::{Deserialize, Serialize};

use crate::accessor::AccessKeyPermission;
use crate::lockup::Balance;

/// A wallet of the team, keyed by its account id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Wallet {
    pub wallet_address: String,
}

impl Wallet {
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
        }
    }
}

/// Action of a multisig request, as the multisig contract serializes it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Action {
    CreateAccount,
    DeployContract {
        /// Base64 encoded contract code
        code: String,
    },
    AddKey {
        public_key: String,
        /// `None` means full access
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permission: Option<FunctionCallPermission>,
    },
    DeleteKey {
        public_key: String,
    },
    Transfer {
        #[serde(with = "dec_format")]
        amount: Balance,
    },
    FunctionCall {
        method_name: String,
        args: FunctionCallArgs,
        #[serde(with = "dec_format")]
        deposit: Balance,
        #[serde(with = "dec_format")]
        gas: u64,
    },
    Stake {
        #[serde(with = "dec_format")]
        amount: Balance,
        public_key: String,
    },
    SetNumConfirmations {
        num_confirmations: u32,
    },
    SetActiveRequestsLimit {
        active_requests_limit: u32,
    },
}

impl Action {
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Action::FunctionCall { method_name, .. } => Some(method_name),
            _ => None,
        }
    }

    /// Access key permission granted by an `AddKey` action.
    pub fn added_key_permission(&self) -> Option<AccessKeyPermission> {
        match self {
            Action::AddKey {
                permission: Some(permission),
                ..
            } => Some(AccessKeyPermission::FunctionCall {
                allowance: permission.allowance,
                receiver_id: permission.receiver_id.clone(),
                method_names: permission.method_names.clone(),
            }),
            Action::AddKey {
                permission: None, ..
            } => Some(AccessKeyPermission::FullAccess),
            _ => None,
        }
    }
}

/// Function call arguments stay base64 encoded until they are decoded as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FunctionCallArgs {
    Encoded(String),
    Decoded(serde_json::Value),
}

impl FunctionCallArgs {
    pub fn decoded(&self) -> Option<&serde_json::Value> {
        match self {
            FunctionCallArgs::Decoded(value) => Some(value),
            FunctionCallArgs::Encoded(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallPermission {
    #[serde(default, with = "dec_format")]
    pub allowance: Option<Balance>,
    pub receiver_id: String,
    pub method_names: Vec<String>,
}

/// Result of the `get_request` view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub receiver_id: String,
    pub actions: Vec<Action>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MultisigRequest {
    pub request_id: u64,
    pub receiver_id: String,
    pub actions: Vec<Action>,
    /// Public keys that already confirmed the request
    pub confirmations: BTreeSet<String>,
    pub required_confirmations: u32,
}

impl MultisigRequest {
    pub fn confirmations_left(&self) -> u32 {
        (self.required_confirmations as usize).saturating_sub(self.confirmations.len()) as u32
    }

    pub fn is_confirmed_by(&self, public_key: &str) -> bool {
        self.confirmations.contains(public_key)
    }
}

/// What an action actually does.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Explanation {
    /// Set when the nominal receiver only forwards to somebody else
    pub actual_receiver: Option<String>,
    pub description: String,
    pub action: Action,
    /// Name of the handler that recognised the action
    pub handler: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RequestRow {
    pub request: MultisigRequest,
    pub actual_receiver: String,
    pub explanations: Vec<Explanation>,
}
