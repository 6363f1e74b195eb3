#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use team_wallet_engine::{AccessKeyInfo, ContractViewAccessor, LockupState, RpcError};

/// In-memory contract views keyed by account, method and JSON arguments.
#[derive(Default)]
pub struct MockAccessor {
    views: HashMap<(String, String, String), Value>,
    broken_accounts: HashSet<String>,
    lockups: HashMap<String, LockupState>,
    access_keys: HashMap<String, Vec<AccessKeyInfo>>,
    delay: Option<Duration>,
    view_delays: HashMap<(String, String, String), Duration>,
}

impl MockAccessor {
    pub fn with_view(mut self, account_id: &str, method_name: &str, args: Value, result: Value) -> Self {
        self.views.insert(
            (account_id.to_string(), method_name.to_string(), args.to_string()),
            result,
        );
        self
    }

    /// Every view of `account_id` fails
    pub fn with_broken_account(mut self, account_id: &str) -> Self {
        self.broken_accounts.insert(account_id.to_string());
        self
    }

    pub fn with_lockup(mut self, lockup_account_id: &str, state: LockupState) -> Self {
        self.lockups.insert(lockup_account_id.to_string(), state);
        self
    }

    pub fn with_access_keys(mut self, account_id: &str, keys: Vec<AccessKeyInfo>) -> Self {
        self.access_keys.insert(account_id.to_string(), keys);
        self
    }

    /// Only the given view answers after `delay`
    pub fn with_view_delay(
        mut self,
        account_id: &str,
        method_name: &str,
        args: Value,
        delay: Duration,
    ) -> Self {
        self.view_delays.insert(
            (account_id.to_string(), method_name.to_string(), args.to_string()),
            delay,
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn unavailable(request: &'static str, account_id: &str) -> RpcError {
        RpcError::Transport {
            request,
            account_id: account_id.to_string(),
            message: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ContractViewAccessor for MockAccessor {
    async fn view_function_call(
        &self,
        account_id: &str,
        method_name: &str,
        args: Value,
    ) -> Result<Value, RpcError> {
        let key = (account_id.to_string(), method_name.to_string(), args.to_string());
        if let Some(delay) = self.delay.or_else(|| self.view_delays.get(&key).copied()) {
            tokio::time::sleep(delay).await;
        }
        if self.broken_accounts.contains(account_id) {
            return Err(Self::unavailable("CallFunction", account_id));
        }
        self.views
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::unavailable("CallFunction", account_id))
    }

    async fn get_lockup_contract_state(&self, lockup_account_id: &str) -> Result<LockupState, RpcError> {
        self.lockups
            .get(lockup_account_id)
            .cloned()
            .ok_or_else(|| Self::unavailable("ViewState", lockup_account_id))
    }

    async fn view_access_key_list(&self, account_id: &str) -> Result<Vec<AccessKeyInfo>, RpcError> {
        self.access_keys
            .get(account_id)
            .cloned()
            .ok_or_else(|| Self::unavailable("ViewAccessKeyList", account_id))
    }
}

/// A multisig wallet with the given requests, each `(request_id, receiver_id, actions)`.
pub fn multisig_wallet(
    accessor: MockAccessor,
    wallet_id: &str,
    requests: Vec<(u64, &str, Value)>,
) -> MockAccessor {
    let request_ids: Vec<u64> = requests.iter().map(|(request_id, _, _)| *request_id).collect();
    let accessor = accessor
        .with_view(wallet_id, "list_request_ids", serde_json::json!({}), serde_json::json!(request_ids))
        .with_view(wallet_id, "get_num_confirmations", serde_json::json!({}), serde_json::json!(2));
    requests
        .into_iter()
        .fold(accessor, |accessor, (request_id, receiver_id, actions)| {
            let args = serde_json::json!({ "request_id": request_id });
            accessor
                .with_view(
                    wallet_id,
                    "get_request",
                    args.clone(),
                    serde_json::json!({ "receiver_id": receiver_id, "actions": actions }),
                )
                .with_view(wallet_id, "get_confirmations", args, serde_json::json!(["ed25519:alice"]))
        })
}
