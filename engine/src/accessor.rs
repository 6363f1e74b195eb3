use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use near_primitives::serialize::dec_format;

use crate::errors::RpcError;
use crate::lockup::LockupState;
use crate::multisig::RequestBody;

/// Read-only contract views the engine is built on.
///
/// Only `view_function_call`, `get_lockup_contract_state` and `view_access_key_list`
/// have to be implemented, the multisig views are calls to the multisig contract methods.
#[async_trait]
pub trait ContractViewAccessor: Send + Sync {
    /// Calls a view method of `account_id` with JSON `args` and returns its JSON result.
    async fn view_function_call(
        &self,
        account_id: &str,
        method_name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;

    async fn get_lockup_contract_state(
        &self,
        lockup_account_id: &str,
    ) -> Result<LockupState, RpcError>;

    async fn view_access_key_list(&self, account_id: &str) -> Result<Vec<AccessKeyInfo>, RpcError>;

    /// Fails if the account does not implement the multisig interface.
    async fn list_request_ids(&self, wallet_id: &str) -> Result<Vec<u64>, RpcError> {
        view_as(self, wallet_id, "list_request_ids", json!({})).await
    }

    async fn get_num_confirmations(&self, wallet_id: &str) -> Result<u32, RpcError> {
        view_as(self, wallet_id, "get_num_confirmations", json!({})).await
    }

    async fn get_request(&self, wallet_id: &str, request_id: u64) -> Result<RequestBody, RpcError> {
        view_as(
            self,
            wallet_id,
            "get_request",
            json!({ "request_id": request_id }),
        )
        .await
    }

    async fn get_confirmations(
        &self,
        wallet_id: &str,
        request_id: u64,
    ) -> Result<Vec<String>, RpcError> {
        view_as(
            self,
            wallet_id,
            "get_confirmations",
            json!({ "request_id": request_id }),
        )
        .await
    }
}

async fn view_as<A, T>(
    accessor: &A,
    account_id: &str,
    method_name: &str,
    args: serde_json::Value,
) -> Result<T, RpcError>
where
    A: ContractViewAccessor + ?Sized,
    T: DeserializeOwned,
{
    let value = accessor
        .view_function_call(account_id, method_name, args)
        .await?;
    serde_json::from_value(value).map_err(|source| RpcError::Deserialize {
        account_id: account_id.to_string(),
        method_name: method_name.to_string(),
        source,
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyInfo {
    pub public_key: String,
    pub permission: AccessKeyPermission,
}

/// We want to expose the permission more explicitly than nearcore does
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(
    tag = "permission_kind",
    content = "permission_details",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum AccessKeyPermission {
    FunctionCall {
        #[serde(default, with = "dec_format")]
        allowance: Option<u128>,
        receiver_id: String,
        method_names: Vec<String>,
    },
    FullAccess,
}
