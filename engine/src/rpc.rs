use async_trait::async_trait;
use borsh::BorshDeserialize;
use tracing::debug;

use near_jsonrpc_client::{methods, JsonRpcClient};
use near_jsonrpc_primitives::types::query::QueryResponseKind;
use near_primitives::types::{AccountId, BlockId, BlockReference, Finality, FunctionArgs};
use near_primitives::views::{AccessKeyPermissionView, QueryRequest};

use crate::accessor::{AccessKeyInfo, AccessKeyPermission, ContractViewAccessor};
use crate::errors::RpcError;
use crate::lockup::contract::{is_broken_timestamp_contract, LockupContract};
use crate::lockup::LockupState;

/// Contract views served by a NEAR JSON-RPC node, all read at the same block reference.
#[derive(Clone)]
pub struct JsonRpcAccessor {
    client: JsonRpcClient,
    block_reference: BlockReference,
}

impl JsonRpcAccessor {
    pub fn new(client: JsonRpcClient) -> Self {
        Self {
            client,
            block_reference: BlockReference::Finality(Finality::Final),
        }
    }

    pub fn connect(rpc_url: &str) -> Self {
        Self::new(JsonRpcClient::connect(rpc_url))
    }

    pub fn at_block_height(mut self, block_height: u64) -> Self {
        self.block_reference = BlockReference::BlockId(BlockId::Height(block_height));
        self
    }

    async fn query(
        &self,
        block_reference: BlockReference,
        request: QueryRequest,
        request_name: &'static str,
        account_id: &str,
    ) -> Result<QueryResponseKind, RpcError> {
        let query = methods::query::RpcQueryRequest {
            block_reference,
            request,
        };
        self.client
            .call(query)
            .await
            .map(|response| response.kind)
            .map_err(|err| RpcError::Transport {
                request: request_name,
                account_id: account_id.to_string(),
                message: err.to_string(),
            })
    }

    /// Height and timestamp of the block the accessor reads at
    async fn block(&self, account_id: &str) -> Result<(u64, u64), RpcError> {
        let request = methods::block::RpcBlockRequest {
            block_reference: self.block_reference.clone(),
        };
        let block = self
            .client
            .call(request)
            .await
            .map_err(|err| RpcError::Transport {
                request: "Block",
                account_id: account_id.to_string(),
                message: err.to_string(),
            })?;
        Ok((block.header.height, block.header.timestamp))
    }
}

fn parse_account_id(account_id: &str) -> Result<AccountId, RpcError> {
    account_id
        .parse()
        .map_err(|_| RpcError::InvalidAccountId(account_id.to_string()))
}

#[async_trait]
impl ContractViewAccessor for JsonRpcAccessor {
    async fn view_function_call(
        &self,
        account_id: &str,
        method_name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = QueryRequest::CallFunction {
            account_id: parse_account_id(account_id)?,
            method_name: method_name.to_string(),
            args: FunctionArgs::from(args.to_string().into_bytes()),
        };
        let call_result = match self
            .query(self.block_reference.clone(), request, "CallFunction", account_id)
            .await?
        {
            QueryResponseKind::CallResult(call_result) => call_result,
            _ => {
                return Err(RpcError::UnexpectedResponse {
                    expected: "CallResult",
                    account_id: account_id.to_string(),
                })
            }
        };
        serde_json::from_slice(&call_result.result).map_err(|source| RpcError::Deserialize {
            account_id: account_id.to_string(),
            method_name: method_name.to_string(),
            source,
        })
    }

    async fn get_lockup_contract_state(
        &self,
        lockup_account_id: &str,
    ) -> Result<LockupState, RpcError> {
        let account_id = parse_account_id(lockup_account_id)?;
        // State and code hash have to come from the block the timestamp belongs to
        let (block_height, block_timestamp) = self.block(lockup_account_id).await?;
        let block_reference = BlockReference::BlockId(BlockId::Height(block_height));
        debug!(
            target: crate::ENGINE,
            "Reading lockup {} at block {}", lockup_account_id, block_height
        );

        let view_state = match self
            .query(
                block_reference.clone(),
                QueryRequest::ViewState {
                    account_id: account_id.clone(),
                    prefix: vec![].into(),
                    include_proof: false,
                },
                "ViewState",
                lockup_account_id,
            )
            .await?
        {
            QueryResponseKind::ViewState(view_state) => view_state,
            _ => {
                return Err(RpcError::UnexpectedResponse {
                    expected: "ViewState",
                    account_id: lockup_account_id.to_string(),
                })
            }
        };
        let encoded_state = view_state
            .values
            .first()
            .ok_or_else(|| RpcError::MissingState(lockup_account_id.to_string()))?;
        let contract =
            LockupContract::try_from_slice(&encoded_state.value).map_err(|source| {
                RpcError::Borsh {
                    account_id: lockup_account_id.to_string(),
                    source,
                }
            })?;

        let code_hash = match self
            .query(
                block_reference,
                QueryRequest::ViewAccount { account_id },
                "ViewAccount",
                lockup_account_id,
            )
            .await?
        {
            QueryResponseKind::ViewAccount(account) => account.code_hash.to_string(),
            _ => {
                return Err(RpcError::UnexpectedResponse {
                    expected: "ViewAccount",
                    account_id: lockup_account_id.to_string(),
                })
            }
        };
        let has_broken_timestamp = is_broken_timestamp_contract(&code_hash, lockup_account_id)?;

        Ok(contract.into_lockup_state(block_timestamp, has_broken_timestamp))
    }

    async fn view_access_key_list(&self, account_id: &str) -> Result<Vec<AccessKeyInfo>, RpcError> {
        let request = QueryRequest::ViewAccessKeyList {
            account_id: parse_account_id(account_id)?,
        };
        let access_key_list = match self
            .query(
                self.block_reference.clone(),
                request,
                "ViewAccessKeyList",
                account_id,
            )
            .await?
        {
            QueryResponseKind::AccessKeyList(access_key_list) => access_key_list,
            _ => {
                return Err(RpcError::UnexpectedResponse {
                    expected: "AccessKeyList",
                    account_id: account_id.to_string(),
                })
            }
        };

        Ok(access_key_list
            .keys
            .into_iter()
            .map(|key| AccessKeyInfo {
                public_key: key.public_key.to_string(),
                permission: key.access_key.permission.into(),
            })
            .collect())
    }
}

impl From<AccessKeyPermissionView> for AccessKeyPermission {
    fn from(permission: AccessKeyPermissionView) -> Self {
        match permission {
            AccessKeyPermissionView::FunctionCall {
                allowance,
                receiver_id,
                method_names,
            } => Self::FunctionCall {
                allowance,
                receiver_id,
                method_names,
            },
            AccessKeyPermissionView::FullAccess => Self::FullAccess,
        }
    }
}
