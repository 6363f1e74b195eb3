use futures::future::join_all;
use tracing::warn;

use crate::accessor::{AccessKeyInfo, ContractViewAccessor};
use crate::errors::RpcError;

/// Access keys of `multisig_account_id` held locally that haven't confirmed the request yet.
///
/// Unreadable confirmations mean no key can be offered for signing.
pub async fn usable_keys_for_signing<A>(
    accessor: &A,
    multisig_account_id: &str,
    request_id: u64,
    local_public_keys: &[String],
) -> Result<Vec<AccessKeyInfo>, RpcError>
where
    A: ContractViewAccessor + ?Sized,
{
    let confirmations = match accessor
        .get_confirmations(multisig_account_id, request_id)
        .await
    {
        Ok(confirmations) => confirmations,
        Err(err) => {
            warn!(
                target: crate::ENGINE,
                "Unable to read confirmations of request #{} of {}: {}",
                request_id,
                multisig_account_id,
                err
            );
            return Ok(vec![]);
        }
    };

    let access_keys = accessor.view_access_key_list(multisig_account_id).await?;
    Ok(access_keys
        .into_iter()
        .filter(|key| !confirmations.contains(&key.public_key))
        .filter(|key| local_public_keys.contains(&key.public_key))
        .collect())
}

/// Candidates that answer the multisig `list_request_ids` view, in the given order.
pub async fn discover_multisig_accounts<A>(accessor: &A, candidate_account_ids: &[String]) -> Vec<String>
where
    A: ContractViewAccessor + ?Sized,
{
    let responses = join_all(
        candidate_account_ids
            .iter()
            .map(|account_id| accessor.list_request_ids(account_id)),
    )
    .await;

    candidate_account_ids
        .iter()
        .zip(responses)
        .filter(|(_, response)| response.is_ok())
        .map(|(account_id, _)| account_id.clone())
        .collect()
}
