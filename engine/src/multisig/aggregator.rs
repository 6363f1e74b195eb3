use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use super::explainer::ExplainerRegistry;
use super::{decode_function_call_args, MultisigRequest, RequestRow, Wallet};
use crate::accessor::ContractViewAccessor;
use crate::errors::{AggregationError, RpcError};

/// Collects the pending requests of every wallet, newest first, with explained actions.
///
/// A wallet whose request list or confirmation threshold can't be read is left out of
/// the result. Failures of a single request or explanation only drop that request
/// or explanation.
pub async fn aggregate_request_rows<A>(
    accessor: &A,
    wallets: &[Wallet],
) -> BTreeMap<Wallet, Vec<RequestRow>>
where
    A: ContractViewAccessor + ?Sized,
{
    aggregate_request_rows_with_registry(accessor, wallets, &ExplainerRegistry::default()).await
}

pub async fn aggregate_request_rows_with_registry<A>(
    accessor: &A,
    wallets: &[Wallet],
    registry: &ExplainerRegistry,
) -> BTreeMap<Wallet, Vec<RequestRow>>
where
    A: ContractViewAccessor + ?Sized,
{
    let wallet_futures = wallets
        .iter()
        .map(|wallet| wallet_request_rows(accessor, wallet, registry));

    join_all(wallet_futures)
        .await
        .into_iter()
        .zip(wallets)
        .filter_map(|(rows, wallet)| match rows {
            Ok(rows) => Some((wallet.clone(), rows)),
            Err(err) => {
                warn!(
                    target: crate::ENGINE,
                    "Skipping requests of wallet {}: {}", wallet.wallet_address, err
                );
                None
            }
        })
        .collect()
}

/// Same as [`aggregate_request_rows`], abandoning the outstanding views after `timeout`.
pub async fn aggregate_request_rows_with_timeout<A>(
    accessor: &A,
    wallets: &[Wallet],
    timeout: Duration,
) -> Result<BTreeMap<Wallet, Vec<RequestRow>>, AggregationError>
where
    A: ContractViewAccessor + ?Sized,
{
    tokio::time::timeout(timeout, aggregate_request_rows(accessor, wallets))
        .await
        .map_err(|_| AggregationError::Timeout(timeout))
}

async fn wallet_request_rows<A>(
    accessor: &A,
    wallet: &Wallet,
    registry: &ExplainerRegistry,
) -> Result<Vec<RequestRow>, RpcError>
where
    A: ContractViewAccessor + ?Sized,
{
    let wallet_id = wallet.wallet_address.as_str();
    let mut request_ids = accessor.list_request_ids(wallet_id).await?;
    let required_confirmations = accessor.get_num_confirmations(wallet_id).await?;
    request_ids.sort_unstable_by(|a, b| b.cmp(a));
    debug!(
        target: crate::ENGINE,
        "Wallet {} has {} pending requests", wallet_id, request_ids.len()
    );

    let requests = join_all(
        request_ids
            .iter()
            .map(|request_id| fetch_request(accessor, wallet_id, *request_id, required_confirmations)),
    )
    .await;

    let mut rows = Vec::with_capacity(requests.len());
    for (request_id, request) in request_ids.iter().zip(requests) {
        match request {
            Ok(request) => rows.push(explain_request(accessor, wallet_id, request, registry).await),
            Err(err) => warn!(
                target: crate::ENGINE,
                "Skipping request #{} of {}: {}", request_id, wallet_id, err
            ),
        }
    }
    Ok(rows)
}

async fn fetch_request<A>(
    accessor: &A,
    wallet_id: &str,
    request_id: u64,
    required_confirmations: u32,
) -> Result<MultisigRequest, RpcError>
where
    A: ContractViewAccessor + ?Sized,
{
    let (body, confirmations) = futures::try_join!(
        accessor.get_request(wallet_id, request_id),
        accessor.get_confirmations(wallet_id, request_id),
    )?;

    Ok(MultisigRequest {
        request_id,
        receiver_id: body.receiver_id,
        actions: body
            .actions
            .into_iter()
            .map(decode_function_call_args)
            .collect(),
        confirmations: confirmations.into_iter().collect(),
        required_confirmations,
    })
}

async fn explain_request<A>(
    accessor: &A,
    wallet_id: &str,
    request: MultisigRequest,
    registry: &ExplainerRegistry,
) -> RequestRow
where
    A: ContractViewAccessor + ?Sized,
{
    let mut explanations = Vec::with_capacity(request.actions.len());
    for action in &request.actions {
        match registry
            .explain(action.clone(), &request.receiver_id, wallet_id, accessor)
            .await
        {
            Ok(explanation) => explanations.push(explanation),
            Err(err) => warn!(
                target: crate::ENGINE,
                "Unable to explain an action of request #{} of {}: {}",
                request.request_id,
                wallet_id,
                err
            ),
        }
    }

    let actual_receiver = explanations
        .iter()
        .find_map(|explanation| explanation.actual_receiver.clone())
        .unwrap_or_else(|| request.receiver_id.clone());

    RequestRow {
        request,
        actual_receiver,
        explanations,
    }
}
