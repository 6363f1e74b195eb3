use std::time::Duration;

use serde_json::json;

use team_wallet_engine::{
    aggregate_request_rows, aggregate_request_rows_with_timeout, explain_action, Action,
    AggregationError, ExplanationError, Wallet,
};

use team_wallet_engine::multisig::aggregate_request_rows_with_registry;
use team_wallet_engine::multisig::explainer::{
    ActionContext, ActionHandler, Beneficiary, ExplainerRegistry,
};

mod common;
use common::{multisig_wallet, MockAccessor};

const LOCKUP: &str = "0123456789abcdef0123456789abcdef01234567.lockup.near";
const NEAR: u128 = 1_000_000_000_000_000_000_000_000;

fn transfer(amount: u128) -> serde_json::Value {
    json!({"type": "Transfer", "amount": amount.to_string()})
}

fn function_call(method_name: &str, args: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "FunctionCall",
        "method_name": method_name,
        "args": base64::encode(args.to_string()),
        "deposit": "0",
        "gas": "100000000000000"
    })
}

#[actix_rt::test]
async fn requests_are_ordered_newest_first() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![
            (3, "bob.near", json!([transfer(NEAR)])),
            (1, "bob.near", json!([transfer(NEAR)])),
            (2, "bob.near", json!([transfer(NEAR)])),
        ],
    );
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let request_ids: Vec<u64> = rows[&wallet].iter().map(|row| row.request.request_id).collect();
    assert_eq!(request_ids, vec![3, 2, 1]);
    let row = &rows[&wallet][0];
    assert_eq!(row.request.required_confirmations, 2);
    assert_eq!(row.request.confirmations_left(), 1);
    assert!(row.request.is_confirmed_by("ed25519:alice"));
    assert_eq!(row.actual_receiver, "bob.near");
    assert_eq!(row.explanations[0].description, "Transfer 1 NEAR to bob.near");
    assert_eq!(row.explanations[0].handler, "native_transfer");
}

/// Request `n` of every wallet answers after `(4 - n) * 20ms`, so the oldest one
/// finishes first.
fn newest_requests_answer_last(accessor: MockAccessor, wallet_id: &str) -> MockAccessor {
    [1u64, 2, 3].iter().fold(accessor, |accessor, request_id| {
        let delay = Duration::from_millis((4 - request_id) * 20);
        accessor
            .with_view_delay(
                wallet_id,
                "get_request",
                json!({ "request_id": request_id }),
                delay,
            )
            .with_view_delay(
                wallet_id,
                "get_confirmations",
                json!({ "request_id": request_id }),
                delay,
            )
    })
}

fn three_requests(accessor: MockAccessor, wallet_id: &str) -> MockAccessor {
    multisig_wallet(
        accessor,
        wallet_id,
        vec![
            (3, "bob.near", json!([transfer(NEAR)])),
            (1, "bob.near", json!([transfer(NEAR)])),
            (2, "bob.near", json!([transfer(NEAR)])),
        ],
    )
}

#[actix_rt::test]
async fn order_does_not_depend_on_which_request_answers_first() {
    let accessor = newest_requests_answer_last(
        three_requests(MockAccessor::default(), "team.near"),
        "team.near",
    );
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let request_ids: Vec<u64> = rows[&wallet].iter().map(|row| row.request.request_id).collect();
    assert_eq!(request_ids, vec![3, 2, 1]);
}

#[actix_rt::test]
async fn every_wallet_keeps_its_own_order() {
    let accessor = three_requests(MockAccessor::default(), "team.near");
    let accessor = three_requests(accessor, "ops.near");
    // Only one wallet is slow, and within it the newest request is the slowest
    let accessor = newest_requests_answer_last(accessor, "ops.near");
    let wallets = vec![Wallet::new("ops.near"), Wallet::new("team.near")];

    let rows = aggregate_request_rows(&accessor, &wallets).await;

    assert_eq!(rows.len(), 2);
    for wallet in &wallets {
        let request_ids: Vec<u64> =
            rows[wallet].iter().map(|row| row.request.request_id).collect();
        assert_eq!(request_ids, vec![3, 2, 1], "wallet {}", wallet.wallet_address);
    }
}

/// Transfers to the team's payroll account actually go to the employees.
struct PayrollTransfer;

impl ActionHandler for PayrollTransfer {
    fn name(&self) -> &'static str {
        "payroll"
    }

    fn recognizes(&self, context: &ActionContext<'_>) -> bool {
        context.receiver_id == "payroll.near" && matches!(context.action, Action::Transfer { .. })
    }

    fn beneficiary(&self, _context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::Account("employees.near".to_string()))
    }

    fn describe(&self, _context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String {
        format!("Pay salaries to {}", actual_receiver.unwrap_or("nobody"))
    }
}

#[actix_rt::test]
async fn registered_handler_goes_before_the_built_in_ones() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![
            (2, "payroll.near", json!([transfer(NEAR)])),
            (1, "bob.near", json!([transfer(NEAR)])),
        ],
    );
    let wallet = Wallet::new("team.near");
    let registry = ExplainerRegistry::empty()
        .with_handler(PayrollTransfer)
        .with_default_handlers();

    let rows = aggregate_request_rows_with_registry(&accessor, &[wallet.clone()], &registry).await;

    let payroll = &rows[&wallet][0];
    assert_eq!(payroll.actual_receiver, "employees.near");
    assert_eq!(payroll.explanations[0].handler, "payroll");
    assert_eq!(payroll.explanations[0].description, "Pay salaries to employees.near");

    let default_rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;
    let plain = &rows[&wallet][1];
    assert_eq!(plain.actual_receiver, "bob.near");
    assert_eq!(plain.explanations, default_rows[&wallet][1].explanations);
}

#[actix_rt::test]
async fn failing_wallet_is_left_out() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(1, "bob.near", json!([transfer(NEAR)]))],
    )
    .with_broken_account("broken.near");
    let wallets = vec![Wallet::new("team.near"), Wallet::new("broken.near")];

    let rows = aggregate_request_rows(&accessor, &wallets).await;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[&wallets[0]].len(), 1);
    assert!(!rows.contains_key(&wallets[1]));
}

#[actix_rt::test]
async fn wallet_without_confirmation_threshold_is_left_out() {
    let accessor = MockAccessor::default().with_view(
        "team.near",
        "list_request_ids",
        json!({}),
        json!([1]),
    );

    let rows = aggregate_request_rows(&accessor, &[Wallet::new("team.near")]).await;

    assert!(rows.is_empty());
}

#[actix_rt::test]
async fn unreadable_request_is_skipped() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![
            (1, "bob.near", json!([transfer(NEAR)])),
            (3, "bob.near", json!([transfer(NEAR)])),
        ],
    )
    // Listed, but neither the request nor its confirmations can be read
    .with_view("team.near", "list_request_ids", json!({}), json!([1, 2, 3]));
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let request_ids: Vec<u64> = rows[&wallet].iter().map(|row| row.request.request_id).collect();
    assert_eq!(request_ids, vec![3, 1]);
}

#[actix_rt::test]
async fn failed_explanation_only_drops_that_action() {
    let broken_transfer = json!({
        "type": "FunctionCall",
        "method_name": "transfer",
        "args": "not base64!",
        "deposit": "0",
        "gas": "1"
    });
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(7, LOCKUP, json!([broken_transfer, transfer(NEAR)]))],
    );
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let row = &rows[&wallet][0];
    assert_eq!(row.request.actions.len(), 2);
    assert_eq!(row.explanations.len(), 1);
    assert_eq!(row.explanations[0].handler, "native_transfer");
    assert_eq!(row.actual_receiver, LOCKUP);
}

#[actix_rt::test]
async fn lockup_transfer_reveals_the_actual_receiver() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(
            1,
            LOCKUP,
            json!([function_call(
                "transfer",
                json!({"amount": (5 * NEAR).to_string(), "receiver_id": "team.near"})
            )]),
        )],
    );
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let row = &rows[&wallet][0];
    assert_eq!(row.actual_receiver, "team.near");
    assert_eq!(
        row.explanations[0].description,
        format!("Withdraw 5 NEAR from lockup {} to team.near", LOCKUP)
    );
    // The decoded arguments replace the base64 payload
    assert_eq!(
        row.request.actions[0].method_name(),
        Some("transfer")
    );
    assert!(matches!(
        &row.request.actions[0],
        Action::FunctionCall { args, .. } if args.decoded().is_some()
    ));
}

#[actix_rt::test]
async fn first_explanation_with_a_receiver_wins() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(
            1,
            "usdt.tether-token.near",
            json!([
                function_call("storage_deposit", json!({})),
                function_call("ft_transfer", json!({"receiver_id": "carol.near", "amount": "100"})),
                function_call("ft_transfer", json!({"receiver_id": "dave.near", "amount": "100"})),
            ]),
        )],
    );
    let wallet = Wallet::new("team.near");

    let rows = aggregate_request_rows(&accessor, &[wallet.clone()]).await;

    let row = &rows[&wallet][0];
    assert_eq!(row.explanations.len(), 3);
    assert_eq!(row.explanations[0].actual_receiver, None);
    assert_eq!(row.actual_receiver, "carol.near");
}

#[actix_rt::test]
async fn staking_through_lockup_resolves_the_selected_pool() {
    let accessor = MockAccessor::default().with_view(
        LOCKUP,
        "get_staking_pool_account_id",
        json!({}),
        json!("pool.poolv1.near"),
    );
    let action: Action = serde_json::from_value(json!({
        "type": "FunctionCall",
        "method_name": "deposit_and_stake",
        "args": {"amount": NEAR.to_string()},
        "deposit": "0",
        "gas": "1"
    }))
    .unwrap();

    let explanation = explain_action(action, LOCKUP, "team.near", &accessor)
        .await
        .unwrap();

    assert_eq!(explanation.actual_receiver.as_deref(), Some("pool.poolv1.near"));
    assert_eq!(explanation.handler, "lockup_staking_pool_operation");
}

#[actix_rt::test]
async fn unreadable_beneficiary_fails_the_explanation() {
    let action: Action = serde_json::from_value(json!({
        "type": "FunctionCall",
        "method_name": "unstake_all",
        "args": {},
        "deposit": "0",
        "gas": "1"
    }))
    .unwrap();

    let result = explain_action(action.clone(), LOCKUP, "team.near", &MockAccessor::default()).await;
    assert!(matches!(result, Err(ExplanationError::Rpc(_))));

    let accessor = MockAccessor::default().with_view(
        LOCKUP,
        "get_staking_pool_account_id",
        json!({}),
        json!(42),
    );
    let result = explain_action(action, LOCKUP, "team.near", &accessor).await;
    assert!(matches!(
        result,
        Err(ExplanationError::UnexpectedBeneficiary { .. })
    ));
}

#[actix_rt::test]
async fn unknown_calls_get_a_generic_explanation() {
    let action: Action = serde_json::from_value(json!({
        "type": "FunctionCall",
        "method_name": "nft_mint",
        "args": {},
        "deposit": "0",
        "gas": "1"
    }))
    .unwrap();

    let explanation = explain_action(action.clone(), "nft.near", "team.near", &MockAccessor::default())
        .await
        .unwrap();

    assert_eq!(explanation.handler, "generic");
    assert_eq!(explanation.actual_receiver, None);
    assert_eq!(explanation.description, "Call `nft_mint` on nft.near");
    assert_eq!(explanation.action, action);
}

#[actix_rt::test]
async fn slow_views_time_out() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(1, "bob.near", json!([transfer(NEAR)]))],
    )
    .with_delay(Duration::from_secs(5));

    let result = aggregate_request_rows_with_timeout(
        &accessor,
        &[Wallet::new("team.near")],
        Duration::from_millis(20),
    )
    .await;

    assert_eq!(
        result.unwrap_err(),
        AggregationError::Timeout(Duration::from_millis(20))
    );
}

#[actix_rt::test]
async fn fast_views_finish_before_the_timeout() {
    let accessor = multisig_wallet(
        MockAccessor::default(),
        "team.near",
        vec![(1, "bob.near", json!([transfer(NEAR)]))],
    );

    let rows = aggregate_request_rows_with_timeout(
        &accessor,
        &[Wallet::new("team.near")],
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(rows[&Wallet::new("team.near")].len(), 1);
}
