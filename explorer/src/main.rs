use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use team_wallet_engine::lockup::view_account_lockup;
use team_wallet_engine::{
    aggregate_request_rows_with_timeout, decode_function_call_args, discover_multisig_accounts,
    explain_action, usable_keys_for_signing, Action, Wallet,
};

use crate::configs::{Command, Opts};

mod configs;

// Category for logging
const TEAM_WALLET_EXPLORER: &str = "team_wallet_explorer";

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize the result")?
    );
    Ok(())
}

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // We use it to automatically search the for root certificates to perform HTTPS calls
    openssl_probe::init_ssl_cert_env_vars();

    dotenv::dotenv().ok();

    let opts: Opts = Opts::parse();

    configs::init_tracing(opts.debug)?;

    let accessor = opts.to_accessor()?;
    info!(
        target: TEAM_WALLET_EXPLORER,
        "Reading contract state from {}", opts.rpc_url()
    );

    match opts.command() {
        Command::Lockup { account_id } => {
            let lockup = view_account_lockup(&accessor, account_id, &opts.lockup_master())
                .await
                .with_context(|| format!("Unable to read the lockup of {}", account_id))?;
            if lockup.is_private_schedule() {
                warn!(
                    target: TEAM_WALLET_EXPLORER,
                    "Lockup {} has a private vesting schedule, unvested tokens are not counted",
                    lockup.lockup_account_id
                );
            }
            print_json(&lockup)
        }
        Command::Requests { wallets } => {
            let wallets: Vec<Wallet> = wallets.iter().map(Wallet::new).collect();
            let rows = aggregate_request_rows_with_timeout(&accessor, &wallets, opts.timeout())
                .await?;
            info!(
                target: TEAM_WALLET_EXPLORER,
                "Collected requests of {} out of {} wallets",
                rows.len(),
                wallets.len()
            );
            print_json(&rows)
        }
        Command::Explain {
            wallet_id,
            receiver_id,
            action,
        } => {
            let action: Action = serde_json::from_str(action)
                .with_context(|| format!("Unable to parse action {}", action))?;
            let explanation = explain_action(
                decode_function_call_args(action),
                receiver_id,
                wallet_id,
                &accessor,
            )
            .await
            .with_context(|| format!("Unable to explain the action on {}", receiver_id))?;
            print_json(&explanation)
        }
        Command::UsableKeys {
            multisig_account_id,
            request_id,
            local_keys,
        } => {
            let keys =
                usable_keys_for_signing(&accessor, multisig_account_id, *request_id, local_keys)
                    .await
                    .with_context(|| {
                        format!("Unable to read access keys of {}", multisig_account_id)
                    })?;
            print_json(&keys)
        }
        Command::DiscoverMultisig { account_ids } => {
            print_json(&discover_multisig_accounts(&accessor, account_ids).await)
        }
    }
}
