use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use near_jsonrpc_client::JsonRpcClient;
use team_wallet_engine::JsonRpcAccessor;

/// Team Wallet Explorer
/// Derives lockup balances and explained multisig requests
/// from the contract state of a NEAR network
#[derive(Parser, Debug)]
#[clap(
    version,
    author,
    about,
    disable_help_subcommand(true),
    propagate_version(true),
    next_line_help(true)
)]
pub(crate) struct Opts {
    /// Enables debug level of logs for the explorer and the engine
    #[clap(long)]
    pub debug: bool,
    /// JSON RPC endpoint of the custom network
    #[clap(long, env, default_value = "")]
    pub rpc_url: String,
    /// Read the contract state at this block instead of the final one
    #[clap(long)]
    pub block_height: Option<u64>,
    /// Account that creates lockups, derived from the chain id if omitted
    #[clap(long, env)]
    pub lockup_master: Option<String>,
    /// Gives up aggregating multisig requests after this many seconds
    #[clap(long, default_value_t = 30)]
    pub timeout_secs: u64,
    /// Chain ID: testnet or mainnet
    #[clap(subcommand)]
    pub chain_id: ChainId,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ChainId {
    #[clap(subcommand)]
    Mainnet(Command),
    #[clap(subcommand)]
    Testnet(Command),
    #[clap(subcommand)]
    Custom(Command),
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Locked and liquid amounts of the lockup owned by (or being) the account
    Lockup { account_id: String },
    /// Pending requests of the multisig wallets, newest first
    Requests {
        #[clap(required = true)]
        wallets: Vec<String>,
    },
    /// Explains a single multisig action given as JSON
    Explain {
        wallet_id: String,
        receiver_id: String,
        action: String,
    },
    /// Local keys that can still confirm the request
    UsableKeys {
        multisig_account_id: String,
        request_id: u64,
        #[clap(long = "local-key")]
        local_keys: Vec<String>,
    },
    /// Keeps the accounts that implement the multisig contract
    DiscoverMultisig {
        #[clap(required = true)]
        account_ids: Vec<String>,
    },
}

impl Opts {
    /// Returns [Command] for current [Opts]
    pub fn command(&self) -> &Command {
        match &self.chain_id {
            ChainId::Mainnet(command) | ChainId::Testnet(command) | ChainId::Custom(command) => {
                command
            }
        }
    }

    pub fn rpc_url(&self) -> String {
        match self.chain_id {
            ChainId::Mainnet(_) => "https://rpc.mainnet.near.org".to_string(),
            ChainId::Testnet(_) => "https://rpc.testnet.near.org".to_string(),
            ChainId::Custom(_) => self.rpc_url.clone(),
        }
    }

    pub fn lockup_master(&self) -> String {
        if let Some(lockup_master) = &self.lockup_master {
            return lockup_master.clone();
        }
        match self.chain_id {
            ChainId::Testnet(_) => "lockup.testnet".to_string(),
            ChainId::Mainnet(_) | ChainId::Custom(_) => {
                team_wallet_engine::lockup::MAINNET_LOCKUP_MASTER.to_string()
            }
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn to_accessor(&self) -> anyhow::Result<JsonRpcAccessor> {
        let rpc_url = self.rpc_url();
        if rpc_url.is_empty() {
            anyhow::bail!("--rpc-url is required for the custom network");
        }
        let accessor = JsonRpcAccessor::new(JsonRpcClient::connect(rpc_url));
        Ok(match self.block_height {
            Some(block_height) => accessor.at_block_height(block_height),
            None => accessor,
        })
    }
}

pub(crate) fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let mut env_filter = EnvFilter::new("team_wallet_explorer=info,team_wallet_engine=info");

    if debug {
        env_filter = env_filter
            .add_directive("team_wallet_explorer=debug".parse()?)
            .add_directive("team_wallet_engine=debug".parse()?);
    }

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            for directive in rust_log.split(',').filter_map(|s| match s.parse() {
                Ok(directive) => Some(directive),
                Err(err) => {
                    eprintln!("Ignoring directive `{}`: {}", s, err);
                    None
                }
            }) {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if std::env::var("ENABLE_JSON_LOGS").is_ok() {
        subscriber.json().init();
    } else {
        subscriber.compact().init();
    }

    Ok(())
}
