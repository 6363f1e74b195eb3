//! Explains what a multisig action does and who actually receives the funds.
//!
//! Every known action pattern is an [`ActionHandler`] in an [`ExplainerRegistry`].
//! Handlers are pure: they recognise an action, describe it and say where its
//! beneficiary comes from. The registry performs the view calls a [`Beneficiary::View`]
//! needs, so handlers can be tested without any RPC.

use tracing::debug;

use super::{Action, Explanation};
use crate::accessor::ContractViewAccessor;
use crate::errors::ExplanationError;
use crate::lockup::{is_lockup_account, Balance};

mod format;
mod handlers;

pub use format::format_near_amount;
pub use handlers::{
    AccessKey, AccountManagement, FungibleTokenTransfer, LockupAdministration,
    LockupSelectStakingPool, LockupStakingPoolOperation, LockupTransfer,
    MultisigConfiguration, MultisigRequestOperation, NativeTransfer, StakingPoolOperation,
    StorageDeposit,
};

/// Handler name of explanations no handler recognised.
pub const GENERIC_HANDLER: &str = "generic";

/// An action together with where it is sent and on behalf of which wallet.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub action: &'a Action,
    pub receiver_id: &'a str,
    pub wallet_id: &'a str,
}

impl<'a> ActionContext<'a> {
    pub fn new(action: &'a Action, receiver_id: &'a str, wallet_id: &'a str) -> Self {
        Self {
            action,
            receiver_id,
            wallet_id,
        }
    }

    pub fn method_name(&self) -> Option<&'a str> {
        self.action.method_name()
    }

    pub fn is_call_to(&self, methods: &[&str]) -> bool {
        matches!(self.method_name(), Some(method_name) if methods.contains(&method_name))
    }

    pub fn is_lockup_receiver(&self) -> bool {
        is_lockup_account(self.receiver_id)
    }

    /// Decoded JSON arguments of a function call
    pub fn args(&self) -> Option<&'a serde_json::Value> {
        match self.action {
            Action::FunctionCall { args, .. } => args.decoded(),
            _ => None,
        }
    }

    pub fn arg_str(&self, field: &str) -> Option<&'a str> {
        self.args()?.get(field)?.as_str()
    }

    /// Balances are passed as decimal strings, small ones sometimes as numbers.
    pub fn arg_balance(&self, field: &str) -> Option<Balance> {
        match self.args()?.get(field)? {
            serde_json::Value::String(value) => value.parse().ok(),
            serde_json::Value::Number(value) => value.as_u64().map(Balance::from),
            _ => None,
        }
    }

    pub fn required_arg(&self, field: &'static str) -> Result<&'a str, ExplanationError> {
        self.arg_str(field)
            .ok_or_else(|| ExplanationError::MalformedArguments {
                receiver_id: self.receiver_id.to_string(),
                method_name: self.method_name().unwrap_or_default().to_string(),
                field,
            })
    }

    pub fn deposit(&self) -> Balance {
        match self.action {
            Action::FunctionCall { deposit, .. } => *deposit,
            _ => 0,
        }
    }
}

/// Where the real beneficiary of an action comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Beneficiary {
    /// The nominal receiver is the beneficiary
    None,
    Account(String),
    /// Has to be read from a contract; the view returns an account id or `null`.
    View {
        account_id: String,
        method_name: &'static str,
        args: serde_json::Value,
    },
}

pub trait ActionHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn recognizes(&self, context: &ActionContext<'_>) -> bool;

    fn beneficiary(&self, _context: &ActionContext<'_>) -> Result<Beneficiary, ExplanationError> {
        Ok(Beneficiary::None)
    }

    fn describe(&self, context: &ActionContext<'_>, actual_receiver: Option<&str>) -> String;
}

/// Ordered handlers, the first one recognising an action explains it.
pub struct ExplainerRegistry {
    handlers: Vec<Box<dyn ActionHandler>>,
}

impl Default for ExplainerRegistry {
    fn default() -> Self {
        Self::empty().with_default_handlers()
    }
}

impl ExplainerRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends the built-in handlers, so handlers added before them take precedence.
    pub fn with_default_handlers(self) -> Self {
        self.with_handler(MultisigRequestOperation)
            .with_handler(LockupTransfer)
            .with_handler(LockupSelectStakingPool)
            .with_handler(LockupStakingPoolOperation)
            .with_handler(LockupAdministration)
            .with_handler(FungibleTokenTransfer)
            .with_handler(StorageDeposit)
            .with_handler(StakingPoolOperation)
            .with_handler(NativeTransfer)
            .with_handler(AccessKey)
            .with_handler(MultisigConfiguration)
            .with_handler(AccountManagement)
    }

    pub fn with_handler(mut self, handler: impl ActionHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn handler_for(&self, context: &ActionContext<'_>) -> Option<&dyn ActionHandler> {
        self.handlers
            .iter()
            .map(|handler| handler.as_ref())
            .find(|handler| handler.recognizes(context))
    }

    pub async fn explain<A>(
        &self,
        action: Action,
        nominal_receiver: &str,
        wallet_id: &str,
        accessor: &A,
    ) -> Result<Explanation, ExplanationError>
    where
        A: ContractViewAccessor + ?Sized,
    {
        let context = ActionContext::new(&action, nominal_receiver, wallet_id);

        let (handler_name, actual_receiver, description) = match self.handler_for(&context) {
            Some(handler) => {
                let actual_receiver =
                    resolve_beneficiary(accessor, handler.beneficiary(&context)?).await?;
                let description = handler.describe(&context, actual_receiver.as_deref());
                (handler.name(), actual_receiver, description)
            }
            None => (GENERIC_HANDLER, None, generic_description(&context)),
        };
        debug!(
            target: crate::ENGINE,
            "Explained action on {} with `{}` handler", nominal_receiver, handler_name
        );

        Ok(Explanation {
            actual_receiver,
            description,
            action,
            handler: handler_name,
        })
    }
}

/// Explains a single action with the default handlers.
pub async fn explain_action<A>(
    action: Action,
    nominal_receiver: &str,
    wallet_id: &str,
    accessor: &A,
) -> Result<Explanation, ExplanationError>
where
    A: ContractViewAccessor + ?Sized,
{
    ExplainerRegistry::default()
        .explain(action, nominal_receiver, wallet_id, accessor)
        .await
}

async fn resolve_beneficiary<A>(
    accessor: &A,
    beneficiary: Beneficiary,
) -> Result<Option<String>, ExplanationError>
where
    A: ContractViewAccessor + ?Sized,
{
    match beneficiary {
        Beneficiary::None => Ok(None),
        Beneficiary::Account(account_id) => Ok(Some(account_id)),
        Beneficiary::View {
            account_id,
            method_name,
            args,
        } => match accessor
            .view_function_call(&account_id, method_name, args)
            .await?
        {
            serde_json::Value::String(beneficiary) => Ok(Some(beneficiary)),
            serde_json::Value::Null => Ok(None),
            value => Err(ExplanationError::UnexpectedBeneficiary {
                account_id,
                method_name: method_name.to_string(),
                value,
            }),
        },
    }
}

fn generic_description(context: &ActionContext<'_>) -> String {
    match context.action {
        Action::FunctionCall { method_name, .. } if context.deposit() > 0 => format!(
            "Call `{}` on {} attaching {} NEAR",
            method_name,
            context.receiver_id,
            format_near_amount(context.deposit())
        ),
        Action::FunctionCall { method_name, .. } => {
            format!("Call `{}` on {}", method_name, context.receiver_id)
        }
        other => format!("{:?} on {}", other, context.receiver_id),
    }
}
