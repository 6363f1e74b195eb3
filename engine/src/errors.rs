use thiserror::Error;

/// Fatal to a single lockup computation. Never defaulted away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockupError {
    #[error("Vesting schedule is invalid: {0}")]
    MalformedSchedule(String),
    #[error("Unable to recognise the version of lockup contract {account_id}, code hash {code_hash}")]
    UnknownContractVersion {
        account_id: String,
        code_hash: String,
    },
}

/// A failed contract view. Callers skip the unit of work it belongs to.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Failed to deliver {request} for {account_id}: {message}")]
    Transport {
        request: &'static str,
        account_id: String,
        message: String,
    },
    #[error("Failed to extract {expected} response for {account_id}")]
    UnexpectedResponse {
        expected: &'static str,
        account_id: String,
    },
    #[error("Failed to decode `{method_name}` result of {account_id}: {source}")]
    Deserialize {
        account_id: String,
        method_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to construct LockupContract for {account_id}: {source}")]
    Borsh {
        account_id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` is not a valid account id")]
    InvalidAccountId(String),
    #[error("Encoded lockup contract is missing for {0}")]
    MissingState(String),
    #[error(transparent)]
    Lockup(#[from] LockupError),
}

#[derive(Error, Debug)]
pub enum ExplanationError {
    #[error("Failed to resolve beneficiary: {0}")]
    Rpc(#[from] RpcError),
    #[error("`{method_name}` on {receiver_id} has malformed arguments: missing `{field}`")]
    MalformedArguments {
        receiver_id: String,
        method_name: String,
        field: &'static str,
    },
    #[error("`{method_name}` on {account_id} returned {value} instead of an account id")]
    UnexpectedBeneficiary {
        account_id: String,
        method_name: String,
        value: serde_json::Value,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Aggregating multisig requests timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Why function call arguments stayed undecoded. Never surfaced to callers.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("arguments are not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("arguments are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("arguments are not JSON: {0}")]
    Json(#[from] serde_json::Error),
}
