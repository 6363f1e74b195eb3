use tracing::debug;

use super::{Action, FunctionCallArgs};
use crate::errors::DecodeFailure;

/// Decodes base64 JSON arguments of a `FunctionCall`.
///
/// Arguments that are not base64 encoded UTF-8 JSON are left as they are, consumers
/// have to deal with undecoded payloads anyway.
pub fn decode_function_call_args(action: Action) -> Action {
    match action {
        Action::FunctionCall {
            method_name,
            args: FunctionCallArgs::Encoded(encoded),
            deposit,
            gas,
        } => {
            let args = match decode_args(&encoded) {
                Ok(decoded) => FunctionCallArgs::Decoded(decoded),
                Err(err) => {
                    debug!(
                        target: crate::ENGINE,
                        "Leaving `{}` arguments undecoded: {}", method_name, err
                    );
                    FunctionCallArgs::Encoded(encoded)
                }
            };
            Action::FunctionCall {
                method_name,
                args,
                deposit,
                gas,
            }
        }
        other => other,
    }
}

/// Padding is optional and the URL-safe alphabet is accepted too, wallets differ here.
fn decode_args(encoded: &str) -> Result<serde_json::Value, DecodeFailure> {
    let bytes = base64::decode(encoded)
        .or_else(|_| base64::decode_config(encoded, base64::URL_SAFE))?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn function_call(args: &str) -> Action {
        Action::FunctionCall {
            method_name: "transfer".to_string(),
            args: FunctionCallArgs::Encoded(args.to_string()),
            deposit: 0,
            gas: 50_000_000_000_000,
        }
    }

    #[test]
    fn json_arguments_are_decoded() {
        let encoded = base64::encode(r#"{"amount":"10","receiver_id":"bob.near"}"#);
        let decoded = decode_function_call_args(function_call(&encoded));
        assert_eq!(
            decoded,
            Action::FunctionCall {
                method_name: "transfer".to_string(),
                args: FunctionCallArgs::Decoded(json!({"amount": "10", "receiver_id": "bob.near"})),
                deposit: 0,
                gas: 50_000_000_000_000,
            }
        );
    }

    #[test]
    fn unpadded_and_url_safe_arguments_are_decoded() {
        assert_eq!(decode_args("eyJhIjoxfQ").unwrap(), json!({"a": 1}));
        assert_eq!(decode_args("eyJhIjoxfQ==").unwrap(), json!({"a": 1}));
        assert_eq!(
            decode_args("eyJtZW1vIjoiPz8_Pj4-In0").unwrap(),
            json!({"memo": "???>>>"})
        );
        assert_eq!(
            decode_args("eyJtZW1vIjoiPz8_Pj4-In0=").unwrap(),
            json!({"memo": "???>>>"})
        );
    }

    #[test]
    fn invalid_base64_is_kept_verbatim() {
        let action = function_call("not base64!");
        assert_eq!(decode_function_call_args(action.clone()), action);
    }

    #[test]
    fn non_json_payload_is_kept_verbatim() {
        let action = function_call(&base64::encode("plain text"));
        assert_eq!(decode_function_call_args(action.clone()), action);

        let action = function_call(&base64::encode([0xff, 0xfe, 0x00]));
        assert_eq!(decode_function_call_args(action.clone()), action);
    }

    #[test]
    fn other_actions_pass_through() {
        let transfer = Action::Transfer { amount: 5 };
        assert_eq!(decode_function_call_args(transfer.clone()), transfer);

        let decoded = Action::FunctionCall {
            method_name: "confirm".to_string(),
            args: FunctionCallArgs::Decoded(json!({"request_id": 1})),
            deposit: 0,
            gas: 1,
        };
        assert_eq!(decode_function_call_args(decoded.clone()), decoded);
    }
}
