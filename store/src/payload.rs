//! Turns the result of a query into the JSON sent back to whoever asked.

use serde::Serialize;
use serde_json::{json, Value};

use crate::Result;

pub struct Payload {
    pub body: Value,
    pub is_error: bool,
}

/// A failure becomes `{"error": message}` and nothing else. If a successful value can't be
/// serialized, that is reported as its own error instead of a partial payload.
pub fn render<T: Serialize>(result: Result<T>) -> Payload {
    match result {
        Ok(value) => match serde_json::to_value(&value) {
            Ok(body) => Payload {
                body,
                is_error: false,
            },
            Err(err) => {
                error!("Error serializing data: {err}");
                Payload {
                    body: error_body(format!("Data serialization error: {err}")),
                    is_error: true,
                }
            }
        },
        Err(err) => {
            if err.is_empty_result() {
                info!("{err}");
            } else {
                error!("{err}");
            }
            Payload {
                body: error_body(err.to_string()),
                is_error: true,
            }
        }
    }
}

pub fn error_body(message: String) -> Value {
    json!({ "error": message })
}
