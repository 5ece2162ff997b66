use serde::Deserialize;

use crate::error::{ConsoleError, ConsoleResult};

/// Standard response envelope used by every non-streaming endpoint.
///
/// The backend reports failures in-band as `success: false` with a message;
/// the HTTP status is usually still 200. `data` may be absent on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "none")]
    pub data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope, mapping `success: false` to [`ConsoleError::Api`].
    pub fn into_result(self) -> ConsoleResult<T> {
        if !self.success {
            return Err(ConsoleError::Api {
                message: self.message,
            });
        }
        self.data.ok_or(ConsoleError::Api {
            message: "response missing data".to_string(),
        })
    }

    /// Like [`into_result`](Self::into_result) for endpoints that may omit
    /// `data` on success (mutations that only acknowledge).
    pub fn into_ack(self) -> ConsoleResult<()> {
        if !self.success {
            return Err(ConsoleError::Api {
                message: self.message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_unwraps_data() {
        let env: ApiEnvelope<Vec<String>> =
            serde_json::from_str(r#"{"success":true,"data":["a","b"]}"#)
                .unwrap();
        assert_eq!(env.into_result().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn failure_envelope_carries_message() {
        let env: ApiEnvelope<Vec<String>> = serde_json::from_str(
            r#"{"success":false,"message":"no such user"}"#,
        )
        .unwrap();
        match env.into_result() {
            Err(ConsoleError::Api { message }) => {
                assert_eq!(message, "no such user")
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn ack_tolerates_missing_data() {
        let env: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.into_ack().is_ok());
    }
}
