//! Key/value configuration options.
//!
//! Thin service over `GET`/`PUT /api/option/` with local validation:
//! writes that would obviously be rejected (bad hex colors) never reach
//! the network.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::GatewayClient;
use crate::error::{ConsoleError, ConsoleResult};

/// One option row as the backend stores it. Values are strings regardless
/// of their logical type; booleans are `"true"` / `"false"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionEntry {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Reads and writes backend configuration options.
pub struct OptionsService {
    client: Arc<GatewayClient>,
}

impl OptionsService {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }

    /// Load all options as a key → value map.
    pub async fn load(&self) -> ConsoleResult<HashMap<String, String>> {
        let entries = self.client.options().await?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect())
    }

    /// Write one option. Color-valued keys are validated locally first; an
    /// empty value is allowed and clears the option.
    pub async fn update(&self, key: &str, value: &str) -> ConsoleResult<()> {
        if is_color_key(key) && !value.trim().is_empty() {
            let color = value.trim();
            if !is_valid_hex_color(color) {
                return Err(ConsoleError::Config(format!(
                    "{key} must be a hex color like #1677ff, got {color:?}"
                )));
            }
        }
        self.client.update_option(key, value).await
    }

    /// Write a boolean option in the backend's string encoding.
    pub async fn update_bool(
        &self,
        key: &str,
        value: bool,
    ) -> ConsoleResult<()> {
        self.update(key, if value { "true" } else { "false" }).await
    }
}

fn is_color_key(key: &str) -> bool {
    key.ends_with("Color") || key.ends_with("_color")
}

/// `#rgb` or `#rrggbb`.
fn is_valid_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6)
        && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ConsoleConfig;
    use crate::store::{LocalStore, MemoryStore};

    #[rstest]
    #[case("#fff", true)]
    #[case("#1677ff", true)]
    #[case("#1677FF", true)]
    #[case("1677ff", false)]
    #[case("#16", false)]
    #[case("#1677fg", false)]
    #[case("", false)]
    fn hex_color_validation(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_hex_color(value), valid);
    }

    fn service_for(server: &MockServer) -> OptionsService {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let config = ConsoleConfig {
            base_url: server.uri(),
            ..ConsoleConfig::default()
        };
        OptionsService::new(Arc::new(
            GatewayClient::new(&config, store).unwrap(),
        ))
    }

    #[tokio::test]
    async fn load_flattens_entries_into_a_map() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/option/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "data": [
                    {"key": "SystemName", "value": "Gateway"},
                    {"key": "DisplayInCurrencyEnabled", "value": "true"}
                ]}),
            ))
            .mount(&server)
            .await;

        let options = service_for(&server).load().await.unwrap();
        assert_eq!(options["SystemName"], "Gateway");
        assert_eq!(options["DisplayInCurrencyEnabled"], "true");
    }

    #[tokio::test]
    async fn invalid_color_never_reaches_the_network() {
        let server = MockServer::start().await;
        // No mock mounted: any request would 404 and fail differently.
        let result = service_for(&server)
            .update("SystemNameColor", "blue")
            .await;
        match result {
            Err(ConsoleError::Config(message)) => {
                assert!(message.contains("SystemNameColor"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_color_is_written_through() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/option/"))
            .and(body_json(serde_json::json!({
                "key": "SystemNameColor", "value": "#1677ff"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        service_for(&server)
            .update("SystemNameColor", "#1677ff")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_color_clears_without_validation() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/option/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        service_for(&server)
            .update("SystemNameColor", "")
            .await
            .unwrap();
    }
}
