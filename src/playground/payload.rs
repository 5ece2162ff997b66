//! Completion request construction.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ChatError;
use crate::api_types::{ChatCompletionRequest, Message, Role};
use crate::error::ConsoleError;

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    1.0
}

fn default_max_tokens() -> Option<u64> {
    Some(4_096)
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. Answer clearly and accurately.".to_string()
}

/// User-tunable request parameters for the playground.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlaygroundParams {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub group: String,

    #[validate(range(min = 0.0, max = 2.0))]
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Omitted from the payload when unset or zero.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u64>,

    /// Prepended as a `system` message when non-empty after trimming.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// When enabled, `custom_body` replaces the generated payload.
    #[serde(default)]
    pub custom_body_enabled: bool,

    #[serde(default)]
    pub custom_body: String,
}

impl Default for PlaygroundParams {
    fn default() -> Self {
        Self {
            model: default_model(),
            group: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            custom_body_enabled: false,
            custom_body: String::new(),
        }
    }
}

impl PlaygroundParams {
    /// System message for the head of the conversation, if the prompt is
    /// non-empty after trimming.
    pub fn system_message(&self) -> Option<Message> {
        let prompt = self.system_prompt.trim();
        (!prompt.is_empty()).then(|| Message::new(Role::System, prompt))
    }

    /// Build the request payload around the wire-shaped conversation.
    ///
    /// In custom-body mode the user-supplied JSON object becomes the
    /// payload, with `messages` and `stream` forced back to the live
    /// conversation and `true`. An empty or unparseable override fails
    /// here, before any network call.
    pub fn build_payload(
        &self,
        conversation: &[Message],
    ) -> Result<serde_json::Value, ChatError> {
        let messages =
            serde_json::to_value(conversation).map_err(ConsoleError::Decode)?;

        if !self.custom_body_enabled {
            let request = ChatCompletionRequest {
                messages: conversation.to_vec(),
                model: self.model.clone(),
                group: self.group.clone(),
                temperature: self.temperature,
                top_p: self.top_p,
                max_tokens: self.max_tokens.filter(|&limit| limit > 0),
                stream: true,
            };
            return Ok(
                serde_json::to_value(request).map_err(ConsoleError::Decode)?
            );
        }

        let text = self.custom_body.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyCustomBody);
        }
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|error| ChatError::InvalidCustomBody(error.to_string()))?;
        let serde_json::Value::Object(mut body) = value else {
            return Err(ChatError::InvalidCustomBody(
                "custom body must be a JSON object".to_string(),
            ));
        };
        body.insert("messages".to_string(), messages);
        body.insert("stream".to_string(), serde_json::Value::Bool(true));
        Ok(serde_json::Value::Object(body))
    }

    /// Pretty-printed request preview for the debug panel, built around a
    /// sample question.
    pub fn preview(&self) -> Result<String, ChatError> {
        let mut conversation = Vec::new();
        if let Some(system) = self.system_message() {
            conversation.push(system);
        }
        conversation.push(Message::new(Role::User, "example question"));
        let payload = self.build_payload(&conversation)?;
        Ok(serde_json::to_string_pretty(&payload)
            .map_err(ConsoleError::Decode)?)
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    fn conversation() -> Vec<Message> {
        vec![Message::new(Role::User, "hi")]
    }

    #[test]
    fn generated_payload_carries_sampling_and_stream() {
        let params = PlaygroundParams {
            model: "gpt-4o".to_string(),
            ..PlaygroundParams::default()
        };
        let payload = params.build_payload(&conversation()).unwrap();
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["temperature"], 0.7);
        assert_eq!(payload["max_tokens"], 4_096);
        assert_eq!(payload["messages"][0]["content"], "hi");
    }

    #[test]
    fn zero_max_tokens_is_omitted() {
        let params = PlaygroundParams {
            max_tokens: Some(0),
            ..PlaygroundParams::default()
        };
        let payload = params.build_payload(&conversation()).unwrap();
        assert!(payload.get("max_tokens").is_none());
    }

    #[test]
    fn blank_system_prompt_yields_no_system_message() {
        let params = PlaygroundParams {
            system_prompt: "   ".to_string(),
            ..PlaygroundParams::default()
        };
        assert!(params.system_message().is_none());

        let params = PlaygroundParams {
            system_prompt: " be brief ".to_string(),
            ..PlaygroundParams::default()
        };
        let system = params.system_message().unwrap();
        assert_eq!(system.role, Role::System);
        assert_eq!(system.content, "be brief");
    }

    #[test]
    fn empty_custom_body_is_rejected() {
        let params = PlaygroundParams {
            custom_body_enabled: true,
            custom_body: "  \n ".to_string(),
            ..PlaygroundParams::default()
        };
        assert!(matches!(
            params.build_payload(&conversation()),
            Err(ChatError::EmptyCustomBody)
        ));
    }

    #[test]
    fn malformed_custom_body_is_rejected() {
        let params = PlaygroundParams {
            custom_body_enabled: true,
            custom_body: "{not json".to_string(),
            ..PlaygroundParams::default()
        };
        assert!(matches!(
            params.build_payload(&conversation()),
            Err(ChatError::InvalidCustomBody(_))
        ));

        let params = PlaygroundParams {
            custom_body_enabled: true,
            custom_body: "[1, 2]".to_string(),
            ..PlaygroundParams::default()
        };
        assert!(matches!(
            params.build_payload(&conversation()),
            Err(ChatError::InvalidCustomBody(_))
        ));
    }

    #[test]
    fn custom_body_is_reconciled_with_live_conversation() {
        let params = PlaygroundParams {
            custom_body_enabled: true,
            custom_body: r#"{
                "model": "my-model",
                "stream": false,
                "messages": [{"role": "user", "content": "stale"}],
                "presence_penalty": 0.5
            }"#
            .to_string(),
            ..PlaygroundParams::default()
        };
        let payload = params.build_payload(&conversation()).unwrap();
        assert_eq!(payload["model"], "my-model");
        assert_eq!(payload["presence_penalty"], 0.5);
        // Forced back regardless of what the override said.
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["messages"][0]["content"], "hi");
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn sampling_ranges_are_validated() {
        let params = PlaygroundParams {
            temperature: 2.5,
            ..PlaygroundParams::default()
        };
        assert!(params.validate().is_err());

        let params = PlaygroundParams {
            top_p: -0.1,
            ..PlaygroundParams::default()
        };
        assert!(params.validate().is_err());

        assert!(PlaygroundParams::default().validate().is_ok());
    }

    #[test]
    fn preview_renders_a_sample_request() {
        let preview = PlaygroundParams::default().preview().unwrap();
        assert!(preview.contains("example question"));
        assert!(preview.contains("\"stream\": true"));
        assert!(preview.contains("\"role\": \"system\""));
    }
}
