//! Vendor classification for free-text model names.
//!
//! The marketplace and playground tag models with their upstream vendor
//! (icon, grouping) based on nothing but the model name. The mapping is a
//! single ordered pattern table — first match wins, matched
//! case-insensitively as a substring — rather than conditionals scattered
//! through the UI layer.

use serde::Serialize;

/// Upstream vendors the console knows how to badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    OpenAi,
    Anthropic,
    Google,
    Meta,
    Mistral,
    Alibaba,
    DeepSeek,
    Cohere,
    Microsoft,
    Amazon,
    Xai,
    Zhipu,
    Baidu,
    Moonshot,
    Minimax,
    Midjourney,
    Unknown,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "OpenAI",
            Vendor::Anthropic => "Anthropic",
            Vendor::Google => "Google",
            Vendor::Meta => "Meta",
            Vendor::Mistral => "Mistral",
            Vendor::Alibaba => "Alibaba",
            Vendor::DeepSeek => "DeepSeek",
            Vendor::Cohere => "Cohere",
            Vendor::Microsoft => "Microsoft",
            Vendor::Amazon => "Amazon",
            Vendor::Xai => "xAI",
            Vendor::Zhipu => "Zhipu",
            Vendor::Baidu => "Baidu",
            Vendor::Moonshot => "Moonshot",
            Vendor::Minimax => "MiniMax",
            Vendor::Midjourney => "Midjourney",
            Vendor::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered (pattern, vendor) pairs. Order matters for names that contain
/// several vendors' markers, e.g. distills of one vendor's model onto
/// another's base.
const CLASSIFICATION: &[(&str, Vendor)] = &[
    ("chatgpt", Vendor::OpenAi),
    ("gpt-", Vendor::OpenAi),
    ("o1-", Vendor::OpenAi),
    ("o3-", Vendor::OpenAi),
    ("dall-e", Vendor::OpenAi),
    ("whisper", Vendor::OpenAi),
    ("text-embedding", Vendor::OpenAi),
    ("text-moderation", Vendor::OpenAi),
    ("tts-", Vendor::OpenAi),
    ("davinci", Vendor::OpenAi),
    ("claude", Vendor::Anthropic),
    ("gemini", Vendor::Google),
    ("gemma", Vendor::Google),
    ("palm", Vendor::Google),
    ("llama", Vendor::Meta),
    ("mistral", Vendor::Mistral),
    ("mixtral", Vendor::Mistral),
    ("codestral", Vendor::Mistral),
    ("deepseek", Vendor::DeepSeek),
    ("qwen", Vendor::Alibaba),
    ("command", Vendor::Cohere),
    ("phi-", Vendor::Microsoft),
    ("titan", Vendor::Amazon),
    ("nova", Vendor::Amazon),
    ("grok", Vendor::Xai),
    ("chatglm", Vendor::Zhipu),
    ("glm-", Vendor::Zhipu),
    ("ernie", Vendor::Baidu),
    ("moonshot", Vendor::Moonshot),
    ("kimi", Vendor::Moonshot),
    ("abab", Vendor::Minimax),
    ("minimax", Vendor::Minimax),
    ("mj-", Vendor::Midjourney),
    ("midjourney", Vendor::Midjourney),
];

/// Classify a model name. Unmatched names are [`Vendor::Unknown`], never
/// an error.
pub fn classify(model_name: &str) -> Vendor {
    let name = model_name.to_ascii_lowercase();
    CLASSIFICATION
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, vendor)| *vendor)
        .unwrap_or(Vendor::Unknown)
}
