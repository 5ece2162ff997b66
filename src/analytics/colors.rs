//! Stable model-to-color assignment for chart series.
//!
//! Well-known models carry preset colors so the dashboard looks consistent
//! across installations; anything else gets a color derived from a hash of
//! its name. Either way the mapping is a pure function of the name, so a
//! model keeps its color across re-renders and sessions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

static PRESET_COLORS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| {
        HashMap::from([
            ("gpt-3.5-turbo", "#1ec997"),
            ("gpt-4", "#5bc0de"),
            ("gpt-4-turbo", "#3b82f6"),
            ("gpt-4o", "#2563eb"),
            ("gpt-4o-mini", "#60a5fa"),
            ("o1-mini", "#818cf8"),
            ("o1-preview", "#6366f1"),
            ("claude-3-haiku", "#f4a261"),
            ("claude-3-sonnet", "#e76f51"),
            ("claude-3-opus", "#d8605b"),
            ("claude-3-5-sonnet", "#cc785c"),
            ("gemini-1.5-flash", "#34a853"),
            ("gemini-1.5-pro", "#0f9d58"),
            ("deepseek-chat", "#4f6bfe"),
            ("deepseek-reasoner", "#3b55d9"),
            ("text-embedding-ada-002", "#94a3b8"),
        ])
    });

/// Color for a model name: the preset if one exists, otherwise a
/// hash-derived HSL color. Same name, same color.
pub fn model_color(model_name: &str) -> String {
    if let Some(preset) = PRESET_COLORS.get(model_name) {
        return (*preset).to_string();
    }
    derived_color(model_name)
}

/// Deterministic fallback color. The hash spreads hue over the full wheel
/// while saturation and lightness stay in a band that reads well on both
/// light and dark chart backgrounds.
fn derived_color(model_name: &str) -> String {
    let digest = Sha256::digest(model_name.as_bytes());
    let hue = u16::from_be_bytes([digest[0], digest[1]]) % 360;
    let saturation = 55 + (digest[2] % 25) as u16;
    let lightness = 42 + (digest[3] % 18) as u16;
    format!("hsl({hue}, {saturation}%, {lightness}%)")
}
