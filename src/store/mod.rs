//! Typed client-local store.
//!
//! The console caches a handful of server-provided values locally (branding
//! strings, theme, the logged-in user snapshot). Components receive the
//! store as an injected `Arc<dyn LocalStore>` rather than reading an
//! ambient global, so tests can substitute their own.
//!
//! Semantics are last-writer-wins with no locking across keys: writes are
//! user-driven and infrequent, and staleness is cosmetic.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

/// The closed set of keys the console persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    FooterHtml,
    Notice,
    HomePageContent,
    SystemName,
    SystemNameColor,
    Logo,
    ThemeMode,
    DataExportDefaultTime,
    HideHeaderLogo,
    HideHeaderText,
    /// Serialized snapshot of the logged-in user; cleared on 401.
    User,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::FooterHtml => "footer_html",
            StoreKey::Notice => "notice",
            StoreKey::HomePageContent => "home_page_content",
            StoreKey::SystemName => "system_name",
            StoreKey::SystemNameColor => "system_name_color",
            StoreKey::Logo => "logo",
            StoreKey::ThemeMode => "theme-mode",
            StoreKey::DataExportDefaultTime => "data_export_default_time",
            StoreKey::HideHeaderLogo => "hide_header_logo_enabled",
            StoreKey::HideHeaderText => "hide_header_text_enabled",
            StoreKey::User => "user",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change notification delivered to subscribers after every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub key: StoreKey,
}

/// Injected key/value store with change notifications.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Option<String>;
    fn set(&self, key: StoreKey, value: String);
    fn remove(&self, key: StoreKey);
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

impl dyn LocalStore {
    /// Boolean flags are stored as `"true"` / `"false"` strings.
    pub fn get_bool(&self, key: StoreKey) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    pub fn set_bool(&self, key: StoreKey, value: bool) {
        self.set(key, value.to_string());
    }

    /// Read a JSON-serialized value; unparseable content reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: StoreKey) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key = %key, %error, "discarding malformed store entry");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(
        &self,
        key: StoreKey,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        self.set(key, serde_json::to_string(value)?);
        Ok(())
    }
}

/// In-memory [`LocalStore`]. The browser build backs this with
/// `localStorage`; native shells persist it to disk themselves.
pub struct MemoryStore {
    entries: DashMap<StoreKey, String>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            entries: DashMap::new(),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.entries.get(&key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: StoreKey, value: String) {
        self.entries.insert(key, value);
        // No receivers is fine; nobody has subscribed yet.
        let _ = self.changes.send(StoreChange { key });
    }

    fn remove(&self, key: StoreKey) {
        if self.entries.remove(&key).is_some() {
            let _ = self.changes.send(StoreChange { key });
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
