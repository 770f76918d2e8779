use std::rc::Rc;

use crate::store::kv::KeyValueStore;
use crate::store::schema::API_KEY_KEY;

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Where the active API key came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    CommandLine,
    Environment,
    Stored,
}

/// The provider API key kept in the store. The key is stored as a JSON
/// string like every other value.
pub struct CredentialStore {
    store: Rc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Option<String> {
        let raw = self.store.get(API_KEY_KEY)?;
        match serde_json::from_str::<String>(&raw) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            Ok(_) => None,
            Err(e) => {
                log::warn!("stored API key is unreadable: {e}");
                None
            }
        }
    }

    pub fn save(&self, key: &str) {
        match serde_json::to_string(key.trim()) {
            Ok(json) => self.store.set(API_KEY_KEY, &json),
            Err(e) => log::warn!("failed to encode API key: {e}"),
        }
    }

    pub fn clear(&self) {
        self.store.remove(API_KEY_KEY);
    }
}

/// Pick the API key: the command line wins over the environment, which wins
/// over the stored key. Blank values are skipped.
pub fn resolve_api_key(
    cli: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    stored: &CredentialStore,
) -> Option<(String, KeySource)> {
    let non_blank = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };
    if let Some(key) = cli.map(str::to_string).and_then(non_blank) {
        return Some((key, KeySource::CommandLine));
    }
    if let Some(key) = API_KEY_ENV_VARS.iter().find_map(|var| env(var).and_then(non_blank)) {
        return Some((key, KeySource::Environment));
    }
    stored.get().map(|key| (key, KeySource::Stored))
}
