//! Process-local token store
//!
//! Used when the durable cache is disabled. Entries vanish with the process.

use std::collections::HashMap;

use parking_lot::RwLock;
use tourist_esim_core::TokenStore;
use tourist_esim_domain::Token;

/// [`TokenStore`] held in memory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached tokens
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<Token> {
        self.entries.read().get(key).cloned()
    }

    fn store(&self, key: &str, token: &Token) {
        self.entries.write().insert(key.to_string(), token.clone());
    }

    fn forget(&self, key: &str) {
        self.entries.write().remove(key);
    }

    fn flush(&self) {
        self.entries.write().clear();
    }
}
