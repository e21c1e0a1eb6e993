//! Shared test helpers for `tourist-esim-core` integration tests.
//!
//! Lightweight port implementations so lifecycle tests can focus on
//! behaviour instead of boilerplate.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tourist_esim_core::{TokenIssuer, TokenStore};
use tourist_esim_domain::{Credentials, EsimError, Result, Token, TokenResponse};

/// Store shared by several providers, standing in for the on-disk cache
#[derive(Default)]
pub struct SharedStore {
    entries: Mutex<HashMap<String, Token>>,
}

impl SharedStore {
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

impl TokenStore for SharedStore {
    fn get(&self, key: &str) -> Option<Token> {
        self.entries.lock().get(key).cloned()
    }

    fn store(&self, key: &str, token: &Token) {
        self.entries.lock().insert(key.to_string(), token.clone());
    }

    fn forget(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    fn flush(&self) {
        self.entries.lock().clear();
    }
}

/// Issuer replaying a script of grant outcomes, then repeating the last one
pub struct ScriptedIssuer {
    grants: Mutex<VecDeque<Result<TokenResponse>>>,
    revoke_fails: bool,
    grant_calls: AtomicUsize,
    revoked: Mutex<Vec<String>>,
}

impl ScriptedIssuer {
    pub fn new(grants: Vec<Result<TokenResponse>>) -> Self {
        Self {
            grants: Mutex::new(grants.into()),
            revoke_fails: false,
            grant_calls: AtomicUsize::new(0),
            revoked: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_revoke(mut self) -> Self {
        self.revoke_fails = true;
        self
    }

    pub fn grant_calls(&self) -> usize {
        self.grant_calls.load(Ordering::SeqCst)
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.lock().clone()
    }
}

impl TokenIssuer for ScriptedIssuer {
    fn request_token(&self, _credentials: &Credentials) -> Result<TokenResponse> {
        self.grant_calls.fetch_add(1, Ordering::SeqCst);
        let mut grants = self.grants.lock();
        if grants.len() > 1 {
            grants.pop_front().unwrap_or_else(|| Err(EsimError::invalid_credentials()))
        } else {
            grants.front().cloned().unwrap_or_else(|| Err(EsimError::invalid_credentials()))
        }
    }

    fn revoke_token(&self, token: &Token) -> Result<()> {
        self.revoked.lock().push(token.access_token().expose().to_string());
        if self.revoke_fails {
            Err(EsimError::connection("revocation endpoint unreachable"))
        } else {
            Ok(())
        }
    }
}

pub fn grant(token: &str, lifetime: u64) -> Result<TokenResponse> {
    Ok(TokenResponse {
        access_token: Some(token.to_string()),
        expires_in: Some(lifetime),
        token_type: None,
    })
}
