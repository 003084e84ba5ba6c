//! Secure persistence for the credential pair.
//!
//! The access and refresh tokens are stored as two entries in the OS
//! keychain, keyed `accessToken` and `refreshToken`. The pair is written
//! together or not at all: a failed second write rolls back the first.

use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name for the default store
const SERVICE_NAME: &str = "menumate";

/// Keychain entry name for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Keychain entry name for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage for the session credential pair.
///
/// The session manager is the only writer of the full pair; the request
/// gateway additionally replaces the access token after a refresh.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Result<Option<String>>;

    fn refresh_token(&self) -> Result<Option<String>>;

    /// Persist both tokens atomically from the caller's perspective.
    /// A partial write must not survive: on failure neither token remains.
    fn store_pair(&self, access: &str, refresh: &str) -> Result<()>;

    /// Replace only the access token (post-refresh; the refresh token is
    /// not rotated by that flow).
    fn set_access_token(&self, access: &str) -> Result<()>;

    /// Delete both tokens. Must succeed when no tokens exist.
    fn clear(&self) -> Result<()>;
}

/// Token store backed by the OS keychain via `keyring`.
pub struct KeyringTokens {
    service: String,
}

impl Default for KeyringTokens {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringTokens {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

impl TokenStore for KeyringTokens {
    fn access_token(&self) -> Result<Option<String>> {
        self.read(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        self.read(REFRESH_TOKEN_KEY)
    }

    fn store_pair(&self, access: &str, refresh: &str) -> Result<()> {
        self.entry(ACCESS_TOKEN_KEY)?
            .set_password(access)
            .context("Failed to store access token in keychain")?;

        if let Err(e) = self.entry(REFRESH_TOKEN_KEY)?.set_password(refresh) {
            // Roll back the first write so a half-pair never survives
            let _ = self.delete(ACCESS_TOKEN_KEY);
            return Err(e).context("Failed to store refresh token in keychain");
        }
        Ok(())
    }

    fn set_access_token(&self, access: &str) -> Result<()> {
        self.entry(ACCESS_TOKEN_KEY)?
            .set_password(access)
            .context("Failed to store access token in keychain")
    }

    fn clear(&self) -> Result<()> {
        self.delete(ACCESS_TOKEN_KEY)?;
        self.delete(REFRESH_TOKEN_KEY)?;
        Ok(())
    }
}

/// In-memory token store for tests and ephemeral sessions (no keychain
/// access, nothing outlives the process).
#[derive(Default)]
pub struct MemoryTokens {
    inner: Mutex<MemoryPair>,
}

#[derive(Default)]
struct MemoryPair {
    access: Option<String>,
    refresh: Option<String>,
}

impl MemoryTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing pair (test setup helper).
    pub fn with_pair(access: &str, refresh: &str) -> Self {
        let store = Self::default();
        store
            .store_pair(access, refresh)
            .expect("memory store cannot fail on a fresh lock");
        store
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, MemoryPair>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokens {
    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.locked()?.access.clone())
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.locked()?.refresh.clone())
    }

    fn store_pair(&self, access: &str, refresh: &str) -> Result<()> {
        let mut inner = self.locked()?;
        inner.access = Some(access.to_string());
        inner.refresh = Some(refresh.to_string());
        Ok(())
    }

    fn set_access_token(&self, access: &str) -> Result<()> {
        self.locked()?.access = Some(access.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self.locked()?;
        inner.access = None;
        inner.refresh = None;
        Ok(())
    }
}
