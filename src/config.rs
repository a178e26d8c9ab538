//! Runtime configuration and API key discovery
//!
//! Settings come from the process environment (optionally seeded from a `.env`
//! file). The API key is resolved lazily through an ordered chain of
//! [`KeyProvider`]s so a key supplied after startup is still picked up.

use crate::{Error, Result};
use std::sync::{Arc, RwLock};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const API_KEY_VAR: &str = "API_KEY";

/// A single source of the Gemini API key.
pub trait KeyProvider: Send + Sync {
    /// Short label used in log output.
    fn name(&self) -> &str;

    /// Returns the key if this source currently has a non-empty one.
    fn api_key(&self) -> Option<String>;
}

/// Key injected at runtime by the embedding application.
///
/// Cloned handles share the same slot, so the key can be set after the
/// service has been built.
#[derive(Debug, Clone, Default)]
pub struct KeySlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl KeySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(key.into());
    }

    pub fn clear(&self) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

impl KeyProvider for KeySlot {
    fn name(&self) -> &str {
        "injected"
    }

    fn api_key(&self) -> Option<String> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone().filter(|key| !key.is_empty())
    }
}

/// Reads the key from a process environment variable on every lookup.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeyProvider for EnvKeyProvider {
    fn name(&self) -> &str {
        &self.var
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|key| !key.is_empty())
    }
}

/// Ordered list of key sources; the first one with a key wins.
#[derive(Default)]
pub struct KeyChain {
    providers: Vec<Box<dyn KeyProvider>>,
}

impl KeyChain {
    pub fn new(providers: Vec<Box<dyn KeyProvider>>) -> Self {
        Self { providers }
    }

    /// Injected slot first, then the configured environment variable.
    pub fn standard(slot: KeySlot, config: &Config) -> Self {
        Self::new(vec![
            Box::new(slot),
            Box::new(EnvKeyProvider::new(config.api_key_var.clone())),
        ])
    }

    pub fn with_provider(mut self, provider: Box<dyn KeyProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn resolve(&self) -> Option<String> {
        self.providers.iter().find_map(|provider| {
            let key = provider.api_key();
            if key.is_some() {
                tracing::debug!("Using Gemini API key from {}", provider.name());
            }
            key
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Model used when a call does not name one.
    pub model: String,
    pub base_url: String,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// Environment variable consulted for the API key.
    pub api_key_var: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            api_key_var: API_KEY_VAR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let timeout = match std::env::var("GEMINI_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_timeout(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout,
            api_key_var: API_KEY_VAR.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key_var(mut self, var: impl Into<String>) -> Self {
        self.api_key_var = var.into();
        self
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            Error::Configuration(format!(
                "Invalid GEMINI_TIMEOUT_SECS '{}'. Expected a whole number of seconds",
                raw
            ))
        })
}
