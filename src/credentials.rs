//! API key resolution
//!
//! Keys are looked up in the config file, then `OPENAI_API_KEY`, then the
//! system keyring. `chatdrop auth` writes the keyring entry.

use crate::config::OpenAiConfig;
use crate::error::Result;

/// Keyring service name
pub const KEYRING_SERVICE: &str = "chatdrop";

/// Keyring user name for the OpenAI key
pub const KEYRING_USER: &str = "openai";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Where a key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `provider.openai.api_key`
    Config,
    /// `OPENAI_API_KEY`
    Environment,
    /// System keyring
    Keyring,
    /// Typed in at startup
    Prompt,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config file"),
            Self::Environment => write!(f, "{}", API_KEY_ENV),
            Self::Keyring => write!(f, "system keyring"),
            Self::Prompt => write!(f, "interactive prompt"),
        }
    }
}

/// A resolved API key
#[derive(Clone)]
pub struct ApiKey {
    /// The secret
    pub value: String,
    /// Where it came from
    pub source: CredentialSource,
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Resolve an API key without prompting
///
/// Keyring failures are treated as "no key" so a missing secret service
/// never blocks the other sources.
pub fn resolve(config: &OpenAiConfig) -> Option<ApiKey> {
    if let Some(value) = non_blank(config.api_key.clone()) {
        return Some(ApiKey {
            value,
            source: CredentialSource::Config,
        });
    }

    if let Some(value) = non_blank(std::env::var(API_KEY_ENV).ok()) {
        return Some(ApiKey {
            value,
            source: CredentialSource::Environment,
        });
    }

    match read_keyring() {
        Ok(value) => non_blank(Some(value)).map(|value| ApiKey {
            value,
            source: CredentialSource::Keyring,
        }),
        Err(e) => {
            tracing::debug!("No API key in keyring: {}", e);
            None
        }
    }
}

fn read_keyring() -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    Ok(entry.get_password()?)
}

/// Store an API key in the system keyring
///
/// # Errors
///
/// Returns error if the keyring is unavailable or rejects the write
pub fn store_in_keyring(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(key.trim())?;
    tracing::info!("Stored API key in system keyring");
    Ok(())
}
