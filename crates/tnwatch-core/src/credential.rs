//! Credential loading
//!
//! The signing key is read once from the environment and only ever held in
//! memory. Nothing in this crate prints or persists it.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Environment variable holding the signing key
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// Somewhere credentials can be looked up by name
pub trait CredentialSource {
    /// Look up a variable, returning `None` when it is unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Opaque signing secret
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Read `PRIVATE_KEY` from `source`.
///
/// Absence is a configuration error, not a transient one, so there is no retry.
pub fn load_credential(source: &impl CredentialSource) -> Result<Credential> {
    match source.var(PRIVATE_KEY_VAR) {
        Some(value) if !value.trim().is_empty() => Ok(Credential::new(value.trim())),
        _ => Err(Error::MissingCredential(PRIVATE_KEY_VAR.to_string())),
    }
}
