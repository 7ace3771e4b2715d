//! Session token storage in the OS keyring.
//!
//! The bearer token returned by sign-in is kept in the platform keychain
//! rather than in the configuration file.

use super::error::{ApiError, Result};

/// The keyring service name for StayHub tokens.
const KEYRING_SERVICE: &str = "stayhub";

/// The keyring username under which the token is stored.
const KEYRING_USER: &str = "auth_token";

/// A bearer token for the StayHub API.
#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Load the stored session, if any.
    pub fn load() -> Option<Self> {
        get_token().ok().map(Self::new)
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

fn entry() -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| ApiError::Session(format!("failed to access keyring: {}", e)))
}

/// Store the session token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(token: &str) -> Result<()> {
    entry()?
        .set_password(token)
        .map_err(|e| ApiError::Session(format!("failed to store token: {}", e)))
}

/// Retrieve the session token from the OS keyring.
///
/// # Errors
///
/// Returns an error if no token is stored or the keyring is unavailable.
pub fn get_token() -> Result<String> {
    entry()?
        .get_password()
        .map_err(|e| ApiError::Session(format!("failed to retrieve token: {}", e)))
}

/// Delete the session token from the OS keyring.
///
/// Deleting when no token is stored is not an error.
pub fn delete_token() -> Result<()> {
    match entry()?.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ApiError::Session(format!("failed to delete token: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let session = Session::new("abc.def.ghi");
        assert_eq!(session.header_value(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_session_does_not_expose_token() {
        let session = Session::new("secret_token");
        let debug_output = format!("{:?}", session);
        assert!(!debug_output.contains("secret_token"));
    }
}
