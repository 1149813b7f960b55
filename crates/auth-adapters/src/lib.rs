//! # auth-adapters
//!
//! `SessionProvider` implementations plus the development sign-in used when
//! no external identity provider is configured.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtSessionProvider;

use domains::{AuthError, Session};

/// Name under which the form-based development sign-in is exposed.
pub const DEV_PROVIDER: &str = "dev";

/// Builds a session from a self-declared profile.
///
/// Only for local development: nothing proves the caller owns the address.
pub fn dev_sign_in(email: &str, name: &str) -> Result<Session, AuthError> {
    let email = email.trim();
    let name = name.trim();
    if email.is_empty() || name.is_empty() {
        return Err(AuthError::Rejected("email and name are required".into()));
    }
    if !email.contains('@') {
        return Err(AuthError::Rejected(format!("`{email}` is not an email address")));
    }
    tracing::info!(user = %email, provider = DEV_PROVIDER, "signed in");
    Ok(Session {
        user_id: email.to_lowercase(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_sign_in_normalizes_the_email() {
        let s = dev_sign_in("  A@X.com ", " Alice ").unwrap();
        assert_eq!(s.user_id, "a@x.com");
        assert_eq!(s.name, "Alice");
    }

    #[test]
    fn dev_sign_in_rejects_incomplete_profiles() {
        assert!(dev_sign_in("", "Alice").is_err());
        assert!(dev_sign_in("a@x.com", "  ").is_err());
        assert!(dev_sign_in("alice", "Alice").is_err());
    }
}
