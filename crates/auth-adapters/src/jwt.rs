//! HS256 session tokens.
//!
//! The token is the whole session: subject is the user's email, `name` is
//! the display name. Nothing is stored server-side.

use std::time::Duration;

use chrono::Utc;
use domains::{AuthError, Session, SessionProvider};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    iat: i64,
    exp: i64,
}

pub struct JwtSessionProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtSessionProvider {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
}

impl SessionProvider for JwtSessionProvider {
    fn issue(&self, session: &Session) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: session.user_id.clone(),
            name: session.name.clone(),
            iat: now,
            exp: i64::try_from(self.ttl.as_secs()).map_or(i64::MAX, |ttl| now.saturating_add(ttl)),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Option<Session> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(Session {
                user_id: data.claims.sub,
                name: data.claims.name,
            }),
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn session() -> Session {
        Session {
            user_id: "a@x.com".into(),
            name: "Alice".into(),
        }
    }

    #[test]
    fn issued_token_verifies_to_the_same_session() {
        let provider = JwtSessionProvider::new(SECRET, Duration::from_secs(60));
        let token = provider.issue(&session()).unwrap();
        assert_eq!(provider.verify(&token), Some(session()));
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_wrapping() {
        let provider = JwtSessionProvider::new(SECRET, Duration::from_secs(u64::MAX));
        let token = provider.issue(&session()).unwrap();
        assert_eq!(provider.verify(&token), Some(session()));
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let issuer = JwtSessionProvider::new(b"another-secret-another-secret-000", Duration::from_secs(60));
        let verifier = JwtSessionProvider::new(SECRET, Duration::from_secs(60));
        let token = issuer.issue(&session()).unwrap();
        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let provider = JwtSessionProvider::new(SECRET, Duration::from_secs(60));
        let past = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: "a@x.com".into(),
            name: "Alice".into(),
            iat: past - 60,
            exp: past,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &provider.encoding).unwrap();
        assert_eq!(provider.verify(&token), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let provider = JwtSessionProvider::new(SECRET, Duration::from_secs(60));
        assert_eq!(provider.verify("not-a-token"), None);
    }
}
