use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use chirp_types::api::Claims;

/// Session lifetime. Matches the cookie max-age.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Identity fields that go into a session token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
}

/// Issues and verifies HS256 session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            role_id: identity.role_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Decode and check signature and expiry. Every failure collapses to
    /// `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Token rejected: {}", e);
                None
            }
        }
    }
}
