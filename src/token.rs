use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{GhostError, Result};

/// Audience used for Admin API tokens when none is given
pub const DEFAULT_AUDIENCE: &str = "/admin/";

/// Token lifetime in seconds
pub const TOKEN_LIFETIME_SECS: i64 = 5 * 60;

/// Claims carried by an Admin API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Issued at, Unix seconds
    pub iat: i64,
    /// Expires at, Unix seconds
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Subject (the staff API key id)
    pub sub: String,
    /// Token type, always "admin"
    pub typ: String,
}

impl AdminClaims {
    /// Build claims for `key_id` valid from now for [`TOKEN_LIFETIME_SECS`]
    pub fn new(key_id: &str, audience: &str) -> Self {
        let iat = Utc::now().timestamp();
        AdminClaims {
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
            aud: audience.to_string(),
            sub: key_id.to_string(),
            typ: "admin".to_string(),
        }
    }
}

/// StaffApiKey is a parsed `<id>:<secret>` staff API key.
#[derive(Clone)]
pub struct StaffApiKey {
    /// Key identifier, sent as the token's `kid` header
    pub key_id: String,
    /// Decoded HMAC secret
    secret: Vec<u8>,
}

impl StaffApiKey {
    /// Parse a key pair of the form `<id>:<hex secret>`.
    ///
    /// Exactly one colon is allowed and both halves must be non-empty.
    pub fn parse(key_pair: &str) -> Result<Self> {
        let parts: Vec<&str> = key_pair.split(':').collect();
        let (key_id, secret) = match parts.as_slice() {
            [id, secret] if !id.is_empty() && !secret.is_empty() => (*id, *secret),
            _ => return Err(GhostError::MalformedKeyPair),
        };

        let secret = hex::decode(secret).map_err(GhostError::InvalidSecret)?;

        Ok(StaffApiKey {
            key_id: key_id.to_string(),
            secret,
        })
    }

    /// Sign a fresh token for `audience` (defaults to `/admin/` when empty).
    ///
    /// Nothing is cached: each call stamps a new validity window.
    pub fn sign(&self, audience: Option<&str>) -> Result<String> {
        let audience = audience
            .filter(|aud| !aud.is_empty())
            .unwrap_or(DEFAULT_AUDIENCE);
        let claims = AdminClaims::new(&self.key_id, audience);

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.key_id.clone());

        let token = encode(&header, &claims, &EncodingKey::from_secret(&self.secret))?;
        Ok(token)
    }

    /// `Authorization` header value for an Admin API request
    pub fn authorization_header(&self) -> Result<String> {
        Ok(format!("Ghost {}", self.sign(None)?))
    }
}

// Implement Debug manually to avoid exposing the secret
impl std::fmt::Debug for StaffApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffApiKey")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Parse `key_pair` and sign a fresh token for `audience`
pub fn sign(key_pair: &str, audience: Option<&str>) -> Result<String> {
    StaffApiKey::parse(key_pair)?.sign(audience)
}
