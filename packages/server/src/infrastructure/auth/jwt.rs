//! HS256 JWT verification for request tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Identity, TokenVerifier, UserId, Username};

/// Claims carried by a request token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    /// Expiration (Unix timestamp). Checked when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims::<&str>(&[]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;
        let username =
            Username::new(data.claims.username).map_err(|_| AuthError::InvalidToken)?;
        Ok(Identity::new(UserId::new(data.claims.user_id), username))
    }
}
