/// HS256 session tokens
///
/// Keys are derived from [`AuthConfig`] once at startup and shared through
/// `AppState`; there is no global key storage.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// "access" or "refresh"
    pub token_type: String,
    pub email: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_secs),
        }
    }

    fn generate(&self, user_id: i64, email: &str, token_type: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: token_type.to_string(),
            email: email.to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to encode token: {}", e)))
    }

    pub fn generate_access_token(&self, user_id: i64, email: &str) -> Result<String> {
        self.generate(user_id, email, ACCESS_TOKEN, self.access_ttl)
    }

    pub fn generate_token_pair(&self, user_id: i64, email: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.generate_access_token(user_id, email)?,
            refresh: self.generate(user_id, email, REFRESH_TOKEN, self.refresh_ttl)?,
        })
    }

    /// Decode a token, checking signature and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(JWT_ALGORITHM))?;
        Ok(data.claims)
    }

    /// Decode a token and require it to be of `token_type`
    pub fn validate_token_of_type(&self, token: &str, token_type: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;
        if claims.token_type != token_type {
            return Err(AppError::Unauthorized(format!(
                "expected {} token",
                token_type
            )));
        }
        Ok(claims)
    }
}
