//! Token minting and verification for the dual-token scheme.
//!
//! Access and refresh tokens are signed with two distinct secrets, so a token
//! of one kind never verifies as the other. Access tokens are short-lived
//! (15 minutes) and stateless. Refresh tokens are long-lived (7 days), carry
//! a unique `jti` so consecutive mints never collide, and only count as valid
//! while they match the copy stored on the principal's record (see the `auth`
//! module).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Claims carried by access tokens (stateless, nothing persisted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (principal UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Claims carried by refresh tokens.
///
/// The `jti` keeps two mints for the same principal distinct even within the
/// same second; currency is still decided by comparison against the stored
/// copy, not by any embedded state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Unique token id
    pub jti: String,
    /// Subject (principal UUID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly minted token with its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// The encoded JWT
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
}

/// Signing and verification keys for both token kinds.
///
/// Constructed once at startup and passed into the gate; nothing reads key
/// material from ambient state at call time.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenKeys {
    /// Create a keyring from the two signing secrets.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
        }
    }

    /// Mint an access token for a principal.
    pub fn mint_access_token(&self, principal_uuid: &str) -> Result<MintedToken, TokenError> {
        let now = unix_now()?;

        let claims = AccessClaims {
            sub: principal_uuid.to_string(),
            iat: now,
            exp: now + ACCESS_TOKEN_DURATION_SECS,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(TokenError::Encoding)?;

        Ok(MintedToken {
            token,
            duration: ACCESS_TOKEN_DURATION_SECS,
        })
    }

    /// Mint a refresh token for a principal. The caller is responsible for
    /// persisting it as the principal's current token.
    pub fn mint_refresh_token(&self, principal_uuid: &str) -> Result<MintedToken, TokenError> {
        let now = unix_now()?;

        let claims = RefreshClaims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: principal_uuid.to_string(),
            iat: now,
            exp: now + REFRESH_TOKEN_DURATION_SECS,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(TokenError::Encoding)?;

        Ok(MintedToken {
            token,
            duration: REFRESH_TOKEN_DURATION_SECS,
        })
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify(&self.access_decoding, token)
    }

    /// Verify a refresh token's signature and expiry. Says nothing about
    /// whether the token is the principal's current one.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify(&self.refresh_decoding, token)
    }
}

fn unix_now() -> Result<u64, TokenError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TokenError::TimeError)?
        .as_secs())
}

fn verify<T: DeserializeOwned>(key: &DecodingKey, token: &str) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    match jsonwebtoken::decode::<T>(token, key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            _ => Err(TokenError::Decoding(e)),
        },
    }
}

/// Errors that can occur during token operations.
///
/// `Expired` is separated from `Decoding` so the gate can tell an expired
/// but well-signed access token (eligible for refresh) from a forged or
/// malformed one (hard reject).
#[derive(Debug)]
pub enum TokenError {
    /// Signature verified but the expiry has passed
    Expired,
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Signature or format invalid
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            TokenError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for TokenError {}
