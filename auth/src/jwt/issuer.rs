use chrono::Duration;
use chrono::Utc;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Shortest signing secret accepted at startup.
pub const MIN_SECRET_LENGTH: usize = 16;

/// Settings a token issuer is built from.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub lifetime: Duration,
}

/// Mints signed, time-bounded access tokens for authenticated users.
///
/// A constructed issuer always holds a usable signing key; missing or short
/// secrets are rejected by [`TokenIssuer::new`].
pub struct TokenIssuer {
    handler: JwtHandler,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Build an issuer from configuration.
    ///
    /// # Errors
    /// * `Configuration` - Secret is missing, padded with whitespace, shorter than 16 bytes,
    ///   or the lifetime is not positive
    pub fn new(settings: TokenSettings) -> Result<Self, JwtError> {
        let secret = settings.secret.as_str();
        if secret.trim().is_empty() {
            return Err(JwtError::Configuration("missing signing key".to_string()));
        }
        if secret.trim() != secret {
            return Err(JwtError::Configuration(
                "signing key must not have leading or trailing whitespace".to_string(),
            ));
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::Configuration(format!(
                "signing key must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                secret.len()
            )));
        }
        if settings.lifetime <= Duration::zero() {
            return Err(JwtError::Configuration(
                "token lifetime must be positive".to_string(),
            ));
        }

        Ok(Self {
            handler: JwtHandler::new(secret.as_bytes(), settings.issuer, settings.audience),
            lifetime: settings.lifetime,
        })
    }

    /// Issue a token for an authenticated subject.
    ///
    /// # Returns
    /// Encoded JWT carrying id, name, email and role of `subject`
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, subject: &dyn TokenSubject) -> Result<String, JwtError> {
        let claims = Claims::for_subject(
            subject,
            self.handler.issuer(),
            self.handler.audience(),
            Utc::now(),
            self.lifetime,
        );

        self.handler.encode(&claims)
    }

    /// Validate a presented token and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Signature, issuer or audience mismatch
    /// * `DecodingFailed` - Token is malformed
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.handler.decode(token)
    }
}
