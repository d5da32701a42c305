use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by an access token.
///
/// Standard RFC 7519 registered claims plus the user attributes downstream
/// authorization needs (`name`, `email`, `role`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    pub name: String,

    pub email: String,

    pub role: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create claims for a user, issued at `now` and valid for `lifetime`.
    pub fn for_subject(
        subject: &dyn TokenSubject,
        issuer: &str,
        audience: &str,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sub: subject.subject_id(),
            name: subject.display_name(),
            email: subject.email(),
            role: subject.role(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: now
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// An authenticated identity a token can be issued for.
///
/// Implemented by the owning service's user entity so this crate stays free of
/// any particular domain model.
pub trait TokenSubject {
    fn subject_id(&self) -> String;
    fn display_name(&self) -> String;
    fn email(&self) -> String;
    fn role(&self) -> String;
}
