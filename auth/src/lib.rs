//! Authentication utilities library
//!
//! Provides the I/O-free building blocks of credential verification:
//! - Password hashing (HMAC-SHA512 keyed with a per-password random salt)
//! - Account lockout policy (failed-attempt threshold and lock window)
//! - JWT access token issuance and validation
//!
//! Services own persistence and orchestration and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hashed = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hashed.hash, &hashed.salt));
//! ```
//!
//! ## Lockout
//! ```
//! use auth::{LockoutOutcome, LockoutPolicy, LockoutState};
//! use chrono::Utc;
//!
//! let policy = LockoutPolicy::default();
//! let (state, outcome) = policy.transition(LockoutState::default(), false, Utc::now());
//! assert_eq!(outcome, LockoutOutcome::InvalidCredentials);
//! assert_eq!(state.failed_attempt_count, 1);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenIssuer, TokenSettings, TokenSubject};
//!
//! struct Alice;
//!
//! impl TokenSubject for Alice {
//!     fn subject_id(&self) -> String { "42".into() }
//!     fn display_name(&self) -> String { "Alice".into() }
//!     fn email(&self) -> String { "alice@example.com".into() }
//!     fn role(&self) -> String { "User".into() }
//! }
//!
//! let issuer = TokenIssuer::new(TokenSettings {
//!     secret: "secret_key_at_least_16_bytes".into(),
//!     issuer: "accounts".into(),
//!     audience: "api".into(),
//!     lifetime: chrono::Duration::hours(1),
//! })
//! .unwrap();
//!
//! let token = issuer.issue(&Alice).unwrap();
//! let claims = issuer.validate(&token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod crypto;
pub mod jwt;
pub mod lockout;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenIssuer;
pub use jwt::TokenSettings;
pub use jwt::TokenSubject;
pub use lockout::LockoutOutcome;
pub use lockout::LockoutPolicy;
pub use lockout::LockoutState;
pub use password::HashedPassword;
pub use password::PasswordError;
pub use password::PasswordHasher;
