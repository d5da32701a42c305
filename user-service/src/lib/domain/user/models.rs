use std::fmt;
use std::str::FromStr;

use auth::HashedPassword;
use auth::LockoutState;
use auth::TokenSubject;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordLengthError;
use crate::user::errors::RoleError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered user together with the credential used to
/// authenticate them.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub role: Role,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

impl TokenSubject for User {
    fn subject_id(&self) -> String {
        self.id.to_string()
    }

    fn display_name(&self) -> String {
        self.name.as_str().to_string()
    }

    fn email(&self) -> String {
        self.email.as_str().to_string()
    }

    fn role(&self) -> String {
        self.role.to_string()
    }
}

/// Secret-verification material and lockout counters of one user.
///
/// Hash and salt are private so they can only change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    password_hash: Vec<u8>,
    password_salt: Vec<u8>,
    pub failed_attempt_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl Credential {
    /// Fresh credential with zeroed counters.
    pub fn new(hashed: HashedPassword) -> Self {
        Self {
            password_hash: hashed.hash,
            password_salt: hashed.salt,
            failed_attempt_count: 0,
            locked_until: None,
        }
    }

    /// Rebuild a credential from stored columns.
    pub fn from_parts(
        hashed: HashedPassword,
        failed_attempt_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            password_hash: hashed.hash,
            password_salt: hashed.salt,
            failed_attempt_count,
            locked_until,
        }
    }

    pub fn password_hash(&self) -> &[u8] {
        &self.password_hash
    }

    pub fn password_salt(&self) -> &[u8] {
        &self.password_salt
    }

    pub fn lockout_state(&self) -> LockoutState {
        LockoutState {
            failed_attempt_count: self.failed_attempt_count,
            locked_until: self.locked_until,
        }
    }

    pub fn apply_lockout_state(&mut self, state: LockoutState) {
        self.failed_attempt_count = state.failed_attempt_count;
        self.locked_until = state.locked_until;
    }

    /// Swap in a new hash/salt pair. A password change also clears the counters.
    pub fn replace_password(&mut self, hashed: HashedPassword) {
        self.password_hash = hashed.hash;
        self.password_salt = hashed.salt;
        self.apply_lockout_state(LockoutState::default());
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Ensures the name is 2-50 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Name shorter than 2 characters
    /// * `TooLong` - Name longer than 50 characters
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authorization role carried into issued tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Admin => f.write_str("Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

/// Length bounds applied to passwords chosen by a user.
pub struct PasswordLength;

impl PasswordLength {
    pub const MIN: usize = 6;
    pub const MAX: usize = 100;

    /// Check a plaintext password against the length bounds.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    /// * `TooLong` - More than 100 characters
    pub fn check(password: &str) -> Result<(), PasswordLengthError> {
        let length = password.chars().count();
        if length < Self::MIN {
            Err(PasswordLengthError::TooShort {
                min: Self::MIN,
                actual: length,
            })
        } else if length > Self::MAX {
            Err(PasswordLengthError::TooLong {
                max: Self::MAX,
                actual: length,
            })
        } else {
            Ok(())
        }
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct CreateCredentialCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub role: Role,
    pub password: String,
}

impl CreateCredentialCommand {
    /// Construct a new registration command for a regular user.
    ///
    /// # Arguments
    /// * `name` - Validated display name
    /// * `email` - Validated email address, the login identity
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(name: DisplayName, email: EmailAddress, password: String) -> Self {
        Self {
            name,
            email,
            role: Role::User,
            password,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
