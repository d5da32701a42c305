use async_trait::async_trait;

use crate::domain::user::models::CreateCredentialCommand;
use crate::domain::user::models::Credential;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Register a new user and derive their credential.
    ///
    /// # Arguments
    /// * `command` - Validated name, email and plaintext password
    ///
    /// # Returns
    /// Created user entity with zeroed lockout counters
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `InvalidPassword` - Password is empty
    /// * `DatabaseError` - Database operation failed
    async fn create_credential(&self, command: CreateCredentialCommand) -> Result<User, UserError>;

    /// Verify a password for an identity and apply the lockout policy.
    ///
    /// # Arguments
    /// * `email` - Claimed identity
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// The authenticated user; the caller issues a token for it
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `AuthenticationFailed` - Wrong password, attempt counted
    /// * `AccountLocked` - Wrong password reached the threshold
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError>;

    /// Change a password after verifying the current one.
    ///
    /// # Returns
    /// `false` if `old_password` does not match (no attempt is counted),
    /// `true` once the new password is stored
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `InvalidPassword` - New password is empty
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve every registered user, oldest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Remove a user and its credential.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for the user record.
///
/// Authentication only touches the credential columns after creation.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Overwrite the credential columns of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn save_credential(&self, id: &UserId, credential: &Credential) -> Result<(), UserError>;

    /// Retrieve all users ordered by creation time.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self) -> Result<Vec<User>, UserError>;

    /// Delete user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
