use std::sync::Arc;

use async_trait::async_trait;
use auth::LockoutOutcome;
use auth::LockoutPolicy;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::user::locks::IdentityLocks;
use crate::domain::user::models::CreateCredentialCommand;
use crate::domain::user::models::Credential;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::AuthenticationServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for credential operations.
///
/// Owns every mutation of a user's credential. Lookup, verification and the
/// write-back for one email run under that email's lock, so concurrent
/// attempts are counted exactly.
pub struct AuthenticationService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    lockout_policy: LockoutPolicy,
    identity_locks: IdentityLocks,
}

impl<UR> AuthenticationService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `lockout_policy` - Failed-attempt threshold and lock window
    pub fn new(repository: Arc<UR>, lockout_policy: LockoutPolicy) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
            lockout_policy,
            identity_locks: IdentityLocks::new(),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound(email.to_string()))
    }

    /// Register the bootstrap administrator unless the email is already taken.
    ///
    /// An existing account is returned unchanged, whatever its role.
    pub async fn ensure_admin(&self, command: CreateCredentialCommand) -> Result<User, UserError> {
        match self.create_credential(command.with_role(Role::Admin)).await {
            Err(UserError::DuplicateIdentity(email)) => {
                let user = self.find_by_email(&email).await?;
                if user.role != Role::Admin {
                    tracing::warn!(
                        user_id = %user.id,
                        role = %user.role,
                        "Bootstrap administrator email belongs to a non-admin account"
                    );
                }
                Ok(user)
            }
            result => result,
        }
    }
}

#[async_trait]
impl<UR> AuthenticationServicePort for AuthenticationService<UR>
where
    UR: UserRepository,
{
    async fn create_credential(&self, command: CreateCredentialCommand) -> Result<User, UserError> {
        let _guard = self.identity_locks.acquire(command.email.as_str()).await;

        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            tracing::warn!(email = %command.email, "Registration rejected, email already taken");
            return Err(UserError::DuplicateIdentity(command.email.to_string()));
        }

        let hashed = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            role: command.role,
            credential: Credential::new(hashed),
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let _guard = self.identity_locks.acquire(email).await;

        let mut user = self.find_by_email(email).await.map_err(|e| {
            if let UserError::NotFound(_) = e {
                tracing::warn!(email = %email, "Authentication for unknown email");
            }
            e
        })?;

        let verified = self.password_hasher.verify(
            password,
            user.credential.password_hash(),
            user.credential.password_salt(),
        );

        let (state, outcome) =
            self.lockout_policy
                .transition(user.credential.lockout_state(), verified, Utc::now());
        user.credential.apply_lockout_state(state);

        self.repository
            .save_credential(&user.id, &user.credential)
            .await?;

        match outcome {
            LockoutOutcome::Authenticated => {
                tracing::info!(user_id = %user.id, "User authenticated");
                Ok(user)
            }
            LockoutOutcome::InvalidCredentials => {
                tracing::warn!(
                    user_id = %user.id,
                    failed_attempt_count = state.failed_attempt_count,
                    "Failed login attempt"
                );
                Err(UserError::AuthenticationFailed(email.to_string()))
            }
            LockoutOutcome::AccountLocked { until } => {
                tracing::warn!(
                    user_id = %user.id,
                    failed_attempt_count = state.failed_attempt_count,
                    locked_until = %until,
                    "Account locked after too many failed login attempts"
                );
                Err(UserError::AccountLocked { until })
            }
        }
    }

    async fn update_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool, UserError> {
        let _guard = self.identity_locks.acquire(email).await;

        let mut user = self.find_by_email(email).await?;

        if !self.password_hasher.verify(
            old_password,
            user.credential.password_hash(),
            user.credential.password_salt(),
        ) {
            tracing::warn!(user_id = %user.id, "Password change rejected, old password mismatch");
            return Ok(false);
        }

        let hashed = self.password_hasher.hash(new_password)?;
        user.credential.replace_password(hashed);

        self.repository
            .save_credential(&user.id, &user.credential)
            .await?;
        tracing::info!(user_id = %user.id, "Password updated");

        Ok(true)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list().await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        let user = self.get_user(id).await?;
        let _guard = self.identity_locks.acquire(user.email.as_str()).await;

        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}
