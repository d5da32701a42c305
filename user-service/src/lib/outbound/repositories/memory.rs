use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::Credential;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Used by tests and for running the service without PostgreSQL.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateIdentity(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn save_credential(&self, id: &UserId, credential: &Credential) -> Result<(), UserError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.credential = credential.clone();

        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Role;

    fn user(email: &str) -> User {
        User {
            id: UserId::new(),
            name: DisplayName::new("Test User".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            role: Role::User,
            credential: Credential::new(PasswordHasher::new().hash("secret1").unwrap()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("a@x.com")).await.unwrap();

        let by_id = repository.find_by_id(&created.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.id), Some(created.id));

        let by_email = repository.find_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));

        assert!(repository
            .find_by_email("b@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("a@x.com")).await.unwrap();

        let result = repository.create(user("a@x.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateIdentity(_))));
    }

    #[tokio::test]
    async fn test_save_credential() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("a@x.com")).await.unwrap();

        let mut credential = created.credential.clone();
        credential.failed_attempt_count = 2;
        repository
            .save_credential(&created.id, &credential)
            .await
            .unwrap();

        let stored = repository.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.credential.failed_attempt_count, 2);

        let missing = repository.save_credential(&UserId::new(), &credential).await;
        assert!(matches!(missing, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let repository = InMemoryUserRepository::new();
        let first = repository.create(user("a@x.com")).await.unwrap();
        let second = repository.create(user("b@x.com")).await.unwrap();

        let ids: Vec<UserId> = repository.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));

        repository.delete(&first.id).await.unwrap();
        assert!(repository.find_by_id(&first.id).await.unwrap().is_none());
        assert_eq!(repository.list().await.unwrap().len(), 1);

        let missing = repository.delete(&first.id).await;
        assert!(matches!(missing, Err(UserError::NotFound(_))));
    }
}
