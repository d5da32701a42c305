use std::sync::Arc;

use auth::LockoutPolicy;
use auth::TokenIssuer;
use auth::TokenSettings;
use serde_json::json;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use user_service::domain::user::models::CreateCredentialCommand;
use user_service::domain::user::models::DisplayName;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::AuthenticationService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_ISSUER: &str = "user-service-test";
pub const TEST_AUDIENCE: &str = "user-service-test-clients";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin_pass_word!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Option<TestDb>,
    pub api_client: reqwest::Client,
    pub token_issuer: TokenIssuer,
}

/// Test database helper
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    postgres_url: String,
}

fn token_settings() -> TokenSettings {
    TokenSettings {
        secret: TEST_SECRET.to_string(),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        lifetime: chrono::Duration::minutes(60),
    }
}

impl TestApp {
    /// Spawn the application backed by the in-memory store
    pub async fn spawn() -> Self {
        Self::spawn_with_repository(Arc::new(InMemoryUserRepository::new()), None).await
    }

    /// Spawn the application backed by a fresh PostgreSQL database.
    ///
    /// Returns `None` when `DATABASE_URL` is not set.
    pub async fn spawn_with_postgres() -> Option<Self> {
        let db = TestDb::from_env().await?;
        let user_repo = Arc::new(PostgresUserRepository::new(db.pool.clone()));
        Some(Self::spawn_with_repository(user_repo, Some(db)).await)
    }

    async fn spawn_with_repository<R: UserRepository>(
        user_repo: Arc<R>,
        db: Option<TestDb>,
    ) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let auth_service = Arc::new(AuthenticationService::new(
            user_repo,
            LockoutPolicy::default(),
        ));
        auth_service
            .ensure_admin(CreateCredentialCommand::new(
                DisplayName::new("Administrator".to_string()).unwrap(),
                EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                ADMIN_PASSWORD.to_string(),
            ))
            .await
            .expect("Failed to seed administrator");

        let token_issuer =
            Arc::new(TokenIssuer::new(token_settings()).expect("Failed to create token issuer"));

        let router = create_router(auth_service, token_issuer);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            db,
            api_client: reqwest::Client::new(),
            token_issuer: TokenIssuer::new(token_settings())
                .expect("Failed to create token issuer"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and assert the request succeeded
    pub async fn register(&self, name: &str, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/users/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/users/authenticate")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Authenticate and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self.authenticate(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token is a string")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> reqwest::Response {
        self.put("/api/users/reset-password")
            .query(&[("email", email)])
            .json(&json!({
                "old_password": old_password,
                "new_password": new_password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

impl TestDb {
    /// Create a test database on the server named by `DATABASE_URL`, if set
    pub async fn from_env() -> Option<Self> {
        match std::env::var("DATABASE_URL") {
            Ok(postgres_url) => Some(Self::new(postgres_url).await),
            Err(_) => {
                eprintln!("DATABASE_URL is not set, skipping PostgreSQL test");
                None
            }
        }
    }

    /// Create a new test database with a unique name
    pub async fn new(postgres_url: String) -> Self {
        let db_name = format!(
            "test_user_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");

        // Create test database
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        // Connect to the new test database
        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            db_name,
            postgres_url,
        }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let postgres_url = self.postgres_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                // Terminate existing connections
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                // Drop database
                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}
