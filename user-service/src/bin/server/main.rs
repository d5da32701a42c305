use std::sync::Arc;

use auth::TokenIssuer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::service::AuthenticationService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        jwt_audience = %config.jwt.audience,
        jwt_expiration_minutes = config.jwt.expiration_minutes,
        lockout_max_failed_attempts = config.lockout.max_failed_attempts,
        lockout_duration_seconds = config.lockout.duration_seconds,
        "Configuration loaded"
    );

    let lockout_policy = config.lockout.policy().map_err(|e| {
        tracing::error!(error = %e, "Invalid lockout configuration");
        e
    })?;

    // Refuse to start without a usable signing key
    let token_issuer = Arc::new(TokenIssuer::new(config.jwt.token_settings()?).map_err(|e| {
        tracing::error!(error = %e, "Invalid token configuration");
        e
    })?);

    let admin_command = config.admin.as_ref().map(|a| a.command()).transpose()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let auth_service = Arc::new(AuthenticationService::new(user_repository, lockout_policy));

    if let Some(command) = admin_command {
        let admin = auth_service.ensure_admin(command).await?;
        tracing::info!(user_id = %admin.id, role = %admin.role, "Administrator account ready");
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, token_issuer);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
