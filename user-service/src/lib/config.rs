use std::env;

use auth::LockoutPolicy;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::user::models::CreateCredentialCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PasswordLength;

/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_LIFETIME_MINUTES: i64 = 60 * 24 * 365;

/// Longest accepted lock window (one day).
pub const MAX_LOCKOUT_SECONDS: i64 = 60 * 60 * 24;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_minutes: i64,
}

impl JwtConfig {
    pub fn token_settings(&self) -> Result<TokenSettings, ConfigError> {
        if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&self.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must be between 1 and {}, got {}",
                MAX_TOKEN_LIFETIME_MINUTES, self.expiration_minutes
            )));
        }

        Ok(TokenSettings {
            secret: self.secret.clone(),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            lifetime: chrono::Duration::minutes(self.expiration_minutes),
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LockoutConfig {
    pub max_failed_attempts: u32,
    pub duration_seconds: i64,
}

impl LockoutConfig {
    pub fn policy(&self) -> Result<LockoutPolicy, ConfigError> {
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::Message(
                "lockout.max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_LOCKOUT_SECONDS).contains(&self.duration_seconds) {
            return Err(ConfigError::Message(format!(
                "lockout.duration_seconds must be between 1 and {}, got {}",
                MAX_LOCKOUT_SECONDS, self.duration_seconds
            )));
        }

        Ok(LockoutPolicy::new(
            self.max_failed_attempts,
            chrono::Duration::seconds(self.duration_seconds),
        ))
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        let policy = LockoutPolicy::default();
        Self {
            max_failed_attempts: policy.max_failed_attempts(),
            duration_seconds: policy.lockout_duration().num_seconds(),
        }
    }
}

/// Administrator account created at startup when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminConfig {
    pub fn command(&self) -> Result<CreateCredentialCommand, ConfigError> {
        let name = DisplayName::new(self.name.clone())
            .map_err(|e| ConfigError::Message(format!("admin.name: {}", e)))?;
        let email = EmailAddress::new(self.email.clone())
            .map_err(|e| ConfigError::Message(format!("admin.email: {}", e)))?;
        PasswordLength::check(&self.password)
            .map_err(|e| ConfigError::Message(format!("admin.password: {}", e)))?;

        Ok(CreateCredentialCommand::new(name, email, self.password.clone()))
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(expiration_minutes: i64) -> JwtConfig {
        JwtConfig {
            secret: "a-secret-of-enough-length".to_string(),
            issuer: "iss".to_string(),
            audience: "aud".to_string(),
            expiration_minutes,
        }
    }

    fn lockout(max_failed_attempts: u32, duration_seconds: i64) -> LockoutConfig {
        LockoutConfig {
            max_failed_attempts,
            duration_seconds,
        }
    }

    #[test]
    fn test_lockout_defaults_match_policy() {
        let policy = LockoutConfig::default().policy().unwrap();
        assert_eq!(policy, LockoutPolicy::default());
    }

    #[test]
    fn test_lockout_window_out_of_range() {
        assert!(lockout(5, 0).policy().is_err());
        assert!(lockout(5, -30).policy().is_err());
        assert!(lockout(5, MAX_LOCKOUT_SECONDS + 1).policy().is_err());
        assert!(lockout(5, i64::MAX).policy().is_err());
        assert!(lockout(5, MAX_LOCKOUT_SECONDS).policy().is_ok());
    }

    #[test]
    fn test_lockout_zero_attempts_rejected() {
        assert!(lockout(0, 120).policy().is_err());
    }

    #[test]
    fn test_token_settings_lifetime() {
        let settings = jwt(90).token_settings().unwrap();
        assert_eq!(settings.lifetime, chrono::Duration::minutes(90));
        assert_eq!(settings.issuer, "iss");
    }

    #[test]
    fn test_token_lifetime_out_of_range() {
        assert!(jwt(0).token_settings().is_err());
        assert!(jwt(-1).token_settings().is_err());
        assert!(jwt(MAX_TOKEN_LIFETIME_MINUTES + 1).token_settings().is_err());
        assert!(jwt(i64::MAX).token_settings().is_err());
    }

    #[test]
    fn test_admin_command_validates_fields() {
        let admin = AdminConfig {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin-secret".to_string(),
        };
        let command = admin.command().unwrap();
        assert_eq!(command.email.as_str(), "admin@example.com");

        let short = AdminConfig {
            password: "123".to_string(),
            ..admin.clone()
        };
        assert!(short.command().is_err());

        let bad_email = AdminConfig {
            email: "nope".to_string(),
            ..admin
        };
        assert!(bad_email.command().is_err());
    }
}
