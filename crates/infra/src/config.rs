//! Configuration loading from environment variables.

use std::time::Duration;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Third-party bank lookup settings. Lookups fail with an external-service
/// error while `base_url` is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankApiConfig {
    pub base_url: Option<String>,
    pub secret: Option<String>,
    pub timeout: Duration,
}

/// Superadmin created at startup when no account uses `email` yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: chrono::Duration,
    pub refresh_token_ttl: chrono::Duration,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Amount credited to a referrer's wallet per successful referral.
    pub referral_reward: i64,
    pub bank: BankApiConfig,
    pub bootstrap_admin: Option<AdminBootstrap>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: chrono::Duration::seconds(900),
            refresh_token_ttl: chrono::Duration::seconds(604_800),
            database_url: None,
            database_max_connections: 10,
            referral_reward: 100,
            bank: BankApiConfig {
                base_url: None,
                secret: None,
                timeout: Duration::from_secs(10),
            },
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let access_secs = number::<i64>(get("ACCESS_TOKEN_TTL_SECS"), "ACCESS_TOKEN_TTL_SECS")?;
        let refresh_secs = number::<i64>(get("REFRESH_TOKEN_TTL_SECS"), "REFRESH_TOKEN_TTL_SECS")?;
        let max_connections = number::<u32>(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS")?;
        let referral_reward = number::<i64>(get("REFERRAL_REWARD"), "REFERRAL_REWARD")?;
        let bank_timeout = number::<u64>(get("BANK_API_TIMEOUT_SECS"), "BANK_API_TIMEOUT_SECS")?;

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_EMAIL"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    var: "BOOTSTRAP_ADMIN_PASSWORD",
                    expected: "set together with BOOTSTRAP_ADMIN_EMAIL",
                    value: String::new(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    var: "BOOTSTRAP_ADMIN_EMAIL",
                    expected: "set together with BOOTSTRAP_ADMIN_PASSWORD",
                    value: String::new(),
                });
            }
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            jwt_secret,
            access_token_ttl: positive_secs(access_secs, "ACCESS_TOKEN_TTL_SECS")?
                .unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: positive_secs(refresh_secs, "REFRESH_TOKEN_TTL_SECS")?
                .unwrap_or(defaults.refresh_token_ttl),
            database_url: get("DATABASE_URL"),
            database_max_connections: max_connections.unwrap_or(defaults.database_max_connections),
            referral_reward: match referral_reward {
                Some(v) if v < 0 => {
                    return Err(ConfigError::Invalid {
                        var: "REFERRAL_REWARD",
                        expected: "a non-negative integer",
                        value: v.to_string(),
                    });
                }
                Some(v) => v,
                None => defaults.referral_reward,
            },
            bank: BankApiConfig {
                base_url: get("BANK_API_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
                secret: get("BANK_API_SECRET"),
                timeout: bank_timeout.map(Duration::from_secs).unwrap_or(defaults.bank.timeout),
            },
            bootstrap_admin,
        })
    }
}

fn number<T: core::str::FromStr>(raw: Option<String>, var: &'static str) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value.parse::<T>().map_err(|_| ConfigError::Invalid {
            var,
            expected: "an integer",
            value,
        })
    })
    .transpose()
}

fn positive_secs(secs: Option<i64>, var: &'static str) -> Result<Option<chrono::Duration>, ConfigError> {
    match secs {
        Some(s) if s <= 0 => Err(ConfigError::Invalid {
            var,
            expected: "a positive number of seconds",
            value: s.to_string(),
        }),
        Some(s) => Ok(Some(chrono::Duration::seconds(s))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn values_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("ACCESS_TOKEN_TTL_SECS", "60"),
            ("DATABASE_URL", "postgres://localhost/refhub"),
            ("REFERRAL_REWARD", "250"),
            ("BANK_API_BASE_URL", "https://bank.test/"),
            ("BANK_API_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.access_token_ttl, chrono::Duration::seconds(60));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/refhub"));
        assert_eq!(config.referral_reward, 250);
        assert_eq!(config.bank.base_url.as_deref(), Some("https://bank.test"));
        assert_eq!(config.bank.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "DATABASE_MAX_CONNECTIONS", .. }));

        assert!(AppConfig::from_lookup(lookup(&[("ACCESS_TOKEN_TTL_SECS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("REFERRAL_REWARD", "-5")])).is_err());
    }

    #[test]
    fn bootstrap_admin_needs_both_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BOOTSTRAP_ADMIN_EMAIL", "root@refhub.io"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "change-me-now"),
        ]))
        .unwrap();
        assert_eq!(
            config.bootstrap_admin,
            Some(AdminBootstrap {
                email: "root@refhub.io".to_string(),
                password: "change-me-now".to_string(),
            })
        );

        let err = AppConfig::from_lookup(lookup(&[("BOOTSTRAP_ADMIN_EMAIL", "root@refhub.io")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BOOTSTRAP_ADMIN_PASSWORD", .. }));
    }
}
