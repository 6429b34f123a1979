//! API server configuration.
//!
//! Everything that differs between deployments (signing secret, cookie
//! attributes, allowed origins) is read here at startup and is read-only
//! afterwards.

use axum::http::HeaderValue;
use axum_extra::extract::cookie::SameSite;
use chrono::Duration;
use fintrack_core::auth::jwt::{DEFAULT_TOKEN_LIFETIME_SECS, MIN_SECRET_LEN, TokenService};
use fintrack_core::auth::password::{
    DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST, PasswordHasher,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Upper bound for `TOKEN_TTL_SECS`: 30 days.
const MAX_TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.into(),
    }
}

/// Attributes applied to the session cookie.
#[derive(Clone, Debug, PartialEq)]
pub struct CookieConfig {
    /// `Domain` attribute; `None` produces a host-only cookie.
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// JWT signing secret.
    pub jwt_secret: SecretString,
    /// Session token lifetime in seconds.
    pub token_lifetime_secs: i64,
    /// bcrypt cost factor.
    pub bcrypt_cost: u32,
    pub cookie: CookieConfig,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_allowed_origins: Vec<String>,
}

impl ApiConfig {
    /// Config with defaults for everything but the secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::from(jwt_secret.into()),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            cookie: CookieConfig::default(),
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable               | Default                          |
    /// |------------------------|----------------------------------|
    /// | `JWT_SECRET`           | required, at least 32 bytes      |
    /// | `TOKEN_TTL_SECS`       | `86400`                          |
    /// | `BCRYPT_COST`          | `10`                             |
    /// | `COOKIE_DOMAIN`        | unset (host-only cookie)         |
    /// | `COOKIE_SECURE`        | `true`                           |
    /// | `COOKIE_SAME_SITE`     | `lax` (`strict`, `none`)         |
    /// | `CORS_ALLOWED_ORIGINS` | empty (comma separated list)     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_SECRET_LEN} bytes"),
            ));
        }

        let token_lifetime_secs = match get("TOKEN_TTL_SECS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_TOKEN_LIFETIME_SECS).contains(secs))
                .ok_or_else(|| {
                    invalid(
                        "TOKEN_TTL_SECS",
                        format!("must be between 1 and {MAX_TOKEN_LIFETIME_SECS}"),
                    )
                })?,
            None => DEFAULT_TOKEN_LIFETIME_SECS,
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|cost| (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(cost))
                .ok_or_else(|| {
                    invalid(
                        "BCRYPT_COST",
                        format!("must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"),
                    )
                })?,
            None => DEFAULT_BCRYPT_COST,
        };

        let secure = match get("COOKIE_SECURE") {
            Some(v) => parse_bool(&v).ok_or_else(|| invalid("COOKIE_SECURE", "expected true/false"))?,
            None => true,
        };

        let same_site = match get("COOKIE_SAME_SITE") {
            Some(v) => parse_same_site(&v)
                .ok_or_else(|| invalid("COOKIE_SAME_SITE", "expected lax, strict or none"))?,
            None => SameSite::Lax,
        };

        let cookie = CookieConfig {
            domain: get("COOKIE_DOMAIN"),
            secure,
            same_site,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_lifetime_secs,
            bcrypt_cost,
            cookie,
            cors_allowed_origins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks shared by every construction path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie.same_site == SameSite::None && !self.cookie.secure {
            return Err(invalid(
                "COOKIE_SAME_SITE",
                "SameSite=None requires COOKIE_SECURE=true",
            ));
        }
        for origin in &self.cors_allowed_origins {
            if origin == "*" {
                return Err(invalid(
                    "CORS_ALLOWED_ORIGINS",
                    "wildcard not allowed with credentials",
                ));
            }
            if HeaderValue::from_str(origin).is_err() {
                return Err(invalid(
                    "CORS_ALLOWED_ORIGINS",
                    format!("not a valid origin: {origin}"),
                ));
            }
        }
        Ok(())
    }

    /// Build the token service for this configuration.
    pub fn token_service(&self) -> Result<TokenService, ConfigError> {
        TokenService::new(
            self.jwt_secret.expose_secret().as_bytes(),
            Duration::seconds(self.token_lifetime_secs),
        )
        .map_err(|e| invalid("JWT_SECRET", e.to_string()))
    }

    /// Build the password hasher for this configuration.
    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::with_cost(self.bcrypt_cost).map_err(|e| invalid("BCRYPT_COST", e.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "JWT_SECRET", .. }));
    }

    #[test]
    fn defaults_apply() {
        let config = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(config.jwt_secret.expose_secret(), SECRET);
        assert_eq!(config.token_lifetime_secs, 86_400);
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.cookie, CookieConfig::default());
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.token_service().is_ok());
        assert_eq!(config.password_hasher().unwrap().cost(), 10);
    }

    #[test]
    fn cookie_and_cors_settings_are_read() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("COOKIE_DOMAIN", "api.fintrack.test"),
            ("COOKIE_SECURE", "true"),
            ("COOKIE_SAME_SITE", "None"),
            (
                "CORS_ALLOWED_ORIGINS",
                "https://app.fintrack.test, http://localhost:5173,",
            ),
            ("TOKEN_TTL_SECS", "3600"),
            ("BCRYPT_COST", "12"),
        ]))
        .unwrap();
        assert_eq!(config.cookie.domain.as_deref(), Some("api.fintrack.test"));
        assert!(config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::None);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://app.fintrack.test", "http://localhost:5173"]
        );
        assert_eq!(config.token_lifetime_secs, 3600);
        assert_eq!(config.bcrypt_cost, 12);
    }

    #[test]
    fn same_site_none_requires_secure() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("COOKIE_SECURE", "false"),
            ("COOKIE_SAME_SITE", "none"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "COOKIE_SAME_SITE", .. }));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        for (key, value) in [
            ("TOKEN_TTL_SECS", "0"),
            ("TOKEN_TTL_SECS", "soon"),
            ("TOKEN_TTL_SECS", "99999999999"),
            ("BCRYPT_COST", "3"),
            ("BCRYPT_COST", "40"),
            ("COOKIE_SECURE", "maybe"),
            ("COOKIE_SAME_SITE", "sometimes"),
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("CORS_ALLOWED_ORIGINS", "https://app.fintrack.test,*"),
        ] {
            let result = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), (key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn from_env_reads_process_environment() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("COOKIE_SAME_SITE", Some("strict")),
                ("COOKIE_SECURE", None),
                ("COOKIE_DOMAIN", None),
                ("TOKEN_TTL_SECS", None),
                ("BCRYPT_COST", None),
                ("CORS_ALLOWED_ORIGINS", None),
            ],
            || {
                let config = ApiConfig::from_env().unwrap();
                assert_eq!(config.cookie.same_site, SameSite::Strict);
            },
        );
        temp_env::with_var_unset("JWT_SECRET", || {
            assert!(ApiConfig::from_env().is_err());
        });
    }
}
