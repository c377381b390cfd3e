//! Authentication configuration.
//!
//! Signing secrets are never compiled in. They come from the environment, or,
//! when explicitly requested, are generated per process.

use std::fmt;

use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use thiserror::Error;
use tracing::warn;

use crate::auth::password::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

pub const ACCESS_SECRET_VAR: &str = "ACCESS_TOKEN_SECRET";
pub const REFRESH_SECRET_VAR: &str = "REFRESH_TOKEN_SECRET";
pub const ACCESS_TTL_VAR: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_VAR: &str = "REFRESH_TOKEN_TTL_SECS";
pub const BCRYPT_COST_VAR: &str = "BCRYPT_COST";

/// Access token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;

/// Refresh token lifetime: 24 hours.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

/// Configuration errors raised at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingSecret(&'static str),

    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,

    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Secrets, lifetimes and hashing cost for the auth subsystem.
#[derive(Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Config with default lifetimes and cost for the given secrets.
    pub fn with_secrets(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable                 | Default                         |
    /// |--------------------------|---------------------------------|
    /// | `ACCESS_TOKEN_SECRET`    | required (see `ephemeral`)      |
    /// | `REFRESH_TOKEN_SECRET`   | required (see `ephemeral`)      |
    /// | `ACCESS_TOKEN_TTL_SECS`  | `3600`                          |
    /// | `REFRESH_TOKEN_TTL_SECS` | `86400`                         |
    /// | `BCRYPT_COST`            | `10`                            |
    ///
    /// With `ephemeral` set, a missing secret is replaced by a random one
    /// that lives only as long as the process.
    pub fn from_env(ephemeral: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), ephemeral)
    }

    /// Like [`AuthConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F, ephemeral: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = resolve_secret(&lookup, ACCESS_SECRET_VAR, ephemeral)?;
        let refresh_secret = resolve_secret(&lookup, REFRESH_SECRET_VAR, ephemeral)?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let access_ttl = parse_ttl(&lookup, ACCESS_TTL_VAR, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl = parse_ttl(&lookup, REFRESH_TTL_VAR, DEFAULT_REFRESH_TTL_SECS)?;

        let bcrypt_cost = match lookup(BCRYPT_COST_VAR) {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(cost) if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: BCRYPT_COST_VAR,
                        value: raw,
                        reason: "expected an integer between 4 and 31",
                    });
                }
            },
        };

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
            bcrypt_cost,
        })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

fn resolve_secret<F>(lookup: &F, var: &'static str, ephemeral: bool) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(var)
        && !secret.is_empty()
    {
        return Ok(secret);
    }
    if !ephemeral {
        return Err(ConfigError::MissingSecret(var));
    }
    warn!(var, "no secret configured, generated an ephemeral one");
    Ok(rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect())
}

fn parse_ttl<F>(lookup: &F, var: &'static str, default_secs: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(Duration::seconds(default_secs));
    };
    let ttl = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds);
    match ttl {
        // Tokens must get a representable expiry timestamp.
        Some(ttl) if Utc::now().checked_add_signed(ttl).is_some() => Ok(ttl),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw,
            reason: "expected a positive number of seconds",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_secrets_and_defaults() {
        let cfg = AuthConfig::from_lookup(
            lookup(&[(ACCESS_SECRET_VAR, "a"), (REFRESH_SECRET_VAR, "r")]),
            false,
        )
        .unwrap();
        assert_eq!(cfg.access_secret, "a");
        assert_eq!(cfg.refresh_secret, "r");
        assert_eq!(cfg.access_ttl, Duration::hours(1));
        assert_eq!(cfg.refresh_ttl, Duration::hours(24));
        assert_eq!(cfg.bcrypt_cost, 10);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AuthConfig::from_lookup(lookup(&[(ACCESS_SECRET_VAR, "a")]), false).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret(REFRESH_SECRET_VAR));
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let err = AuthConfig::from_lookup(
            lookup(&[(ACCESS_SECRET_VAR, ""), (REFRESH_SECRET_VAR, "r")]),
            false,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret(ACCESS_SECRET_VAR));
    }

    #[test]
    fn identical_secrets_are_rejected() {
        let err = AuthConfig::from_lookup(
            lookup(&[(ACCESS_SECRET_VAR, "same"), (REFRESH_SECRET_VAR, "same")]),
            false,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::SharedSecret);
    }

    #[test]
    fn ephemeral_generates_distinct_secrets() {
        let cfg = AuthConfig::from_lookup(lookup(&[]), true).unwrap();
        assert_eq!(cfg.access_secret.len(), 64);
        assert_eq!(cfg.refresh_secret.len(), 64);
        assert_ne!(cfg.access_secret, cfg.refresh_secret);
    }

    #[test]
    fn ttl_and_cost_overrides() {
        let cfg = AuthConfig::from_lookup(
            lookup(&[
                (ACCESS_SECRET_VAR, "a"),
                (REFRESH_SECRET_VAR, "r"),
                (ACCESS_TTL_VAR, "60"),
                (REFRESH_TTL_VAR, "120"),
                (BCRYPT_COST_VAR, "4"),
            ]),
            false,
        )
        .unwrap();
        assert_eq!(cfg.access_ttl, Duration::seconds(60));
        assert_eq!(cfg.refresh_ttl, Duration::seconds(120));
        assert_eq!(cfg.bcrypt_cost, 4);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let base = [(ACCESS_SECRET_VAR, "a"), (REFRESH_SECRET_VAR, "r")];
        for (var, value) in [
            (ACCESS_TTL_VAR, "0"),
            (REFRESH_TTL_VAR, "soon"),
            (ACCESS_TTL_VAR, "9223372036854775807"),
            (REFRESH_TTL_VAR, "10000000000000"),
            (BCRYPT_COST_VAR, "3"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((var, value));
            let err = AuthConfig::from_lookup(lookup(&pairs), false).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { var: v, .. } if v == var),
                "unexpected error for {var}={value}: {err:?}"
            );
        }
    }

    #[test]
    fn debug_hides_secrets() {
        let cfg = AuthConfig::with_secrets("top-secret-a", "top-secret-r");
        let out = format!("{cfg:?}");
        assert!(!out.contains("top-secret"));
    }
}
