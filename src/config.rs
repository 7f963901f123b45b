use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::AuthzError;

const DEFAULT_SESSION_EXP_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<Vec<u8>>, exp_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            exp_hours,
        }
    }

    pub fn from_env() -> Result<Self, AuthzError> {
        let secret = std::env::var("SESSION_SECRET")
            .map_err(|_| AuthzError::configuration("SESSION_SECRET not set"))?;
        if secret.is_empty() {
            return Err(AuthzError::configuration("SESSION_SECRET must not be empty"));
        }
        let exp_hours = parse_exp_hours(std::env::var("SESSION_EXP_HOURS").ok().as_deref())?;

        Ok(Self::new(secret.into_bytes(), exp_hours))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Profile JSON used when the CLI gets neither `--profile` nor `--token`.
    pub default_profile: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            default_profile: std::env::var_os("AUTHZ_PROFILE")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse_exp_hours(raw: Option<&str>) -> Result<i64, AuthzError> {
    match raw {
        None => Ok(DEFAULT_SESSION_EXP_HOURS),
        Some(value) => match value.trim().parse::<i64>() {
            Ok(hours) if hours > 0 => Ok(hours),
            _ => Err(AuthzError::configuration(
                "SESSION_EXP_HOURS must be a positive integer",
            )),
        },
    }
}
