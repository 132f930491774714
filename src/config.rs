//! Process configuration: validated once at startup, then passed by
//! reference into the core. Required-field absence surfaces here as a
//! `ConfigError` before any request is made.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::jenkins::{Credentials, JobRequest};
use crate::poll::PollPolicy;

/// Environment variables with this prefix become build parameters, with the
/// prefix stripped: `PARAMETER_ENV=prod` contributes `ENV=prod`.
pub const PARAMETER_PREFIX: &str = "PARAMETER_";

pub const DEFAULT_QUEUE_POLL_INTERVAL: u64 = 2;
pub const DEFAULT_JOB_POLL_INTERVAL: u64 = 5;
pub const DEFAULT_TIMEOUT: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting {name} missing (set --{flag} or {name})")]
    Missing {
        name: &'static str,
        flag: &'static str,
    },

    #[error("invalid Jenkins base URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    #[error("Jenkins base URI {uri:?} cannot carry path segments")]
    NotABase { uri: String },

    #[error("{name} must be a positive number of seconds, got {value}")]
    InvalidSeconds { name: &'static str, value: u64 },

    #[error("invalid parameter {arg:?}: expected KEY=VALUE")]
    InvalidParameter { arg: String },
}

/// Raw option values as collected by the CLI layer, before validation.
#[derive(Debug, Default)]
pub struct RawConfig {
    pub uri: Option<String>,
    pub job: Option<String>,
    pub user: Option<String>,
    pub token: Option<String>,
    pub queue_poll_interval: u64,
    pub job_poll_interval: u64,
    pub timeout: u64,
    pub queue_timeout: Option<u64>,
    pub build_timeout: Option<u64>,
    pub params: Vec<String>,
}

/// Everything the core needs for one trigger-and-wait run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base: Url,
    pub request: JobRequest,
    pub credentials: Credentials,
    pub queue_poll: PollPolicy,
    pub build_poll: PollPolicy,
}

impl Config {
    /// Validates the raw options and collects `PARAMETER_*` entries from the
    /// supplied environment pairs. `--param` flags win over environment
    /// parameters on key collision. Each phase keeps its own timeout; both
    /// default to the shared `timeout` value.
    pub fn resolve(
        raw: RawConfig,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let uri = required(raw.uri, "JENKINS_URI", "uri")?;
        let job = required(raw.job, "JENKINS_JOB", "job")?;
        let user = required(raw.user, "JENKINS_USER", "user")?;
        let token = required(raw.token, "JENKINS_TOKEN", "token")?;

        let base = Url::parse(&uri).map_err(|source| ConfigError::InvalidUri {
            uri: uri.clone(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::NotABase { uri });
        }

        let mut parameters = BTreeMap::new();
        for (key, value) in env {
            if let Some(name) = key.strip_prefix(PARAMETER_PREFIX) {
                if !name.is_empty() {
                    parameters.insert(name.to_string(), value);
                }
            }
        }
        for arg in &raw.params {
            let (key, value) = arg
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| ConfigError::InvalidParameter { arg: arg.clone() })?;
            parameters.insert(key.to_string(), value.to_string());
        }

        let queue_poll = PollPolicy {
            interval: positive_secs("QUEUE_POLL_INTERVAL", raw.queue_poll_interval)?,
            timeout: positive_secs("QUEUE_TIMEOUT", raw.queue_timeout.unwrap_or(raw.timeout))?,
        };
        let build_poll = PollPolicy {
            interval: positive_secs("JOB_POLL_INTERVAL", raw.job_poll_interval)?,
            timeout: positive_secs("JOB_TIMEOUT", raw.build_timeout.unwrap_or(raw.timeout))?,
        };

        Ok(Config {
            base,
            request: JobRequest { job, parameters },
            credentials: Credentials { user, token },
            queue_poll,
            build_poll,
        })
    }
}

fn required(
    value: Option<String>,
    name: &'static str,
    flag: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { name, flag })
}

fn positive_secs(name: &'static str, value: u64) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidSeconds { name, value });
    }
    Ok(Duration::from_secs(value))
}
