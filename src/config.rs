//! Runtime configuration, read from `OVERRIDE_BOT_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::webhooks::WebhookSecret;

pub const ENV_LISTEN_ADDR: &str = "OVERRIDE_BOT_LISTEN_ADDR";
pub const ENV_WEBHOOK_SECRET: &str = "OVERRIDE_BOT_WEBHOOK_SECRET";
pub const ENV_GITHUB_TOKEN: &str = "OVERRIDE_BOT_GITHUB_TOKEN";
pub const ENV_PRESUBMIT_CONFIG: &str = "OVERRIDE_BOT_PRESUBMIT_CONFIG";
pub const ENV_JOB_DIR: &str = "OVERRIDE_BOT_JOB_DIR";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_JOB_DIR: &str = "./jobs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid socket address: {value:?}")]
    InvalidAddr { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub webhook_secret: WebhookSecret,
    pub github_token: String,
    /// Presubmit definitions file. Without one, overrides only rewrite statuses.
    pub presubmit_config: Option<PathBuf>,
    pub job_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let addr = get(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: ENV_LISTEN_ADDR,
            value: addr.clone(),
        })?;

        Ok(Config {
            listen_addr,
            webhook_secret: WebhookSecret::new(require(ENV_WEBHOOK_SECRET)?),
            github_token: require(ENV_GITHUB_TOKEN)?,
            presubmit_config: get(ENV_PRESUBMIT_CONFIG).map(PathBuf::from),
            job_dir: get(ENV_JOB_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JOB_DIR)),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("webhook_secret", &self.webhook_secret)
            .field("github_token", &"<redacted>")
            .field("presubmit_config", &self.presubmit_config)
            .field("job_dir", &self.job_dir)
            .finish()
    }
}
