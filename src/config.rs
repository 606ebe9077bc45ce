//! Runtime configuration: compiled defaults, an optional `gateway.toml`,
//! then `HOST`/`PORT`/`DEBUG`/`DB_NAME`/`UPSTREAM_TIMEOUT`/`BODY_LIMIT`
//! from the environment. Env values are parsed as literals, so `PORT=9000`
//! is a number and `DEBUG=true` a boolean.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GatewayError;

pub const CONFIG_FILE: &str = "gateway.toml";

const ENV_KEYS: [&str; 6] = [
    "host",
    "port",
    "debug",
    "db_name",
    "upstream_timeout",
    "body_limit",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Path of the SQLite credential database.
    pub db_name: String,
    /// Upper bound for one upstream call, in seconds.
    pub upstream_timeout: u64,
    /// Largest inbound body buffered for forwarding, in bytes.
    pub body_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            db_name: "gateway.db".to_string(),
            upstream_timeout: 30,
            body_limit: 32 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw().only(&ENV_KEYS))
    }

    pub fn load() -> Result<Self, GatewayError> {
        let cfg: Self = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// A zero upstream timeout would fail every forward, so it is refused.
    pub fn validate(&self) -> Result<(), figment::Error> {
        if self.upstream_timeout == 0 {
            return Err(figment::Error::from(
                "upstream_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    pub fn loglevel(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
