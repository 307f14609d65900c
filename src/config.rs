//! Dashboard configuration.
//!
//! Read from a TOML file, then overridden by environment variables and
//! finally by command-line flags:
//!
//! ```toml
//! port = 8879
//! output_dir = "output"
//!
//! [accidents]
//! path = "data/final.csv"
//! encoding = "cp949"
//! seasonal_basis = "deaths-per-traffic"
//!
//! [[black_spots]]
//! id = "black-spot-2021"
//! label = "21년 블랙스팟"
//! path = "data/black_spot_2021.csv"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing::debug;

use crate::analyzers::SeasonalBasis;
use crate::dashboard::DEATH_ANALYSIS_MAP;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

pub const PORT_ENV: &str = "DASHBOARD_PORT";
pub const DATA_PATH_ENV: &str = "DASHBOARD_DATA_PATH";
pub const USERNAME_ENV: &str = "DASHBOARD_USERNAME";
pub const PASSWORD_ENV: &str = "DASHBOARD_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub accidents: AccidentSource,
    #[serde(default)]
    pub black_spots: Vec<BlackSpotSource>,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccidentSource {
    #[serde(default = "default_accidents_path")]
    pub path: String,
    #[serde(default = "default_accidents_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub seasonal_basis: SeasonalBasis,
    #[serde(default = "default_map_label")]
    pub map_label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlackSpotSource {
    pub id: String,
    pub label: String,
    pub path: String,
    #[serde(default = "default_black_spot_encoding")]
    pub encoding: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn default_title() -> String {
    "고속도로 사망교통사고 분석".to_string()
}

fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8879
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_accidents_path() -> String {
    "data/final.csv".to_string()
}

fn default_accidents_encoding() -> String {
    "cp949".to_string()
}

fn default_black_spot_encoding() -> String {
    "utf-8".to_string()
}

fn default_map_label() -> String {
    "사망지점 분석".to_string()
}

impl Default for AccidentSource {
    fn default() -> Self {
        Self {
            path: default_accidents_path(),
            encoding: default_accidents_encoding(),
            seasonal_basis: SeasonalBasis::default(),
            map_label: default_map_label(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: String::new(),
            bind_addr: default_bind_addr(),
            port: default_port(),
            output_dir: default_output_dir(),
            accidents: AccidentSource::default(),
            black_spots: Vec::new(),
            credentials: None,
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every black-spot id is usable as a `charts` query value,
    /// a map route and a file name: non-empty ASCII letters, digits, `-` or
    /// `_`, unique, and distinct from the casualty map id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for source in &self.black_spots {
            let id = source.id.as_str();
            if id.is_empty()
                || !id
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            {
                anyhow::bail!(
                    "Black-spot id '{id}' must be non-empty and use only ASCII letters, digits, '-' or '_'"
                );
            }
            if id == DEATH_ANALYSIS_MAP {
                anyhow::bail!("Black-spot id '{id}' is reserved for the casualty map");
            }
            if !seen.insert(id) {
                anyhow::bail!("Duplicate black-spot id '{id}'");
            }
        }
        Ok(())
    }

    /// Loads the config from the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Loads `path` if it exists, otherwise starts from the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Credentials are only replaced when
    /// both username and password are present.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: '{port}'"))?;
        }
        if let Some(path) = lookup(DATA_PATH_ENV) {
            self.accidents.path = path;
        }
        if let (Some(username), Some(password)) = (lookup(USERNAME_ENV), lookup(PASSWORD_ENV)) {
            self.credentials = Some(Credentials { username, password });
        }
        Ok(())
    }

    /// Applies command-line overrides, which win over file and environment.
    pub fn apply_cli(&mut self, port: Option<u16>, data: Option<String>) {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(data) = data {
            self.accidents.path = data;
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
