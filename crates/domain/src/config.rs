use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// UDP listener exposed by a Wio device while it is in AP mode.
pub const DEFAULT_DEVICE_ADDR: &str = "192.168.4.1:1025";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolved settings for one CLI invocation.
///
/// Field names on disk keep the keys written by earlier releases of the
/// tool (`mserver`, `key`, `sn`, ...) so existing config files load as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Management server base URL, e.g. `https://us.wio.seeed.io`.
    #[serde(rename = "mserver", default)]
    pub host: String,
    /// Server IP handed to devices during provisioning.
    #[serde(rename = "mserver_ip", default)]
    pub host_ip: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub email: String,
    /// Key of the most recently created node.
    #[serde(rename = "key", default)]
    pub node_key: String,
    /// Serial number of the most recently created node.
    #[serde(rename = "sn", default)]
    pub node_serial: String,
    #[serde(default = "d_30000")]
    pub http_timeout_ms: u64,
    #[serde(default = "d_10000")]
    pub provision_timeout_ms: u64,
    #[serde(default = "d_device_addr")]
    pub device_addr: String,
    /// Keys this release does not know (e.g. `loglevel`), kept so they
    /// survive a rewrite of the file.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            host_ip: String::new(),
            token: String::new(),
            email: String::new(),
            node_key: String::new(),
            node_serial: String::new(),
            http_timeout_ms: 30_000,
            provision_timeout_ms: 10_000,
            device_addr: d_device_addr(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Config {
    /// String value stored under `key`.
    pub fn get(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::Host => &self.host,
            ConfigKey::HostIp => &self.host_ip,
            ConfigKey::Token => &self.token,
            ConfigKey::Email => &self.email,
            ConfigKey::NodeKey => &self.node_key,
            ConfigKey::NodeSerial => &self.node_serial,
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        match key {
            ConfigKey::Host => self.host = value,
            ConfigKey::HostIp => self.host_ip = value,
            ConfigKey::Token => self.token = value,
            ConfigKey::Email => self.email = value,
            ConfigKey::NodeKey => self.node_key = value,
            ConfigKey::NodeSerial => self.node_serial = value,
        }
    }

    /// Parse the configured host into an absolute base URL.
    ///
    /// Callers replace the path of the returned URL; anything else the
    /// host carries beyond scheme, authority and port is dropped there.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.host.trim();
        if raw.is_empty() {
            return Err(Error::Config(
                "server host is not set (run `wio user configure`)".into(),
            ));
        }
        let url = Url::parse(raw)
            .map_err(|e| Error::Config(format!("invalid server host {raw:?}: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "server host {raw:?} must be an absolute http(s) URL"
            )));
        }
        Ok(url)
    }

    /// The auth token, or a config error when none has been stored yet.
    pub fn require_token(&self) -> Result<&str> {
        match self.token.trim() {
            "" => Err(Error::Config(
                "no auth token configured (run `wio user login`)".into(),
            )),
            token => Ok(token),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn provision_timeout(&self) -> Duration {
        Duration::from_millis(self.provision_timeout_ms)
    }

    pub fn device_addr(&self) -> Result<SocketAddr> {
        self.device_addr.parse().map_err(|e| {
            Error::Config(format!("invalid device address {:?}: {e}", self.device_addr))
        })
    }

    /// Copy of this config with the token obscured, for display.
    pub fn masked(&self) -> Config {
        let mut out = self.clone();
        if !out.token.is_empty() {
            let tail: String = out
                .token
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            out.token = format!("****{tail}");
        }
        out
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Keys
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// String-keyed settings exposed through [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Host,
    HostIp,
    Token,
    Email,
    NodeKey,
    NodeSerial,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::Host,
        ConfigKey::HostIp,
        ConfigKey::Token,
        ConfigKey::Email,
        ConfigKey::NodeKey,
        ConfigKey::NodeSerial,
    ];

    /// Key name as written in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Host => "mserver",
            ConfigKey::HostIp => "mserver_ip",
            ConfigKey::Token => "token",
            ConfigKey::Email => "email",
            ConfigKey::NodeKey => "key",
            ConfigKey::NodeSerial => "sn",
        }
    }

    /// Environment variable that overrides this key, e.g. `WIO_MSERVER`.
    pub fn env_var(self) -> String {
        format!("WIO_{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown config key {s:?}")))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owner of the [`Config`] for the lifetime of one command.
///
/// Components never hold a store; commands read `config()`, hand a
/// reference to the component constructor, then write results back with
/// `set` and call `persist`.
pub trait ConfigStore {
    fn config(&self) -> &Config;

    fn config_mut(&mut self) -> &mut Config;

    /// Write the current settings to durable storage.
    fn persist(&self) -> Result<()>;

    fn get(&self, key: ConfigKey) -> &str {
        self.config().get(key)
    }

    fn set(&mut self, key: ConfigKey, value: String) {
        self.config_mut().set(key, value);
    }
}

/// In-memory store. `persist` only counts calls.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Config,
    persisted: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            persisted: AtomicUsize::new(0),
        }
    }

    /// Number of times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.persisted.load(Ordering::Relaxed)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn persist(&self) -> Result<()> {
        self.persisted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Err(e) = self.base_url() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: ConfigKey::Host.to_string(),
                message: e.to_string(),
            });
        }

        if self.token.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: ConfigKey::Token.to_string(),
                message: "not logged in; node commands will fail".into(),
            });
        }

        if !self.host_ip.is_empty() && self.host_ip.parse::<std::net::IpAddr>().is_err() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: ConfigKey::HostIp.to_string(),
                message: format!("{:?} is not an IP address", self.host_ip),
            });
        }

        if let Err(e) = self.device_addr() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "device_addr".into(),
                message: e.to_string(),
            });
        }

        if self.http_timeout_ms == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "http_timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        if self.provision_timeout_ms == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "provision_timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        issues
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_30000() -> u64 {
    30_000
}
fn d_10000() -> u64 {
    10_000
}
fn d_device_addr() -> String {
    DEFAULT_DEVICE_ADDR.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_cover_every_key() {
        let mut cfg = Config::default();
        for (i, key) in ConfigKey::ALL.into_iter().enumerate() {
            cfg.set(key, format!("v{i}"));
        }
        for (i, key) in ConfigKey::ALL.into_iter().enumerate() {
            assert_eq!(cfg.get(key), format!("v{i}"));
        }
    }

    #[test]
    fn key_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(key.as_str().parse::<ConfigKey>().unwrap(), key);
        }
        assert!("nope".parse::<ConfigKey>().is_err());
        assert_eq!(ConfigKey::HostIp.env_var(), "WIO_MSERVER_IP");
    }

    #[test]
    fn base_url_rejects_empty_and_relative_hosts() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.base_url(), Err(Error::Config(_))));

        cfg.host = "wio.example.com/v1".into();
        assert!(matches!(cfg.base_url(), Err(Error::Config(_))));

        cfg.host = "mailto:someone@example.com".into();
        assert!(matches!(cfg.base_url(), Err(Error::Config(_))));

        cfg.host = "https://wio.example.com".into();
        assert_eq!(cfg.base_url().unwrap().host_str(), Some("wio.example.com"));
    }

    #[test]
    fn require_token_rejects_blank() {
        let mut cfg = Config::default();
        assert!(cfg.require_token().is_err());
        cfg.token = "   ".into();
        assert!(cfg.require_token().is_err());
        cfg.token = "abc".into();
        assert_eq!(cfg.require_token().unwrap(), "abc");
    }

    #[test]
    fn masked_keeps_only_token_tail() {
        let cfg = Config {
            token: "0123456789abcdef".into(),
            ..Config::default()
        };
        assert_eq!(cfg.masked().token, "****cdef");
        assert_eq!(Config::default().masked().token, "");
    }

    #[test]
    fn memory_store_counts_persists() {
        let mut store = MemoryConfigStore::new(Config::default());
        store.set(ConfigKey::Token, "t".into());
        store.persist().unwrap();
        store.persist().unwrap();
        assert_eq!(store.get(ConfigKey::Token), "t");
        assert_eq!(store.persist_count(), 2);
    }

    #[test]
    fn validate_flags_missing_host_and_token() {
        let issues = Config::default().validate();
        assert!(issues
            .iter()
            .any(|i| i.field == "mserver" && i.severity == ConfigSeverity::Error));
        assert!(issues
            .iter()
            .any(|i| i.field == "token" && i.severity == ConfigSeverity::Warning));
    }

    #[test]
    fn validate_passes_complete_config() {
        let cfg = Config {
            host: "https://wio.example.com".into(),
            host_ip: "10.0.0.5".into(),
            token: "t".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_empty());
    }
}
