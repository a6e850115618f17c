//! JSON-file backed [`ConfigStore`].
//!
//! Resolution order for each key: environment (`WIO_<KEY>`) over the
//! config file over built-in defaults. A missing file is not an error;
//! the first `persist` creates it.

use std::io::Write;
use std::path::{Path, PathBuf};

use wio_domain::config::{Config, ConfigKey, ConfigStore};
use wio_domain::error::{Error, Result};

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "WIO_CONFIG";

#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    config: Config,
}

impl FileConfigStore {
    /// `~/.wio/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".into()))?;
        Ok(home.join(".wio").join("config.json"))
    }

    /// Read `path` if it exists, otherwise start from defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Config::default()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?
            }
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Config::default()
        };

        Ok(Self { path, config })
    }

    /// Apply `WIO_<KEY>` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup, keyed by env var name.
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for key in ConfigKey::ALL {
            if let Some(value) = lookup(&key.env_var()).filter(|v| !v.is_empty()) {
                tracing::debug!(key = key.as_str(), "config value taken from environment");
                self.config.set(key, value);
            }
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Atomic write: temp file + rename, owner-only permissions since the
    /// file holds the auth token.
    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let body = serde_json::to_string_pretty(&self.config)
            .map_err(|e| Error::Config(format!("serializing config: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        write_private(&tmp_path, body.as_bytes())?;
        std::fs::rename(&tmp_path, &self.path)?;
        tracing::info!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Write `body` to a freshly created file that is owner-only from the
/// moment it exists.
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    // A leftover file would keep its old mode; `mode` only applies on create.
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let mut file = opts.open(path)?;
    file.write_all(body)?;
    file.sync_all()
}
