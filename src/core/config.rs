//! Configuration - Type-safe, runtime-configurable client settings
//!
//! Non-secret settings load from `config.toml`. Credentials and comp ids come
//! from the environment (a `.env` file is honoured by the binary).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{Error, Result};

pub const DEFAULT_TARGET_COMP_ID: &str = "COIN";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session identity
    #[serde(default)]
    pub session: SessionConfig,

    /// Order cache
    #[serde(default)]
    pub orders: OrderCacheConfig,

    /// VWAP order defaults
    #[serde(default)]
    pub vwap: VwapConfig,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// SenderCompID (service account id)
    #[serde(default)]
    pub sender_comp_id: String,

    /// TargetCompID
    #[serde(default = "default_target_comp_id")]
    pub target_comp_id: String,

    /// Portfolio placed in the Account field
    #[serde(default)]
    pub portfolio_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCacheConfig {
    /// Flat JSON mirror of the order cache
    #[serde(default = "default_order_file")]
    pub file: PathBuf,

    /// Fold every execution report into the cache, not only the first OrderId assignment
    #[serde(default)]
    pub track_full_lifecycle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VwapConfig {
    /// Fixed expiry applied when a VWAP order omits one (`YYYY-MM-DDTHH:MM:SSZ`)
    #[serde(default)]
    pub default_expiry: Option<String>,

    /// Relative expiry used when no fixed expiry is configured
    #[serde(default = "default_expiry_hours")]
    pub default_expiry_hours: u32,
}

fn default_log_filter() -> String {
    "info,fix_client=debug".to_string()
}
fn default_target_comp_id() -> String {
    DEFAULT_TARGET_COMP_ID.to_string()
}
fn default_order_file() -> PathBuf {
    PathBuf::from("orders.json")
}
fn default_expiry_hours() -> u32 {
    24
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            orders: OrderCacheConfig::default(),
            vwap: VwapConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sender_comp_id: String::new(),
            target_comp_id: default_target_comp_id(),
            portfolio_id: String::new(),
        }
    }
}

impl Default for OrderCacheConfig {
    fn default() -> Self {
        Self {
            file: default_order_file(),
            track_full_lifecycle: false,
        }
    }
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self {
            default_expiry: None,
            default_expiry_hours: default_expiry_hours(),
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load `config.toml` from the working directory, falling back to defaults.
    ///
    /// The load error is handed back so it can be logged once tracing is up.
    pub fn load_default() -> (Self, Option<Error>) {
        Self::load_or_default(Path::new("config.toml"))
    }

    pub fn load_or_default(path: &Path) -> (Self, Option<Error>) {
        match Self::load(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Overlay session identity from `SVC_ACCOUNT_ID`, `TARGET_COMP_ID` and `PORTFOLIO_ID`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("SVC_ACCOUNT_ID") {
            self.session.sender_comp_id = v;
        }
        if let Some(v) = non_empty("TARGET_COMP_ID") {
            self.session.target_comp_id = v;
        }
        if let Some(v) = non_empty("PORTFOLIO_ID") {
            self.session.portfolio_id = v;
        }
    }
}

/// API credentials used for the logon signature
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
}

impl Credentials {
    /// Read `ACCESS_KEY`, `SIGNING_KEY` and `PASSPHRASE`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ACCESS_KEY").unwrap_or_default(),
            api_secret: std::env::var("SIGNING_KEY").unwrap_or_default(),
            passphrase: std::env::var("PASSPHRASE").unwrap_or_default(),
        }
    }

    /// Names the environment variables that are still empty.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("ACCESS_KEY", &self.api_key),
            ("SIGNING_KEY", &self.api_secret),
            ("PASSPHRASE", &self.passphrase),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Auth(format!("missing {}", missing.join(", "))))
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg, err) = Config::load_or_default(&dir.path().join("config.toml"));
        assert!(matches!(err, Some(Error::Config(_))));
        assert_eq!(cfg.log_filter, "info,fix_client=debug");

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[session\n").unwrap();
        assert!(matches!(Config::load_or_default(&path).1, Some(Error::Config(_))));

        let path = dir.path().join("good.toml");
        std::fs::write(&path, "log_filter = \"warn\"\n").unwrap();
        let (cfg, err) = Config::load_or_default(&path);
        assert!(err.is_none());
        assert_eq!(cfg.log_filter, "warn");
    }

    #[test]
    fn test_credentials_validate_names_missing() {
        let creds = Credentials {
            api_key: "k".into(),
            ..Default::default()
        };
        match creds.validate() {
            Err(Error::Auth(msg)) => assert_eq!(msg, "missing SIGNING_KEY, PASSPHRASE"),
            other => panic!("unexpected {:?}", other),
        }

        let full = Credentials {
            api_key: "k".into(),
            api_secret: "s".into(),
            passphrase: "p".into(),
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.session.target_comp_id, "COIN");
        assert_eq!(cfg.orders.file, PathBuf::from("orders.json"));
        assert!(!cfg.orders.track_full_lifecycle);
        assert_eq!(cfg.vwap.default_expiry, None);
        assert_eq!(cfg.vwap.default_expiry_hours, 24);
    }

    #[test]
    fn test_parse_sections() {
        let cfg = Config::parse(
            r#"
            log_filter = "warn"

            [session]
            sender_comp_id = "svc-1"
            portfolio_id = "pf-1"

            [orders]
            file = "/tmp/cache.json"
            track_full_lifecycle = true

            [vwap]
            default_expiry = "2030-01-01T00:00:00Z"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_filter, "warn");
        assert_eq!(cfg.session.sender_comp_id, "svc-1");
        assert_eq!(cfg.session.target_comp_id, "COIN");
        assert!(cfg.orders.track_full_lifecycle);
        assert_eq!(cfg.vwap.default_expiry.as_deref(), Some("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        assert!(matches!(Config::parse("session = ["), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overlay_skips_empty_values() {
        let mut cfg = Config::default();
        cfg.apply_vars(|key| match key {
            "SVC_ACCOUNT_ID" => Some("svc-env".to_string()),
            "TARGET_COMP_ID" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.session.sender_comp_id, "svc-env");
        assert_eq!(cfg.session.target_comp_id, "COIN");
    }
}
