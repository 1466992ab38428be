//! Server configuration.
//!
//! Values come from, in increasing priority: built-in defaults, the YAML file
//! named by `FAMFIN_CONFIG`, and individual environment variables.

use anyhow::{Context, Result};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::domain::extraction_service::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};

pub const CONFIG_FILE_VAR: &str = "FAMFIN_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Directory holding one JSON file per collection
    pub data_directory: PathBuf,
    /// Write the demo family on first run
    pub seed_demo_data: bool,
    /// Monthly price of the premium plan
    #[serde(with = "rust_decimal::serde::float")]
    pub subscription_price: Decimal,
    pub payment_delay_ms: u64,
    pub withdrawal_delay_ms: u64,
    /// Lifetime of a login session
    pub session_ttl_hours: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    /// Origin allowed by CORS; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            data_directory: default_data_directory(),
            seed_demo_data: true,
            subscription_price: Decimal::new(1000, 2),
            payment_delay_ms: 2000,
            withdrawal_delay_ms: 1500,
            session_ttl_hours: 24 * 7,
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            cors_origin: None,
        }
    }
}

/// `~/Documents/Familia Fin`, falling back to the home directory
pub fn default_data_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Familia Fin")
}

impl AppConfig {
    /// Build the configuration of this process
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        info!(
            "Configuration: bind {}, data in {:?}, AI {}",
            config.bind_address,
            config.data_directory,
            if config.gemini_api_key.is_some() { "enabled" } else { "disabled" }
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        debug!("Loaded config file {:?}", path);
        Ok(config)
    }

    /// Apply environment overrides; `lookup` returns the value of a variable
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bind) = lookup("FAMFIN_BIND") {
            self.bind_address = bind;
        }
        if let Some(dir) = lookup("FAMFIN_DATA_DIR") {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(seed) = lookup("FAMFIN_SEED_DEMO") {
            self.seed_demo_data = parse_flag(&seed)
                .with_context(|| format!("FAMFIN_SEED_DEMO must be true or false, got {:?}", seed))?;
        }
        Ok(())
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    pub fn withdrawal_delay(&self) -> Duration {
        Duration::from_millis(self.withdrawal_delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 3600)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_overrides_only_given_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("famfin.yaml");
        fs::write(
            &path,
            "bind_address: 0.0.0.0:8080\nsubscription_price: 19.9\npayment_delay_ms: 0\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.subscription_price, dec!(19.9));
        assert_eq!(config.payment_delay(), Duration::ZERO);
        assert_eq!(config.withdrawal_delay_ms, 1500);
        assert_eq!(config.session_ttl(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            ("FAMFIN_DATA_DIR", "/tmp/famfin"),
            ("API_KEY", "legacy-key"),
            ("FAMFIN_SEED_DEMO", "no"),
            ("FAMFIN_BIND", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.data_directory, PathBuf::from("/tmp/famfin"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("legacy-key"));
        assert!(!config.seed_demo_data);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_gemini_key_wins_over_legacy_name() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|name| match name {
                "GEMINI_API_KEY" => Some("new".to_string()),
                "API_KEY" => Some("old".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("new"));
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "FAMFIN_SEED_DEMO").then(|| "talvez".to_string())
        });
        assert!(result.is_err());
    }
}
