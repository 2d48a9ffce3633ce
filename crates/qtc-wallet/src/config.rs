//! Wallet configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use qtc_core::crypto::KdfParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level wallet configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// General wallet settings
    #[serde(default)]
    pub wallet: WalletSection,

    /// Keystore passphrase hardening
    #[serde(default)]
    pub kdf: KdfSection,
}

/// General wallet settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSection {
    /// Data directory (holds keystore.db)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Argon2id cost parameters for new keystores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfSection {
    /// Memory cost in KiB
    #[serde(default = "default_m_cost")]
    pub m_cost: u32,

    /// Iterations
    #[serde(default = "default_t_cost")]
    pub t_cost: u32,

    /// Parallel lanes
    #[serde(default = "default_p_cost")]
    pub p_cost: u32,
}

impl Default for KdfSection {
    fn default() -> Self {
        Self {
            m_cost: default_m_cost(),
            t_cost: default_t_cost(),
            p_cost: default_p_cost(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("./qtc-data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_m_cost() -> u32 {
    KdfParams::default().m_cost
}

fn default_t_cost() -> u32 {
    KdfParams::default().t_cost
}

fn default_p_cost() -> u32 {
    KdfParams::default().p_cost
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

// ============================================================================
// Loading & environment override
// ============================================================================

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: WalletConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `QTC_DATA_DIR`
    /// - `QTC_LOG_LEVEL`
    /// - `QTC_KDF_M_COST`
    /// - `QTC_KDF_T_COST`
    /// - `QTC_KDF_P_COST`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("QTC_DATA_DIR") {
            self.wallet.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("QTC_LOG_LEVEL") {
            self.wallet.log_level = v;
        }
        if let Ok(v) = std::env::var("QTC_KDF_M_COST") {
            if let Ok(m_cost) = v.parse::<u32>() {
                self.kdf.m_cost = m_cost;
            }
        }
        if let Ok(v) = std::env::var("QTC_KDF_T_COST") {
            if let Ok(t_cost) = v.parse::<u32>() {
                self.kdf.t_cost = t_cost;
            }
        }
        if let Ok(v) = std::env::var("QTC_KDF_P_COST") {
            if let Ok(p_cost) = v.parse::<u32>() {
                self.kdf.p_cost = p_cost;
            }
        }
    }

    /// Path of the SQLite keystore.
    pub fn keystore_path(&self) -> PathBuf {
        self.wallet.data_dir.join("keystore.db")
    }

    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            m_cost: self.kdf.m_cost,
            t_cost: self.kdf.t_cost,
            p_cost: self.kdf.p_cost,
        }
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.wallet.data_dir.as_os_str().is_empty(),
            "wallet.data_dir must not be empty"
        );

        anyhow::ensure!(
            LOG_LEVELS.contains(&self.wallet.log_level.to_lowercase().as_str()),
            "wallet.log_level must be one of {}",
            LOG_LEVELS.join(", ")
        );

        anyhow::ensure!(self.kdf.t_cost >= 1, "kdf.t_cost must be >= 1");
        anyhow::ensure!(self.kdf.p_cost >= 1, "kdf.p_cost must be >= 1");
        anyhow::ensure!(
            u64::from(self.kdf.m_cost) >= 8 * u64::from(self.kdf.p_cost),
            "kdf.m_cost must be at least 8 * kdf.p_cost"
        );
        self.kdf_params()
            .check()
            .context("kdf parameters rejected by Argon2")?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
