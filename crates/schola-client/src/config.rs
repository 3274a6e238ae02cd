//! Client configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Complete client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network settings.
    #[serde(default)]
    pub network: NetworkSettings,
    /// Administrator settings.
    #[serde(default)]
    pub admin: AdminSettings,
    /// Pricing settings.
    #[serde(default)]
    pub pricing: PricingSettings,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Chain id the marketplace contract is deployed on.
    #[serde(default = "default_target_chain_id")]
    pub target_chain_id: u64,
}

/// Administrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Hashed admin allow-list, hex digests. Plaintext addresses are never
    /// configured or compared.
    #[serde(default = "default_admin_allowlist")]
    pub allowlist: Vec<String>,
}

/// Pricing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Fixed course list price in whole USD.
    #[serde(default = "default_course_price_usd")]
    pub course_price_usd: u64,
    /// Suggested price refresh interval for the embedding application.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

// Default value functions

fn default_target_chain_id() -> u64 {
    1337
}

fn default_admin_allowlist() -> Vec<String> {
    vec![crate::hooks::account::DEFAULT_ADMIN_DIGEST.to_string()]
}

fn default_course_price_usd() -> u64 {
    15
}

fn default_refresh_interval() -> u64 {
    10
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            target_chain_id: default_target_chain_id(),
        }
    }
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            allowlist: default_admin_allowlist(),
        }
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            course_price_usd: default_course_price_usd(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            admin: AdminSettings::default(),
            pricing: PricingSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Write configuration to a TOML file.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, raw).with_context(|| format!("writing config {}", path.display()))
    }
}
