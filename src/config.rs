use crate::utils::logger::LoggerConfig;
use crate::utils::params_io::load_cfg_merge;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment overrides, e.g. `ONEOF__VALUE_BOUND=64`.
pub const ENV_PREFIX: &str = "ONEOF";

/// Keys whose environment value is a comma-separated list.
const LIST_KEYS: &[&str] = &["sizes"];

/// Settings of the `fanout` demo.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// One round is run per entry, each with that many rendezvous channels.
    pub sizes: Vec<usize>,
    /// Produced values are drawn from `0..value_bound`.
    pub value_bound: u32,
    pub logger: LoggerConfig,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            sizes: vec![1, 2, 4, 5, 8, 10, 16, 19],
            value_bound: 32,
            logger: LoggerConfig::from_env(),
        }
    }
}

impl FanoutConfig {
    /// Load from an optional file, then apply `ONEOF__*` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let cfg: Self = load_cfg_merge(path, Some(ENV_PREFIX), LIST_KEYS)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sizes.is_empty() {
            anyhow::bail!("sizes must list at least one round");
        }
        if let Some(pos) = self.sizes.iter().position(|&n| n == 0) {
            anyhow::bail!("sizes[{pos}] is zero; every round needs at least one endpoint");
        }
        if self.value_bound == 0 {
            anyhow::bail!("value_bound must be positive");
        }
        Ok(())
    }
}
