use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub matching: MatchingConfig,
}

impl AppConfig {
    pub fn load() -> CommonResult<Self> {
        Figment::from(Toml::string(DEFAULT_CONFIG))
            .merge(Env::prefixed("BERTH_").map(|p| p.as_str().replace("__", ".").into()))
            .extract()
            .map_err(|e| CommonError::InvalidArgument(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// The hard cap on the number of instance ops admitted for a single offer.
    pub max_instances_per_offer: usize,
    /// The user-facing name of the option that controls the per-offer cap,
    /// shown in log messages when the cap is reached.
    pub max_instances_per_offer_flag: String,
    /// The launch token balance at startup.
    /// The balance can be adjusted at runtime via the matching manager.
    pub initial_launch_tokens: u64,
    /// The seed for the matcher ordering randomness.
    /// A zero value means the ordering is seeded from the operating system.
    #[serde(deserialize_with = "deserialize_non_zero_u64")]
    pub random_seed: Option<u64>,
}

/// Deserialize a `u64` where zero represents [`None`].
/// This allows optional configuration to have a simple scalar representation.
fn deserialize_non_zero_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = u64::deserialize(deserializer)?;
    if value == 0 {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}
