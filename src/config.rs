use serde::{Deserialize, Serialize};

/// Tunable thresholds for the draw advisor. Point values are compared against
/// the candidate card's own value in the active round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// A card that helps melding but only marginally is still taken at or below this value
    pub take_low_value_max: u32,
    /// A card that does not help melding is a "maybe" at or below this value
    pub maybe_low_value_max: u32,
    /// A card that does not help melding is skipped at or above this value
    pub skip_high_value_min: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            take_low_value_max: 5,
            maybe_low_value_max: 3,
            skip_high_value_min: 10,
        }
    }
}

impl AdvisorConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
