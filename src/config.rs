//! Engine configuration
//!
//! Every tunable constant lives here with the stock value as its default.
//! A config file is JSON; missing fields fall back to the defaults.

use crate::core::StartingResources;
use crate::game::VerbosityLevel;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds for the three end-of-game conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndConditionConfig {
    /// Burning cluster size that counts as an uncontrolled fire
    pub fire_chain_threshold: usize,
    /// Fraction of cultural sites whose loss is irreparable
    pub cultural_loss_fraction: f64,
    /// Share of damaged or destroyed buildings that means collapse
    pub infrastructure_collapse_ratio: f64,
}

impl Default for EndConditionConfig {
    fn default() -> Self {
        EndConditionConfig {
            fire_chain_threshold: 6,
            cultural_loss_fraction: 2.0 / 3.0,
            infrastructure_collapse_ratio: 0.40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub num_players: u32,
    /// Tile name that marks a cultural site
    pub cultural_site_name: String,
}

impl Default for GradingConfig {
    fn default() -> Self {
        GradingConfig {
            num_players: 6,
            cultural_site_name: "Indigenous Land".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Scales fuel load into ignition odds
    pub burn_multiplier: f64,
    /// Chance a fully fuelled neighbour of a burning tile catches
    pub spread_chance: f64,
}

impl Default for FireConfig {
    fn default() -> Self {
        FireConfig {
            burn_multiplier: 0.1,
            spread_chance: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resources: StartingResources,
    pub end_conditions: EndConditionConfig,
    pub grading: GradingConfig,
    pub fire: FireConfig,
    pub map_radius: u32,
    pub seed: u64,
    pub verbosity: VerbosityLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            resources: StartingResources::default(),
            end_conditions: EndConditionConfig::default(),
            grading: GradingConfig::default(),
            fire: FireConfig::default(),
            map_radius: 2,
            seed: 42,
            verbosity: VerbosityLevel::default(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grading.num_players == 0 {
            return Err(EngineError::Config("num_players must be at least 1".into()));
        }
        if self.end_conditions.fire_chain_threshold == 0 {
            return Err(EngineError::Config(
                "fire_chain_threshold must be at least 1".into(),
            ));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.end_conditions.cultural_loss_fraction)
            || !unit.contains(&self.end_conditions.infrastructure_collapse_ratio)
        {
            return Err(EngineError::Config(
                "end condition fractions must lie in [0, 1]".into(),
            ));
        }
        if !unit.contains(&self.fire.spread_chance) || self.fire.burn_multiplier < 0.0 {
            return Err(EngineError::Config(
                "fire parameters out of range".into(),
            ));
        }
        Ok(())
    }
}
