//! Workshop tuning, loaded once at startup.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid
//! config and only the values being tuned need to appear in the file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ledgers::buff::BuffCatalog;
use crate::ledgers::economy::DEFAULT_PASSIVE_INCOME_MODIFIER;
use crate::ledgers::research::ResearchCatalog;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopConfig {
    pub initial_coins: f64,
    /// Share of raw income credited per passive collection (0..=1).
    pub passive_income_modifier: f64,
    pub ticks_per_sec: u32,
    /// Ticks between passive income collections.
    pub income_interval_ticks: u32,
    /// Frame delta clamp for the fixed-timestep clock; 0 replays gaps in full.
    pub max_frame_ms: f64,
    /// Replaces the standard cookie table when present.
    pub buff_templates: Option<BuffCatalog>,
    /// Replaces the standard research table when present.
    pub research_catalog: Option<ResearchCatalog>,
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            initial_coins: 0.0,
            passive_income_modifier: DEFAULT_PASSIVE_INCOME_MODIFIER,
            ticks_per_sec: 10,
            income_interval_ticks: 10,
            max_frame_ms: 500.0,
            buff_templates: None,
            research_catalog: None,
        }
    }
}

impl WorkshopConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.passive_income_modifier) {
            return Err(ConfigError::Invalid(format!(
                "passive_income_modifier must be within 0..=1, got {}",
                self.passive_income_modifier
            )));
        }
        if !self.initial_coins.is_finite() || self.initial_coins < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_coins must be a non-negative number, got {}",
                self.initial_coins
            )));
        }
        if self.ticks_per_sec == 0 || self.income_interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_sec and income_interval_ticks must be at least 1".into(),
            ));
        }
        if let Some(buffs) = &self.buff_templates {
            let mut keys = HashSet::new();
            for t in buffs.templates() {
                if !keys.insert(t.key.as_str()) {
                    return Err(ConfigError::Invalid(format!("duplicate cookie key {:?}", t.key)));
                }
                if t.duration_ms < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "cookie {:?} has a negative duration",
                        t.key
                    )));
                }
            }
        }
        if let Some(research) = &self.research_catalog {
            let mut ids = HashSet::new();
            for u in research.entries() {
                if !ids.insert(u.id.as_str()) {
                    return Err(ConfigError::Invalid(format!("duplicate research id {:?}", u.id)));
                }
            }
        }
        Ok(())
    }

    pub fn buff_catalog(&self) -> BuffCatalog {
        self.buff_templates.clone().unwrap_or_default()
    }

    pub fn research_catalog(&self) -> ResearchCatalog {
        self.research_catalog.clone().unwrap_or_default()
    }
}
