//! Tunable game rules with validated defaults.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chemicals::CHEMICAL_NAMES;
use crate::constants::{
    CHEMICAL_SITES, DEFAULT_START_AIRPORT, ENRICHMENT_TIMEOUT_MS, EVENT_SITES,
    FUEL_RATE_KM_PER_UNIT, REQUIRED_CHEMICALS, START_BUDGET, START_RANGE_KM,
};

/// Rules applied to every session created by a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_start_budget")]
    pub start_budget: i64,
    #[serde(default = "GameConfig::default_start_range_km")]
    pub start_range_km: f64,
    #[serde(default = "GameConfig::default_fuel_rate")]
    pub fuel_rate_km_per_unit: i64,
    #[serde(default = "GameConfig::default_required_chemicals")]
    pub required_chemicals: u8,
    #[serde(default = "GameConfig::default_start_airport")]
    pub start_airport: String,
    /// Airports seeded with a chemical at game start.
    #[serde(default = "GameConfig::default_chemical_sites")]
    pub chemical_sites: usize,
    /// Airports seeded with a monetary event at game start.
    #[serde(default = "GameConfig::default_event_sites")]
    pub event_sites: usize,
    /// Reject travel once the research is complete.
    #[serde(default = "GameConfig::default_true")]
    pub halt_on_win: bool,
    /// Reject fuel purchases larger than the current budget.
    #[serde(default = "GameConfig::default_true")]
    pub enforce_funds: bool,
    #[serde(default = "GameConfig::default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,
}

impl GameConfig {
    #[must_use]
    pub const fn default_start_budget() -> i64 {
        START_BUDGET
    }

    #[must_use]
    pub const fn default_start_range_km() -> f64 {
        START_RANGE_KM
    }

    #[must_use]
    pub const fn default_fuel_rate() -> i64 {
        FUEL_RATE_KM_PER_UNIT
    }

    #[must_use]
    pub const fn default_required_chemicals() -> u8 {
        REQUIRED_CHEMICALS
    }

    #[must_use]
    pub fn default_start_airport() -> String {
        DEFAULT_START_AIRPORT.to_string()
    }

    #[must_use]
    pub const fn default_chemical_sites() -> usize {
        CHEMICAL_SITES
    }

    #[must_use]
    pub const fn default_event_sites() -> usize {
        EVENT_SITES
    }

    #[must_use]
    pub const fn default_enrichment_timeout_ms() -> u64 {
        ENRICHMENT_TIMEOUT_MS
    }

    const fn default_true() -> bool {
        true
    }

    /// Parse a JSON config; omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start_range_km.is_finite() || self.start_range_km <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "start_range_km",
            });
        }
        if self.fuel_rate_km_per_unit <= 0 {
            return Err(ConfigError::NonPositive {
                field: "fuel_rate_km_per_unit",
            });
        }
        if self.required_chemicals == 0 {
            return Err(ConfigError::NonPositive {
                field: "required_chemicals",
            });
        }
        if usize::from(self.required_chemicals) > self.chemical_sites {
            return Err(ConfigError::Unwinnable {
                required: self.required_chemicals,
                sites: self.chemical_sites,
            });
        }
        if self.chemical_sites > CHEMICAL_NAMES.len() {
            return Err(ConfigError::TooManyChemicalSites {
                sites: self.chemical_sites,
                max: CHEMICAL_NAMES.len(),
            });
        }
        if self.start_airport.trim().is_empty() {
            return Err(ConfigError::MissingStartAirport);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_budget: Self::default_start_budget(),
            start_range_km: Self::default_start_range_km(),
            fuel_rate_km_per_unit: Self::default_fuel_rate(),
            required_chemicals: Self::default_required_chemicals(),
            start_airport: Self::default_start_airport(),
            chemical_sites: Self::default_chemical_sites(),
            event_sites: Self::default_event_sites(),
            halt_on_win: true,
            enforce_funds: true,
            enrichment_timeout_ms: Self::default_enrichment_timeout_ms(),
        }
    }
}

/// Errors raised when game configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("{required} chemicals required but only {sites} chemical sites placed")]
    Unwinnable { required: u8, sites: usize },
    #[error("{sites} chemical sites requested but the catalog has {max} chemicals")]
    TooManyChemicalSites { sites: usize, max: usize },
    #[error("start airport must not be empty")]
    MissingStartAirport,
}
