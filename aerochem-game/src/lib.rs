//! AeroChem Game Engine
//!
//! Platform-agnostic core logic for the AeroChem airport research game: a
//! researcher flies between airports on a fuel budget, collecting chemical
//! components and weathering monetary events. This crate has no transport or
//! UI dependencies.

pub mod chemicals;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fuel;
pub mod geo;
pub mod numbers;
pub mod seed;
pub mod service;
pub mod session;
pub mod state;
pub mod travel;
pub mod wire;

// Re-export commonly used types
pub use chemicals::{
    CHEMICAL_NAMES, ChemicalInfo, EnrichmentSource, StaticEnrichment, canonical_chemical,
    describe_or_default,
};
#[cfg(feature = "async")]
pub use chemicals::describe_with_timeout;
pub use config::{ConfigError, GameConfig};
pub use error::{EnrichmentError, ErrorKind, GameError, TerminalReason};
pub use events::{
    AppliedOutcome, ArrivalOutcome, ArrivalPolicy, EventTable, MonetaryEvent, Scripted,
    SitePlacement, apply_outcome,
};
pub use fuel::{FuelPurchase, can_afford, fuel_purchase, range_cost};
pub use geo::{Airport, AirportCatalog, AirportId, AirportKind, CatalogError, NearbyAirport};
pub use service::GameService;
pub use session::{FuelReceipt, GameSession, GameSessions};
pub use state::{GameState, SessionId};
pub use travel::{TravelEngine, TravelPhase, TravelReport};
pub use wire::{ErrorBody, Request, Response};

use thiserror::Error;

/// Trait for abstracting reference data loading.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the airport catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the airport data cannot be loaded or validated.
    fn load_catalog(&self) -> Result<AirportCatalog, Self::Error>;

    /// Load the monetary event table.
    ///
    /// # Errors
    ///
    /// Returns an error if the event data cannot be loaded.
    fn load_events(&self) -> Result<EventTable, Self::Error>;

    /// Load game rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or validated.
    fn load_config(&self) -> Result<GameConfig, Self::Error>;
}

/// Failure to load bundled or user-supplied reference data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("event table is not valid JSON: {0}")]
    Events(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("start airport {0} is not in the catalog")]
    StartAirport(String),
}

/// Data compiled into the crate, with default rules.
#[derive(Debug, Clone, Default)]
pub struct BuiltinData {
    config: GameConfig,
}

impl BuiltinData {
    #[must_use]
    pub const fn with_config(config: GameConfig) -> Self {
        Self { config }
    }
}

impl DataLoader for BuiltinData {
    type Error = DataError;

    fn load_catalog(&self) -> Result<AirportCatalog, Self::Error> {
        Ok(AirportCatalog::builtin()?)
    }

    fn load_events(&self) -> Result<EventTable, Self::Error> {
        Ok(EventTable::builtin()?)
    }

    fn load_config(&self) -> Result<GameConfig, Self::Error> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Build a session registry from a loader's data.
///
/// # Errors
///
/// Returns [`DataError`] if any data set fails to load or the configured
/// start airport is missing from the catalog.
pub fn build_sessions<L>(loader: &L, seed: u64) -> Result<GameSessions, DataError>
where
    L: DataLoader,
    DataError: From<L::Error>,
{
    let catalog = loader.load_catalog()?;
    let events = loader.load_events()?;
    let config = loader.load_config()?;
    if !catalog.contains(&AirportId::new(&config.start_airport)) {
        return Err(DataError::StartAirport(config.start_airport));
    }
    log::info!(
        "loaded {} airports and {} events",
        catalog.len(),
        events.events.len()
    );
    Ok(GameSessions::new(catalog, config, events, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenLoader;

    impl DataLoader for BrokenLoader {
        type Error = DataError;

        fn load_catalog(&self) -> Result<AirportCatalog, Self::Error> {
            Ok(AirportCatalog::from_json(r#"{"airports": []}"#)?)
        }

        fn load_events(&self) -> Result<EventTable, Self::Error> {
            Ok(EventTable::empty())
        }

        fn load_config(&self) -> Result<GameConfig, Self::Error> {
            Ok(GameConfig::default())
        }
    }

    #[test]
    fn builtin_data_builds_a_registry() {
        let sessions = build_sessions(&BuiltinData::default(), 1).unwrap();
        assert!(sessions.is_empty());
        assert!(sessions.catalog().len() > 20);
    }

    #[test]
    fn loader_failures_surface() {
        assert!(matches!(
            build_sessions(&BrokenLoader, 1),
            Err(DataError::Catalog(CatalogError::Empty))
        ));

        let cfg = GameConfig {
            start_airport: "ZZZZ".into(),
            ..GameConfig::default()
        };
        assert!(matches!(
            build_sessions(&BuiltinData::with_config(cfg), 1),
            Err(DataError::StartAirport(_))
        ));
    }
}
