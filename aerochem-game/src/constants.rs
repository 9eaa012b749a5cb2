//! Centralized balance and tuning constants for AeroChem game logic.
//!
//! These values are the defaults behind [`crate::config::GameConfig`].

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_TRAVELED: &str = "log.traveled";
pub(crate) const LOG_TRAVEL_BLOCKED: &str = "log.travel-blocked";
pub(crate) const LOG_CHEMICAL_FOUND: &str = "log.chemical.found";
pub(crate) const LOG_CHEMICAL_DUPLICATE: &str = "log.chemical.duplicate";
pub(crate) const LOG_MONEY_EVENT: &str = "log.event.money";
pub(crate) const LOG_OUT_OF_FUEL: &str = "log.fuel.empty";
pub(crate) const LOG_FUEL_PURCHASED: &str = "log.fuel.purchased";
pub(crate) const LOG_GAME_WON: &str = "log.game.won";

// Economy ------------------------------------------------------------------
/// Currency every new session starts with.
pub const START_BUDGET: i64 = 5_000;
/// Kilometres of range every new session starts with.
pub const START_RANGE_KM: f64 = 1_000.0;
/// Kilometres of range bought by one unit of currency.
pub const FUEL_RATE_KM_PER_UNIT: i64 = 2;

// Win condition ------------------------------------------------------------
/// Distinct chemicals required to finish the research.
pub const REQUIRED_CHEMICALS: u8 = 5;

// Research site placement --------------------------------------------------
pub const DEFAULT_START_AIRPORT: &str = "LSZH";
pub(crate) const CHEMICAL_SITES: usize = 8;
pub(crate) const EVENT_SITES: usize = 12;

// Geography ----------------------------------------------------------------
/// Mean Earth radius (IUGG) used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

// Session identifiers ------------------------------------------------------
pub(crate) const SESSION_ID_LEN: usize = 20;

// Enrichment ---------------------------------------------------------------
pub const ENRICHMENT_TIMEOUT_MS: u64 = 1_500;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-6;
