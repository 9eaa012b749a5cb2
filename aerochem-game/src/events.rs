//! Arrival outcome resolution: chemical discoveries and monetary events.
//!
//! What an airport holds is decided by a pluggable [`ArrivalPolicy`]. The
//! resolver hands back a tagged [`ArrivalOutcome`]; callers never parse labels.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::chemicals::{CHEMICAL_NAMES, canonical_chemical};
use crate::config::GameConfig;
use crate::constants::{LOG_CHEMICAL_DUPLICATE, LOG_CHEMICAL_FOUND, LOG_MONEY_EVENT};
use crate::geo::{AirportCatalog, AirportId};
use crate::seed::{STREAM_EVENTS, STREAM_PLACEMENT, stream_rng};
use crate::state::GameState;

const BUILTIN_EVENTS: &str = include_str!("../assets/events.json");

/// What happened when the researcher landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrivalOutcome {
    ChemicalFound { name: String },
    MonetaryEvent { label: String, amount: i64 },
    Nothing,
}

impl ArrivalOutcome {
    #[must_use]
    pub fn chemical_name(&self) -> Option<&str> {
        match self {
            Self::ChemicalFound { name } => Some(name),
            _ => None,
        }
    }

    /// Display label in the legacy `"Storm (-300€)"` format.
    #[must_use]
    pub fn legacy_event_label(&self) -> Option<String> {
        match self {
            Self::MonetaryEvent { label, amount } => {
                let sign = if *amount > 0 { "+" } else { "" };
                Some(format!("{label} ({sign}{amount}\u{20ac})"))
            }
            _ => None,
        }
    }
}

/// A monetary event template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryEvent {
    pub id: String,
    pub label: String,
    /// Signed currency delta; positive is a gain.
    pub amount: i64,
}

impl MonetaryEvent {
    #[must_use]
    pub fn outcome(&self) -> ArrivalOutcome {
        ArrivalOutcome::MonetaryEvent {
            label: self.label.clone(),
            amount: self.amount,
        }
    }
}

/// Container for all monetary event templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventTable {
    pub events: Vec<MonetaryEvent>,
}

impl EventTable {
    /// Create an empty table (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self { events: Vec::new() }
    }

    /// Load event data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into an event table.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The bundled event table.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled asset is corrupt.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(BUILTIN_EVENTS)
    }
}

/// Strategy deciding the outcome of each arrival.
pub trait ArrivalPolicy: Send + fmt::Debug {
    /// Resolve the outcome of landing at `airport`. Exhausted or empty
    /// airports resolve to `Nothing`.
    fn resolve(&mut self, airport: &AirportId) -> ArrivalOutcome;

    /// Airports that carried content when the game started.
    fn sites(&self) -> Vec<AirportId>;
}

/// Seeded placement of content on research-site airports at game start.
/// Content is consumed on first arrival.
#[derive(Debug, Clone)]
pub struct SitePlacement {
    sites: Vec<AirportId>,
    remaining: HashMap<AirportId, ArrivalOutcome>,
}

impl SitePlacement {
    /// Place distinct chemicals and monetary events on random airports other
    /// than `start`. Placement is fully determined by `seed`.
    #[must_use]
    pub fn place(
        catalog: &AirportCatalog,
        start: &AirportId,
        cfg: &GameConfig,
        events: &EventTable,
        seed: u64,
    ) -> Self {
        let mut placement_rng = stream_rng(seed, STREAM_PLACEMENT);
        let mut event_rng = stream_rng(seed, STREAM_EVENTS);

        let mut candidates: Vec<AirportId> = catalog
            .iter()
            .map(|airport| airport.ident.clone())
            .filter(|ident| ident != start)
            .collect();
        candidates.shuffle(&mut placement_rng);

        let mut chemicals: Vec<&str> = CHEMICAL_NAMES.to_vec();
        chemicals.shuffle(&mut placement_rng);
        let chemical_outcomes = chemicals
            .into_iter()
            .take(cfg.chemical_sites)
            .map(|name| ArrivalOutcome::ChemicalFound {
                name: name.to_string(),
            });

        let mut event_pool: Vec<&MonetaryEvent> = events.events.iter().collect();
        event_pool.shuffle(&mut event_rng);
        let event_outcomes = (0..cfg.event_sites).filter_map(|i| {
            event_pool
                .get(i % event_pool.len().max(1))
                .map(|event| event.outcome())
        });

        let mut sites = Vec::new();
        let mut remaining = HashMap::new();
        for (ident, outcome) in candidates
            .into_iter()
            .zip(chemical_outcomes.chain(event_outcomes))
        {
            sites.push(ident.clone());
            remaining.insert(ident, outcome);
        }
        sites.sort();
        log::debug!(
            "placed content on {} airports ({} chemicals requested)",
            sites.len(),
            cfg.chemical_sites
        );
        Self { sites, remaining }
    }

    /// Content still waiting to be found.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl ArrivalPolicy for SitePlacement {
    fn resolve(&mut self, airport: &AirportId) -> ArrivalOutcome {
        self.remaining
            .remove(airport)
            .unwrap_or(ArrivalOutcome::Nothing)
    }

    fn sites(&self) -> Vec<AirportId> {
        self.sites.clone()
    }
}

/// Fixed per-airport outcomes, consumed on arrival.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    sites: Vec<AirportId>,
    remaining: HashMap<AirportId, ArrivalOutcome>,
}

impl Scripted {
    #[must_use]
    pub fn new(outcomes: impl IntoIterator<Item = (AirportId, ArrivalOutcome)>) -> Self {
        let remaining: HashMap<AirportId, ArrivalOutcome> = outcomes.into_iter().collect();
        let mut sites: Vec<AirportId> = remaining.keys().cloned().collect();
        sites.sort();
        Self { sites, remaining }
    }
}

impl ArrivalPolicy for Scripted {
    fn resolve(&mut self, airport: &AirportId) -> ArrivalOutcome {
        self.remaining
            .remove(airport)
            .unwrap_or(ArrivalOutcome::Nothing)
    }

    fn sites(&self) -> Vec<AirportId> {
        self.sites.clone()
    }
}

/// Effect an outcome had on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedOutcome {
    pub outcome: ArrivalOutcome,
    /// The chemical advanced the win condition.
    pub chemical_counted: bool,
    pub budget_delta: i64,
}

/// Apply an arrival outcome to the session record.
///
/// A chemical counts only if it is in the catalog, once per session, and
/// never beyond `required`.
pub fn apply_outcome(
    state: &mut GameState,
    outcome: ArrivalOutcome,
    required: u8,
) -> AppliedOutcome {
    let mut applied = AppliedOutcome {
        outcome,
        chemical_counted: false,
        budget_delta: 0,
    };
    match &applied.outcome {
        ArrivalOutcome::ChemicalFound { name } => match canonical_chemical(name) {
            None => log::warn!("ignoring unknown chemical {name} at {}", state.location),
            Some(known) if state.collected.contains(known) => {
                log::debug!("{LOG_CHEMICAL_DUPLICATE} {known} at {}", state.location);
            }
            Some(known) if state.chemicals < required => {
                state.collected.insert(known.to_string());
                state.chemicals += 1;
                applied.chemical_counted = true;
                log::info!(
                    "{LOG_CHEMICAL_FOUND} {known} at {} ({}/{required})",
                    state.location,
                    state.chemicals
                );
            }
            Some(_) => {}
        },
        ArrivalOutcome::MonetaryEvent { label, amount } => {
            state.budget = state.budget.saturating_add(*amount);
            applied.budget_delta = *amount;
            log::info!("{LOG_MONEY_EVENT} {label} {amount:+} at {}", state.location);
        }
        ArrivalOutcome::Nothing => {}
    }
    applied
}
