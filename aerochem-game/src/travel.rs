//! Travel engine: destination selection and the travel transaction.
//!
//! Every check runs before the first mutation, so a rejected travel leaves
//! the session exactly as it was.
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::constants::{LOG_GAME_WON, LOG_OUT_OF_FUEL, LOG_TRAVEL_BLOCKED, LOG_TRAVELED};
use crate::error::GameError;
use crate::events::{AppliedOutcome, ArrivalPolicy, apply_outcome};
use crate::fuel::{can_afford, range_cost};
use crate::geo::{AirportCatalog, AirportId, NearbyAirport};
use crate::state::GameState;

/// Travel state machine. `Traveling` and `Arrived` are only observable from
/// inside [`TravelEngine::travel`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "destination", rename_all = "snake_case")]
pub enum TravelPhase {
    #[default]
    Idle,
    DestinationSelected(AirportId),
    Traveling(AirportId),
    Arrived(AirportId),
}

impl TravelPhase {
    #[must_use]
    pub const fn destination(&self) -> Option<&AirportId> {
        match self {
            Self::Idle => None,
            Self::DestinationSelected(dest) | Self::Traveling(dest) | Self::Arrived(dest) => {
                Some(dest)
            }
        }
    }
}

/// Result of a successful travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelReport {
    pub from: AirportId,
    pub to: AirportId,
    pub distance_km: f64,
    pub arrival: AppliedOutcome,
    pub range_km: f64,
    pub budget: i64,
    pub chemicals: u8,
    pub game_over: bool,
    pub game_won: bool,
    /// This travel completed the research.
    pub newly_won: bool,
    /// Airports reachable from the new location, nearest first.
    pub nearby_airports: Vec<NearbyAirport>,
}

/// Rules for moving between airports, bound to one catalog and config.
#[derive(Debug, Clone, Copy)]
pub struct TravelEngine<'a> {
    catalog: &'a AirportCatalog,
    config: &'a GameConfig,
}

impl<'a> TravelEngine<'a> {
    #[must_use]
    pub const fn new(catalog: &'a AirportCatalog, config: &'a GameConfig) -> Self {
        Self { catalog, config }
    }

    /// Catalog airports other than the current one within the remaining range.
    #[must_use]
    pub fn nearby_airports(&self, state: &GameState) -> Vec<NearbyAirport> {
        self.catalog.nearby(&state.location, state.range_km)
    }

    /// Record `destination` as the next hop.
    ///
    /// # Errors
    ///
    /// `UnknownAirport` if the catalog lacks it, `AlreadyThere` if it is the
    /// current location.
    pub fn select_destination(
        &self,
        state: &GameState,
        phase: &mut TravelPhase,
        destination: &AirportId,
    ) -> Result<(), GameError> {
        if !self.catalog.contains(destination) {
            return Err(GameError::UnknownAirport {
                ident: destination.to_string(),
            });
        }
        if *destination == state.location {
            return Err(GameError::AlreadyThere {
                ident: destination.to_string(),
            });
        }
        *phase = TravelPhase::DestinationSelected(destination.clone());
        Ok(())
    }

    /// Fly to the selected destination.
    ///
    /// Fuel is re-checked here against the current range, whatever the caller
    /// checked earlier.
    ///
    /// # Errors
    ///
    /// `NoDestination` without a selection, `GameOver` once travel is closed,
    /// `InsufficientFuel` when the distance exceeds the remaining range.
    pub fn travel(
        &self,
        state: &mut GameState,
        phase: &mut TravelPhase,
        policy: &mut dyn ArrivalPolicy,
    ) -> Result<TravelReport, GameError> {
        let TravelPhase::DestinationSelected(destination) = phase.clone() else {
            return Err(GameError::NoDestination);
        };
        if let Some(reason) = state.terminal_reason(self.config.halt_on_win) {
            log::debug!("{LOG_TRAVEL_BLOCKED} session {} ({reason})", state.id);
            return Err(GameError::GameOver { reason });
        }
        let distance_km = self
            .catalog
            .distance(&state.location, &destination)
            .ok_or_else(|| GameError::UnknownAirport {
                ident: destination.to_string(),
            })?;
        if !can_afford(state.range_km, distance_km) {
            log::debug!(
                "{LOG_TRAVEL_BLOCKED} session {} needs {distance_km:.1}km, has {:.1}km",
                state.id,
                state.range_km
            );
            return Err(GameError::InsufficientFuel {
                needed_km: distance_km,
                available_km: state.range_km,
            });
        }

        *phase = TravelPhase::Traveling(destination.clone());
        let from = std::mem::replace(&mut state.location, destination.clone());
        state.range_km = (state.range_km - range_cost(distance_km)).max(0.0);
        state.distance_flown_km += distance_km;
        state.travels = state.travels.saturating_add(1);
        state.visited.insert(destination.clone());

        let outcome = policy.resolve(&destination);
        let arrival = apply_outcome(state, outcome, self.config.required_chemicals);

        if state.range_km <= 0.0 && !state.game_over {
            state.game_over = true;
            log::info!("{LOG_OUT_OF_FUEL} session {}", state.id);
        }
        let newly_won = !state.game_won && state.chemicals >= self.config.required_chemicals;
        if newly_won {
            state.game_won = true;
            log::info!("{LOG_GAME_WON} session {}", state.id);
        }
        *phase = TravelPhase::Arrived(destination.clone());
        log::info!(
            "{LOG_TRAVELED} session {} {from} -> {destination} ({distance_km:.1}km, {:.1}km left)",
            state.id,
            state.range_km
        );
        *phase = TravelPhase::Idle;

        Ok(TravelReport {
            from,
            to: destination,
            distance_km,
            arrival,
            range_km: state.range_km,
            budget: state.budget,
            chemicals: state.chemicals,
            game_over: state.game_over,
            game_won: state.game_won,
            newly_won,
            nearby_airports: self.nearby_airports(state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerminalReason;
    use crate::events::{ArrivalOutcome, Scripted};
    use crate::geo::{Airport, AirportKind};
    use crate::state::SessionId;

    fn airport(ident: &str, latitude: f64, longitude: f64) -> Airport {
        Airport {
            ident: AirportId::new(ident),
            name: ident.to_string(),
            country: "XX".to_string(),
            continent: "EU".to_string(),
            latitude,
            longitude,
            kind: AirportKind::LargeAirport,
        }
    }

    fn catalog() -> AirportCatalog {
        AirportCatalog::new(vec![
            airport("HOME", 0.0, 0.0),
            airport("EAST", 0.0, 1.0),
            airport("FARR", 0.0, 10.0),
        ])
        .unwrap()
    }

    fn state(range_km: f64) -> GameState {
        let mut state = GameState::new(
            SessionId::new("t"),
            "tester",
            AirportId::new("HOME"),
            &GameConfig::default(),
        );
        state.range_km = range_km;
        state
    }

    #[test]
    fn select_rejects_unknown_and_current() {
        let catalog = catalog();
        let cfg = GameConfig::default();
        let engine = TravelEngine::new(&catalog, &cfg);
        let state = state(1_000.0);
        let mut phase = TravelPhase::Idle;

        let unknown = engine.select_destination(&state, &mut phase, &AirportId::new("NOPE"));
        assert!(matches!(unknown, Err(GameError::UnknownAirport { .. })));
        let here = engine.select_destination(&state, &mut phase, &AirportId::new("HOME"));
        assert!(matches!(here, Err(GameError::AlreadyThere { .. })));
        assert_eq!(phase, TravelPhase::Idle);

        engine
            .select_destination(&state, &mut phase, &AirportId::new("EAST"))
            .unwrap();
        assert_eq!(phase.destination().map(AirportId::as_str), Some("EAST"));
    }

    #[test]
    fn travel_requires_selection() {
        let catalog = catalog();
        let cfg = GameConfig::default();
        let engine = TravelEngine::new(&catalog, &cfg);
        let mut state = state(1_000.0);
        let mut phase = TravelPhase::Idle;
        let mut policy = Scripted::default();
        assert_eq!(
            engine.travel(&mut state, &mut phase, &mut policy),
            Err(GameError::NoDestination)
        );
    }

    #[test]
    fn travel_debits_distance_and_resolves_arrival() {
        let catalog = catalog();
        let cfg = GameConfig::default();
        let engine = TravelEngine::new(&catalog, &cfg);
        let mut state = state(1_000.0);
        let mut phase = TravelPhase::Idle;
        let mut policy = Scripted::new([(
            AirportId::new("EAST"),
            ArrivalOutcome::ChemicalFound {
                name: "Octane".into(),
            },
        )]);

        engine
            .select_destination(&state, &mut phase, &AirportId::new("EAST"))
            .unwrap();
        let report = engine.travel(&mut state, &mut phase, &mut policy).unwrap();
        let expected = catalog
            .distance(&AirportId::new("HOME"), &AirportId::new("EAST"))
            .unwrap();
        assert!((report.distance_km - expected).abs() < 1e-9);
        assert!((state.range_km - (1_000.0 - expected)).abs() < 1e-9);
        assert_eq!(state.location.as_str(), "EAST");
        assert!(state.has_visited(&AirportId::new("HOME")));
        assert!(state.has_visited(&AirportId::new("EAST")));
        assert_eq!(state.chemicals, 1);
        assert!(report.arrival.chemical_counted);
        assert_eq!(phase, TravelPhase::Idle);
        let nearby: Vec<&str> = report
            .nearby_airports
            .iter()
            .map(|n| n.ident.as_str())
            .collect();
        assert_eq!(nearby, vec!["HOME"]);
    }

    #[test]
    fn insufficient_fuel_leaves_state_untouched() {
        let catalog = catalog();
        let cfg = GameConfig::default();
        let engine = TravelEngine::new(&catalog, &cfg);
        let mut state = state(50.0);
        let before = state.clone();
        let mut phase = TravelPhase::Idle;
        let mut policy = Scripted::default();

        engine
            .select_destination(&state, &mut phase, &AirportId::new("FARR"))
            .unwrap();
        let err = engine
            .travel(&mut state, &mut phase, &mut policy)
            .unwrap_err();
        assert!(matches!(err, GameError::InsufficientFuel { .. }));
        assert_eq!(state, before);
        assert_eq!(
            phase,
            TravelPhase::DestinationSelected(AirportId::new("FARR"))
        );
    }

    #[test]
    fn exact_range_trip_ends_the_game() {
        let catalog = catalog();
        let cfg = GameConfig::default();
        let engine = TravelEngine::new(&catalog, &cfg);
        let distance = catalog
            .distance(&AirportId::new("HOME"), &AirportId::new("EAST"))
            .unwrap();
        let mut state = state(distance);
        let mut phase = TravelPhase::Idle;
        let mut policy = Scripted::default();

        engine
            .select_destination(&state, &mut phase, &AirportId::new("EAST"))
            .unwrap();
        let report = engine.travel(&mut state, &mut phase, &mut policy).unwrap();
        assert!(report.game_over);
        assert!(state.range_km.abs() < f64::EPSILON);

        engine
            .select_destination(&state, &mut phase, &AirportId::new("HOME"))
            .unwrap();
        assert_eq!(
            engine.travel(&mut state, &mut phase, &mut policy),
            Err(GameError::GameOver {
                reason: TerminalReason::OutOfFuel
            })
        );
    }
}
