//! Game sessions and the in-process session registry.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::GameConfig;
use crate::constants::LOG_FUEL_PURCHASED;
use crate::error::GameError;
use crate::events::{ArrivalPolicy, EventTable, SitePlacement};
use crate::fuel::FuelPurchase;
use crate::geo::{Airport, AirportCatalog, AirportId, NearbyAirport};
use crate::seed::generate_session_code;
use crate::state::{GameState, SessionId};
use crate::travel::{TravelEngine, TravelPhase, TravelReport};

/// Result of a fuel purchase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelReceipt {
    pub purchase: FuelPurchase,
    pub range_km: f64,
    pub budget: i64,
    pub game_over: bool,
}

/// One researcher's game: state, travel phase, and arrival policy.
#[derive(Debug)]
pub struct GameSession {
    state: GameState,
    start: AirportId,
    phase: TravelPhase,
    policy: Box<dyn ArrivalPolicy>,
    config: Arc<GameConfig>,
    catalog: Arc<AirportCatalog>,
}

impl GameSession {
    /// Start a game with content placed from `seed`.
    ///
    /// `start` falls back to the configured start airport.
    ///
    /// # Errors
    ///
    /// `UnknownAirport` if the start airport is not in the catalog.
    pub fn new_game(
        id: SessionId,
        player: &str,
        start: Option<&str>,
        catalog: Arc<AirportCatalog>,
        config: Arc<GameConfig>,
        events: &EventTable,
        seed: u64,
    ) -> Result<Self, GameError> {
        let start = resolve_start(&catalog, &config, start)?;
        let placement = SitePlacement::place(&catalog, &start, &config, events, seed);
        Ok(Self::with_policy(
            GameState::new(id, player, start, &config),
            Box::new(placement),
            catalog,
            config,
        ))
    }

    /// Wrap an existing state with an explicit arrival policy.
    #[must_use]
    pub fn with_policy(
        state: GameState,
        policy: Box<dyn ArrivalPolicy>,
        catalog: Arc<AirportCatalog>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            start: state.location.clone(),
            state,
            phase: TravelPhase::Idle,
            policy,
            config,
            catalog,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.state.id
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// A read-only copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    #[must_use]
    pub const fn phase(&self) -> &TravelPhase {
        &self.phase
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn engine(&self) -> TravelEngine<'_> {
        TravelEngine::new(&self.catalog, &self.config)
    }

    /// # Errors
    ///
    /// See [`TravelEngine::select_destination`].
    pub fn select_destination(&mut self, destination: &str) -> Result<(), GameError> {
        let destination = AirportId::new(destination);
        let engine = TravelEngine::new(&self.catalog, &self.config);
        engine.select_destination(&self.state, &mut self.phase, &destination)
    }

    pub fn clear_destination(&mut self) {
        self.phase = TravelPhase::Idle;
    }

    /// Execute travel to the selected destination.
    ///
    /// # Errors
    ///
    /// See [`TravelEngine::travel`].
    pub fn travel(&mut self) -> Result<TravelReport, GameError> {
        let engine = TravelEngine::new(&self.catalog, &self.config);
        engine.travel(&mut self.state, &mut self.phase, self.policy.as_mut())
    }

    /// Select `destination` and travel in one step. A rejected request
    /// leaves the previous selection in place.
    ///
    /// # Errors
    ///
    /// Any selection or travel error.
    pub fn travel_to(&mut self, destination: &str) -> Result<TravelReport, GameError> {
        let previous = self.phase.clone();
        let result = self
            .select_destination(destination)
            .and_then(|()| self.travel());
        if result.is_err() {
            self.phase = previous;
        }
        result
    }

    /// Convert `amount` currency into range.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for amounts below one whole unit, `InsufficientFunds`
    /// when the funds check is enforced and the budget is short.
    pub fn buy_fuel(&mut self, amount: f64) -> Result<FuelReceipt, GameError> {
        let purchase = FuelPurchase::quote(amount, self.config.fuel_rate_km_per_unit)?;
        if self.config.enforce_funds && purchase.amount > self.state.budget {
            return Err(GameError::InsufficientFunds {
                needed: purchase.amount,
                available: self.state.budget,
            });
        }
        let state = &mut self.state;
        state.range_km += purchase.range_gained();
        state.budget = state.budget.saturating_sub(purchase.amount);
        if state.game_over && state.range_km > 0.0 {
            state.game_over = false;
        }
        log::info!(
            "{LOG_FUEL_PURCHASED} session {} spent {} for {}km",
            state.id,
            purchase.amount,
            purchase.range_gained_km
        );
        Ok(FuelReceipt {
            purchase,
            range_km: state.range_km,
            budget: state.budget,
            game_over: state.game_over,
        })
    }

    /// The start airport plus every airport that held content at game start,
    /// sorted by name. Content is not revealed.
    #[must_use]
    pub fn sites(&self) -> Vec<Airport> {
        let mut idents = self.policy.sites();
        idents.push(self.start.clone());
        idents.sort();
        idents.dedup();
        let mut sites: Vec<Airport> = idents
            .iter()
            .filter_map(|ident| self.catalog.get(ident).cloned())
            .collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        sites
    }

    #[must_use]
    pub fn nearby_airports(&self) -> Vec<NearbyAirport> {
        self.engine().nearby_airports(&self.state)
    }
}

fn resolve_start(
    catalog: &AirportCatalog,
    config: &GameConfig,
    start: Option<&str>,
) -> Result<AirportId, GameError> {
    let start = start
        .filter(|ident| !ident.trim().is_empty())
        .map_or_else(|| AirportId::new(&config.start_airport), AirportId::new);
    if catalog.contains(&start) {
        Ok(start)
    } else {
        Err(GameError::UnknownAirport {
            ident: start.to_string(),
        })
    }
}

type SharedSession = Arc<Mutex<GameSession>>;

/// All live sessions of one process.
///
/// The registry lock is held only for lookup and insertion; each session has
/// its own mutex held for a whole read-modify-write.
#[derive(Debug)]
pub struct GameSessions {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    catalog: Arc<AirportCatalog>,
    config: Arc<GameConfig>,
    events: Arc<EventTable>,
    entropy: Mutex<ChaCha8Rng>,
}

impl GameSessions {
    /// Session ids and placement seeds are drawn from `seed`.
    #[must_use]
    pub fn new(catalog: AirportCatalog, config: GameConfig, events: EventTable, seed: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            events: Arc::new(events),
            entropy: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &AirportCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a session and return its snapshot.
    ///
    /// # Errors
    ///
    /// `UnknownAirport` if `start` is not in the catalog.
    pub fn new_game(&self, player: &str, start: Option<&str>) -> Result<GameState, GameError> {
        let seed = self
            .entropy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_u64();
        let session = GameSession::new_game(
            SessionId::new(String::new()),
            player,
            start,
            Arc::clone(&self.catalog),
            Arc::clone(&self.config),
            &self.events,
            seed,
        )?;
        let snapshot = self.insert(session);
        log::info!(
            "new game {} for {} at {}",
            snapshot.id,
            snapshot.player,
            snapshot.location
        );
        Ok(snapshot)
    }

    /// Register a prepared session under a fresh id; returns its snapshot.
    pub fn insert(&self, mut session: GameSession) -> GameState {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let code = {
                let mut rng = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
                generate_session_code(&mut *rng)
            };
            let id = SessionId::new(code);
            if !sessions.contains_key(&id) {
                break id;
            }
        };
        session.state.id = id.clone();
        let snapshot = session.snapshot();
        sessions.insert(id, Arc::new(Mutex::new(session)));
        snapshot
    }

    fn session(&self, id: &str) -> Result<SharedSession, GameError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&SessionId::new(id))
            .cloned()
            .ok_or_else(|| GameError::UnknownSession { id: id.to_string() })
    }

    /// Run `op` with exclusive access to one session.
    ///
    /// # Errors
    ///
    /// `UnknownSession` for unknown ids, otherwise whatever `op` returns.
    pub fn with_session<T>(
        &self,
        id: &str,
        op: impl FnOnce(&mut GameSession) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let session = self.session(id)?;
        let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut guard)
    }

    /// # Errors
    ///
    /// `UnknownSession` for unknown ids.
    pub fn query_state(&self, id: &str) -> Result<GameState, GameError> {
        self.with_session(id, |session| Ok(session.snapshot()))
    }

    /// # Errors
    ///
    /// `UnknownSession`, or any rejection from [`GameSession::travel_to`].
    pub fn travel(&self, id: &str, destination: &str) -> Result<TravelReport, GameError> {
        self.with_session(id, |session| session.travel_to(destination))
    }

    /// # Errors
    ///
    /// `UnknownSession`, or any rejection from [`GameSession::buy_fuel`].
    pub fn buy_fuel(&self, id: &str, amount: f64) -> Result<FuelReceipt, GameError> {
        self.with_session(id, |session| session.buy_fuel(amount))
    }

    /// # Errors
    ///
    /// `UnknownSession` for unknown ids.
    pub fn airports(&self, id: &str) -> Result<Vec<Airport>, GameError> {
        self.with_session(id, |session| Ok(session.sites()))
    }
}
