//! Transport-agnostic request dispatcher.
use crate::chemicals::{ChemicalInfo, StaticEnrichment, describe_or_default};
use crate::error::GameError;
use crate::session::GameSessions;
use crate::wire::{
    AirportsBody, ErrorBody, FuelBody, GameStateBody, InitBody, NewGameBody, Request, Response,
    TravelBody,
};

/// Answers [`Request`]s against one session registry.
///
/// Travel replies leave `chemical_info` empty; the transport fills it in
/// through [`Response::attach_chemical`] under its own timeout.
#[derive(Debug)]
pub struct GameService {
    sessions: GameSessions,
}

impl GameService {
    #[must_use]
    pub const fn new(sessions: GameSessions) -> Self {
        Self { sessions }
    }

    #[must_use]
    pub const fn sessions(&self) -> &GameSessions {
        &self.sessions
    }

    /// Describe a chemical from the built-in table, or the default text.
    #[must_use]
    pub fn describe(&self, name: &str) -> ChemicalInfo {
        describe_or_default(&StaticEnrichment, name)
    }

    /// Answer one request. Rejections become [`Response::Error`].
    pub fn handle(&self, request: Request) -> Response {
        self.dispatch(request).unwrap_or_else(|err| {
            log::debug!("request rejected: {err}");
            Response::from(err)
        })
    }

    /// Parse a JSON request line and answer it with a JSON line.
    #[must_use]
    pub fn handle_json(&self, line: &str) -> String {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).to_json(),
            Err(err) => {
                Response::Error(ErrorBody::bad_request(format!("Bad request: {err}"))).to_json()
            }
        }
    }

    fn dispatch(&self, request: Request) -> Result<Response, GameError> {
        let response = match request {
            Request::NewGame { player, loc } => {
                let state = self.sessions.new_game(&player, loc.as_deref())?;
                Response::NewGame(NewGameBody::from(&state))
            }
            Request::Airports { game } => Response::Airports(AirportsBody {
                airports: self.sessions.airports(&game)?,
            }),
            Request::GameState { game } => {
                let state = self.sessions.query_state(&game)?;
                Response::GameState(GameStateBody::from(&state))
            }
            Request::Travel { game, dest } => {
                let report = self.sessions.travel(&game, &dest)?;
                Response::Travel(Box::new(TravelBody::from(&report)))
            }
            Request::BuyFuel { game, amount } => {
                let receipt = self.sessions.buy_fuel(&game, amount)?;
                Response::Fuel(FuelBody::from(&receipt))
            }
            Request::Init => Response::Init(InitBody::from(self.sessions.config())),
            Request::Chemical { name } => Response::Chemical(self.describe(&name)),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::events::{ArrivalOutcome, EventTable, Scripted};
    use crate::geo::{AirportCatalog, AirportId};
    use crate::session::GameSession;
    use crate::state::{GameState, SessionId};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn service() -> GameService {
        let sessions = GameSessions::new(
            AirportCatalog::builtin().unwrap(),
            GameConfig::default(),
            EventTable::builtin().unwrap(),
            7,
        );
        GameService::new(sessions)
    }

    fn call(service: &GameService, line: &str) -> Value {
        serde_json::from_str(&service.handle_json(line)).unwrap()
    }

    #[test]
    fn newgame_then_gamestate() {
        let service = service();
        let created = call(&service, r#"{"op":"newgame","player":"Ada"}"#);
        assert_eq!(created["name"], "Ada");
        assert_eq!(created["location"], "LSZH");
        assert_eq!(created["visited_airports"], "LSZH");
        let id = created["id"].as_str().unwrap().to_string();

        let state = call(
            &service,
            &format!(r#"{{"op":"gamestate","game":"{id}"}}"#),
        );
        assert_eq!(state["money"], 5_000);
        assert_eq!(state["visited_count"], 1);
        assert_eq!(state["game_over"], false);
    }

    #[test]
    fn travel_reply_has_outcome_and_nearby() {
        let service = service();
        let created = call(&service, r#"{"op":"newgame"}"#);
        let id = created["id"].as_str().unwrap();
        let reply = call(
            &service,
            &format!(r#"{{"op":"travel","game":"{id}","dest":"LFPG"}}"#),
        );
        assert_eq!(reply["location"], "LFPG");
        assert!(reply["outcome"]["kind"].is_string());
        assert!(reply["nearby_airports"].is_array());
    }

    #[test]
    fn travel_leaves_chemical_description_to_transport() {
        let service = service();
        let config = Arc::new(GameConfig::default());
        let state = GameState::new(
            SessionId::new("pending"),
            "tester",
            AirportId::new("LSZH"),
            &config,
        );
        let policy = Scripted::new([(
            AirportId::new("LFSB"),
            ArrivalOutcome::ChemicalFound {
                name: "Octane".into(),
            },
        )]);
        let session = GameSession::with_policy(
            state,
            Box::new(policy),
            Arc::new(AirportCatalog::builtin().unwrap()),
            config,
        );
        let id = service.sessions().insert(session).id;

        let started = Instant::now();
        let mut reply = service.handle(Request::Travel {
            game: id.as_str().to_string(),
            dest: "LFSB".into(),
        });
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(reply.pending_chemical(), Some("Octane"));

        reply.attach_chemical(service.describe("Octane"));
        assert_eq!(reply.pending_chemical(), None);
        let json: Value = serde_json::from_str(&reply.to_json()).unwrap();
        assert_eq!(json["last_chemical"], "Octane");
        assert_eq!(json["chemical_info"]["formula"], "C8H18");
    }

    #[test]
    fn rejections_use_error_shape() {
        let service = service();
        let missing = call(&service, r#"{"op":"gamestate","game":"nope"}"#);
        assert_eq!(missing["error"], "unknown_session");
        assert_eq!(missing["status"], 404);

        let garbage = call(&service, "not json");
        assert_eq!(garbage["error"], "bad_request");
        assert_eq!(garbage["status"], 400);

        let created = call(&service, r#"{"op":"newgame"}"#);
        let id = created["id"].as_str().unwrap();
        let far = call(
            &service,
            &format!(r#"{{"op":"travel","game":"{id}","dest":"LEMD"}}"#),
        );
        assert_eq!(far["error"], "insufficient_fuel");
        assert!(far["message"].as_str().unwrap().starts_with("Insufficient fuel"));
    }

    #[test]
    fn chemical_lookup_falls_back() {
        let service = service();
        let known = call(&service, r#"{"op":"chemical","name":"Toluene"}"#);
        assert_eq!(known["formula"], "C7H8");
        let unknown = call(&service, r#"{"op":"chemical","name":"Kerosene"}"#);
        assert_eq!(unknown["source"], "default");
    }

    #[test]
    fn init_reports_start_values() {
        let service = service();
        let init = call(&service, r#"{"op":"init"}"#);
        assert_eq!(init["startBudget"], 5_000);
        assert_eq!(init["startFuel"], 1_000.0);
    }
}
