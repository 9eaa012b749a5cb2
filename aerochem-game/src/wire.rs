//! Request and response shapes of the JSON interface.
//!
//! Field names follow the legacy web API so existing front ends keep working.
use serde::{Deserialize, Serialize};

use crate::chemicals::ChemicalInfo;
use crate::config::GameConfig;
use crate::error::{ErrorKind, GameError};
use crate::events::ArrivalOutcome;
use crate::geo::{Airport, NearbyAirport};
use crate::session::FuelReceipt;
use crate::state::GameState;
use crate::travel::TravelReport;

const DEFAULT_PLAYER: &str = "Researcher";

/// One client request, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    NewGame {
        #[serde(default = "default_player")]
        player: String,
        #[serde(default)]
        loc: Option<String>,
    },
    Airports {
        game: String,
    },
    GameState {
        game: String,
    },
    Travel {
        game: String,
        dest: String,
    },
    BuyFuel {
        game: String,
        amount: f64,
    },
    Init,
    Chemical {
        name: String,
    },
}

fn default_player() -> String {
    DEFAULT_PLAYER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGameBody {
    pub id: String,
    pub name: String,
    pub money: i64,
    pub range: f64,
    pub chemicals: u8,
    pub location: String,
    /// Comma-joined airport idents.
    pub visited_airports: String,
}

impl From<&GameState> for NewGameBody {
    fn from(state: &GameState) -> Self {
        Self {
            id: state.id.to_string(),
            name: state.player.clone(),
            money: state.budget,
            range: state.range_km,
            chemicals: state.chemicals,
            location: state.location.to_string(),
            visited_airports: state.visited_csv(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportsBody {
    pub airports: Vec<Airport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateBody {
    pub id: String,
    pub name: String,
    pub chemicals: u8,
    pub money: i64,
    pub range: f64,
    pub location: String,
    pub visited_count: u32,
    pub game_over: bool,
    pub game_won: bool,
}

impl From<&GameState> for GameStateBody {
    fn from(state: &GameState) -> Self {
        Self {
            id: state.id.to_string(),
            name: state.player.clone(),
            chemicals: state.chemicals,
            money: state.budget,
            range: state.range_km,
            location: state.location.to_string(),
            visited_count: state.visited_count(),
            game_over: state.game_over,
            game_won: state.game_won,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyBody {
    pub ident: String,
    pub name: String,
    pub country: String,
    pub distance: f64,
}

impl From<&NearbyAirport> for NearbyBody {
    fn from(nearby: &NearbyAirport) -> Self {
        Self {
            ident: nearby.ident.to_string(),
            name: nearby.name.clone(),
            country: nearby.country.clone(),
            distance: nearby.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chemical: Option<String>,
    /// Display label only; `outcome` is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<String>,
    pub outcome: ArrivalOutcome,
    pub distance: f64,
    pub range: f64,
    pub money: i64,
    pub chemicals: u8,
    pub location: String,
    pub game_over: bool,
    pub game_won: bool,
    pub nearby_airports: Vec<NearbyBody>,
    /// Descriptive data for a newly found chemical.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_info: Option<ChemicalInfo>,
}

impl From<&TravelReport> for TravelBody {
    fn from(report: &TravelReport) -> Self {
        let outcome = report.arrival.outcome.clone();
        Self {
            last_chemical: outcome.chemical_name().map(str::to_string),
            last_event: outcome.legacy_event_label(),
            outcome,
            distance: report.distance_km,
            range: report.range_km,
            money: report.budget,
            chemicals: report.chemicals,
            location: report.to.to_string(),
            game_over: report.game_over,
            game_won: report.game_won,
            nearby_airports: report.nearby_airports.iter().map(NearbyBody::from).collect(),
            chemical_info: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelBody {
    pub range: f64,
    pub money: i64,
    pub game_over: bool,
}

impl From<&FuelReceipt> for FuelBody {
    fn from(receipt: &FuelReceipt) -> Self {
        Self {
            range: receipt.range_km,
            money: receipt.budget,
            game_over: receipt.game_over,
        }
    }
}

/// Starting values for front ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitBody {
    pub start_budget: i64,
    pub start_fuel: f64,
    pub required_chemicals: u8,
    pub fuel_rate: i64,
}

impl From<&GameConfig> for InitBody {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            start_budget: cfg.start_budget,
            start_fuel: cfg.start_range_km,
            required_chemicals: cfg.required_chemicals,
            fuel_rate: cfg.fuel_rate_km_per_unit,
        }
    }
}

/// Error body carrying both the structured kind and the legacy text/status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
    pub status: u16,
}

impl ErrorBody {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: ErrorKind::BadRequest,
            message: message.into(),
            status: ErrorKind::BadRequest.status(),
        }
    }
}

impl From<&GameError> for ErrorBody {
    fn from(err: &GameError) -> Self {
        let kind = err.kind();
        Self {
            error: kind,
            message: err.to_string(),
            status: kind.status(),
        }
    }
}

/// A reply to one [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    NewGame(NewGameBody),
    Airports(AirportsBody),
    GameState(GameStateBody),
    Travel(Box<TravelBody>),
    Fuel(FuelBody),
    Init(InitBody),
    Chemical(ChemicalInfo),
    Error(ErrorBody),
}

impl Response {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Chemical found by a travel reply that still lacks its description.
    #[must_use]
    pub fn pending_chemical(&self) -> Option<&str> {
        match self {
            Self::Travel(body) if body.chemical_info.is_none() => body.last_chemical.as_deref(),
            _ => None,
        }
    }

    /// Attach a chemical description to a travel reply; other replies are
    /// left untouched.
    pub fn attach_chemical(&mut self, info: ChemicalInfo) {
        if let Self::Travel(body) = self {
            body.chemical_info = Some(info);
        }
    }

    /// Serialize to a single JSON line.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            log::error!("failed to serialize response: {err}");
            format!(
                r#"{{"error":"bad_request","message":"serialization failed","status":{}}}"#,
                ErrorKind::BadRequest.status()
            )
        })
    }
}

impl From<GameError> for Response {
    fn from(err: GameError) -> Self {
        Self::Error(ErrorBody::from(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_legacy_ops() {
        let req: Request = serde_json::from_str(r#"{"op":"newgame","loc":"LFPG"}"#).unwrap();
        assert_eq!(
            req,
            Request::NewGame {
                player: "Researcher".into(),
                loc: Some("LFPG".into())
            }
        );
        let req: Request =
            serde_json::from_str(r#"{"op":"buyfuel","game":"abc","amount":250}"#).unwrap();
        assert!(matches!(req, Request::BuyFuel { amount, .. } if (amount - 250.0).abs() < 1e-9));
        let req: Request = serde_json::from_str(r#"{"op":"init"}"#).unwrap();
        assert_eq!(req, Request::Init);
        assert!(serde_json::from_str::<Request>(r#"{"op":"teleport"}"#).is_err());
    }

    #[test]
    fn errors_carry_kind_text_and_status() {
        let response = Response::from(GameError::UnknownSession { id: "zz".into() });
        let json: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(json["error"], "unknown_session");
        assert_eq!(json["message"], "Game not found: zz");
        assert_eq!(json["status"], 404);
    }

    #[test]
    fn init_uses_camel_case() {
        let json = serde_json::to_value(InitBody::from(&GameConfig::default())).unwrap();
        assert_eq!(json["startBudget"], 5_000);
        assert_eq!(json["fuelRate"], 2);
        assert_eq!(json["requiredChemicals"], 5);
    }
}
