//! Engine error taxonomy.
//!
//! Every variant of [`GameError`] is recoverable by choosing a different
//! action. A rejected action never mutates the session.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why travel is closed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    OutOfFuel,
    ResearchComplete,
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::OutOfFuel => "no fuel remaining",
            Self::ResearchComplete => "research already complete",
        })
    }
}

/// Errors raised by session, fuel and travel operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    #[error("Game not found: {id}")]
    UnknownSession { id: String },
    #[error("Unknown airport: {ident}")]
    UnknownAirport { ident: String },
    #[error("You are already at {ident}")]
    AlreadyThere { ident: String },
    #[error("No destination selected")]
    NoDestination,
    #[error("Insufficient fuel! Need {needed_km:.0}km, have {available_km:.0}km")]
    InsufficientFuel { needed_km: f64, available_km: f64 },
    #[error("Game over: {reason}")]
    GameOver { reason: TerminalReason },
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },
}

/// Stable machine-readable error kind used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownSession,
    UnknownAirport,
    AlreadyThere,
    NoDestination,
    InsufficientFuel,
    GameOver,
    InvalidAmount,
    InsufficientFunds,
    BadRequest,
}

impl ErrorKind {
    /// Legacy status code paired with the textual error body.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::UnknownSession => 404,
            Self::BadRequest | Self::InvalidAmount | Self::UnknownAirport => 400,
            Self::AlreadyThere
            | Self::NoDestination
            | Self::InsufficientFuel
            | Self::GameOver
            | Self::InsufficientFunds => 409,
        }
    }
}

impl GameError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSession { .. } => ErrorKind::UnknownSession,
            Self::UnknownAirport { .. } => ErrorKind::UnknownAirport,
            Self::AlreadyThere { .. } => ErrorKind::AlreadyThere,
            Self::NoDestination => ErrorKind::NoDestination,
            Self::InsufficientFuel { .. } => ErrorKind::InsufficientFuel,
            Self::GameOver { .. } => ErrorKind::GameOver,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

/// Failure of the descriptive chemical lookup. Never fails a travel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("chemical data unavailable for {name}: {reason}")]
    Unavailable { name: String, reason: String },
    #[error("chemical lookup for {name} timed out after {timeout_ms}ms")]
    TimedOut { name: String, timeout_ms: u64 },
}
