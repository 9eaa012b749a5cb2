//! Per-session game record.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::GameConfig;
use crate::error::TerminalReason;
use crate::geo::AirportId;
use crate::numbers::usize_to_u32;

/// Unique session identifier, never reused within a registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutable state of one researcher's game. Clones of it are the read-only
/// snapshots handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: SessionId,
    pub player: String,
    pub location: AirportId,
    /// Signed; only event penalties can push it below zero.
    pub budget: i64,
    /// Remaining travel distance in kilometres, never negative.
    pub range_km: f64,
    pub chemicals: u8,
    /// Chemicals already counted toward the win condition.
    #[serde(default)]
    pub collected: BTreeSet<String>,
    pub visited: BTreeSet<AirportId>,
    pub game_over: bool,
    pub game_won: bool,
    #[serde(default)]
    pub distance_flown_km: f64,
    #[serde(default)]
    pub travels: u32,
}

impl GameState {
    /// A fresh record positioned at `start`.
    #[must_use]
    pub fn new(id: SessionId, player: &str, start: AirportId, cfg: &GameConfig) -> Self {
        let mut visited = BTreeSet::new();
        visited.insert(start.clone());
        Self {
            id,
            player: player.to_string(),
            location: start,
            budget: cfg.start_budget,
            range_km: cfg.start_range_km,
            chemicals: 0,
            collected: BTreeSet::new(),
            visited,
            game_over: false,
            game_won: false,
            distance_flown_km: 0.0,
            travels: 0,
        }
    }

    /// Why travel is closed, if it is.
    #[must_use]
    pub fn terminal_reason(&self, halt_on_win: bool) -> Option<TerminalReason> {
        if self.game_over || self.range_km <= 0.0 {
            Some(TerminalReason::OutOfFuel)
        } else if halt_on_win && self.game_won {
            Some(TerminalReason::ResearchComplete)
        } else {
            None
        }
    }

    #[must_use]
    pub fn visited_count(&self) -> u32 {
        usize_to_u32(self.visited.len())
    }

    /// Visited airports as the legacy comma-joined list.
    #[must_use]
    pub fn visited_csv(&self) -> String {
        self.visited
            .iter()
            .map(AirportId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    #[must_use]
    pub fn has_visited(&self, airport: &AirportId) -> bool {
        self.visited.contains(airport)
    }
}
