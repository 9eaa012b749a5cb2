//! Airport reference data and great-circle distance.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::constants::EARTH_RADIUS_KM;

const BUILTIN_AIRPORTS: &str = include_str!("../assets/airports.json");

/// Airport identifier (ICAO-style code such as `LSZH`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportId(String);

impl AirportId {
    /// Normalize an identifier: trimmed and upper-cased.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_ascii_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AirportId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Airport size class; only large and medium airports take part in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportKind {
    LargeAirport,
    MediumAirport,
}

/// Immutable airport reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub ident: AirportId,
    pub name: String,
    /// ISO 3166 country code.
    pub country: String,
    #[serde(default)]
    pub continent: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: AirportKind,
}

impl Airport {
    /// Great-circle distance to another airport in kilometres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        great_circle_km(
            (self.latitude, self.longitude),
            (other.latitude, other.longitude),
        )
    }
}

/// Haversine distance between two `(latitude, longitude)` pairs in degrees.
#[must_use]
pub fn great_circle_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards against rounding pushing `a` past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Errors raised while loading airport reference data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("airport data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate airport ident {0}")]
    Duplicate(AirportId),
    #[error("airport {ident} has invalid coordinates ({latitude}, {longitude})")]
    Coordinates {
        ident: AirportId,
        latitude: f64,
        longitude: f64,
    },
    #[error("airport catalog is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct AirportFile {
    airports: Vec<Airport>,
}

/// An airport within reach of the current location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAirport {
    pub ident: AirportId,
    pub name: String,
    pub country: String,
    pub distance_km: f64,
}

/// The set of airports loaded for a process. Never mutated after load.
#[derive(Debug, Clone)]
pub struct AirportCatalog {
    airports: Vec<Airport>,
    index: HashMap<AirportId, usize>,
}

impl AirportCatalog {
    /// Build a catalog, rejecting duplicates and impossible coordinates.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` when the list is empty, an ident repeats, or a
    /// coordinate lies outside the valid latitude/longitude ranges.
    pub fn new(airports: Vec<Airport>) -> Result<Self, CatalogError> {
        if airports.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(airports.len());
        for (pos, airport) in airports.iter().enumerate() {
            if !(-90.0..=90.0).contains(&airport.latitude)
                || !(-180.0..=180.0).contains(&airport.longitude)
            {
                return Err(CatalogError::Coordinates {
                    ident: airport.ident.clone(),
                    latitude: airport.latitude,
                    longitude: airport.longitude,
                });
            }
            if index.insert(airport.ident.clone(), pos).is_some() {
                return Err(CatalogError::Duplicate(airport.ident.clone()));
            }
        }
        Ok(Self { airports, index })
    }

    /// Load a catalog from a JSON document of the form `{"airports": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: AirportFile = serde_json::from_str(json)?;
        let airports = file
            .airports
            .into_iter()
            .map(|mut airport| {
                airport.ident = AirportId::new(airport.ident.as_str());
                airport
            })
            .collect();
        Self::new(airports)
    }

    /// The bundled European airport set.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` only if the bundled asset is corrupt.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_AIRPORTS)
    }

    #[must_use]
    pub fn get(&self, ident: &AirportId) -> Option<&Airport> {
        self.index.get(ident).and_then(|pos| self.airports.get(*pos))
    }

    #[must_use]
    pub fn contains(&self, ident: &AirportId) -> bool {
        self.index.contains_key(ident)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.airports.iter()
    }

    /// Distance between two catalog airports, `None` if either is unknown.
    #[must_use]
    pub fn distance(&self, from: &AirportId, to: &AirportId) -> Option<f64> {
        let a = self.get(from)?;
        let b = self.get(to)?;
        Some(a.distance_to(b))
    }

    /// Airports other than `from` reachable with `range_km`, nearest first.
    #[must_use]
    pub fn nearby(&self, from: &AirportId, range_km: f64) -> Vec<NearbyAirport> {
        let Some(origin) = self.get(from) else {
            return Vec::new();
        };
        if range_km <= 0.0 {
            return Vec::new();
        }
        let mut nearby: Vec<NearbyAirport> = self
            .airports
            .iter()
            .filter(|airport| airport.ident != origin.ident)
            .filter_map(|airport| {
                let distance_km = origin.distance_to(airport);
                (distance_km > 0.0 && distance_km <= range_km).then(|| NearbyAirport {
                    ident: airport.ident.clone(),
                    name: airport.name.clone(),
                    country: airport.country.clone(),
                    distance_km,
                })
            })
            .collect();
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby
    }
}
