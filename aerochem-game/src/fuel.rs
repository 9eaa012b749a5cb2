//! Fuel model: currency to range conversion and trip affordability.
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::numbers::{floor_f64_to_i64, i64_to_f64};

/// Range consumed by flying `distance_km`. One kilometre costs one kilometre.
#[must_use]
pub const fn range_cost(distance_km: f64) -> f64 {
    distance_km
}

/// Whether a trip of `distance_km` fits in the remaining range.
#[must_use]
pub fn can_afford(range_km: f64, distance_km: f64) -> bool {
    range_cost(distance_km) <= range_km
}

/// A validated fuel purchase in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelPurchase {
    /// Currency spent.
    pub amount: i64,
    /// Kilometres of range gained.
    pub range_gained_km: i64,
}

impl FuelPurchase {
    /// Validate a requested spend and price it at `rate_km_per_unit`.
    ///
    /// Fractional amounts are floored to whole currency units.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidAmount` if the amount is not finite or does
    /// not amount to at least one whole currency unit.
    pub fn quote(amount: f64, rate_km_per_unit: i64) -> Result<Self, GameError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GameError::InvalidAmount { amount });
        }
        let whole = floor_f64_to_i64(amount);
        if whole < 1 {
            return Err(GameError::InvalidAmount { amount });
        }
        let range_gained_km = whole
            .checked_mul(rate_km_per_unit)
            .ok_or(GameError::InvalidAmount { amount })?;
        Ok(Self {
            amount: whole,
            range_gained_km,
        })
    }

    #[must_use]
    pub fn range_gained(&self) -> f64 {
        i64_to_f64(self.range_gained_km)
    }
}

/// Range bought by `amount` currency at the standard exchange rate.
///
/// # Errors
///
/// Returns `GameError::InvalidAmount` for non-positive or non-finite amounts.
pub fn fuel_purchase(amount: f64) -> Result<f64, GameError> {
    FuelPurchase::quote(amount, crate::constants::FUEL_RATE_KM_PER_UNIT)
        .map(|purchase| purchase.range_gained())
}
