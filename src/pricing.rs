// 🛏️ Room categories and the pricing rule
//
// Three fixed categories, each with an immutable nightly base rate.
// Peak-season stays carry a 20% surcharge.

use crate::error::ReservationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier applied to peak-season stays
pub const PEAK_SURCHARGE: f64 = 1.2;

// ============================================================================
// ROOM CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomCategory {
    /// Basic amenities
    Standard,

    /// Enhanced comfort
    Deluxe,

    /// Luxury amenities
    Suite,
}

impl RoomCategory {
    /// All categories in menu order
    pub const ALL: [RoomCategory; 3] = [
        RoomCategory::Standard,
        RoomCategory::Deluxe,
        RoomCategory::Suite,
    ];

    /// Canonical name, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomCategory::Standard => "Standard",
            RoomCategory::Deluxe => "Deluxe",
            RoomCategory::Suite => "Suite",
        }
    }

    /// Nightly base rate in currency units
    pub fn base_rate(&self) -> f64 {
        match self {
            RoomCategory::Standard => 1000.0,
            RoomCategory::Deluxe => 2000.0,
            RoomCategory::Suite => 3000.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoomCategory::Standard => "A Standard Room with basic amenities.",
            RoomCategory::Deluxe => "A Deluxe Room with enhanced comfort.",
            RoomCategory::Suite => "A Suite Room with luxury amenities.",
        }
    }

    /// Resolve a user choice: a menu number (`"1"`..`"3"`) or a category
    /// name in any letter case.
    pub fn resolve(choice: &str) -> Result<Self, ReservationError> {
        let trimmed = choice.trim();

        if let Ok(n) = trimmed.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| ReservationError::InvalidCategory(choice.to_string()));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ReservationError::InvalidCategory(choice.to_string()))
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomCategory {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

// ============================================================================
// PRICING RULE
// ============================================================================

/// Total price for a stay, rounded to two decimals.
///
/// Callers reject `nights < 1` before getting here.
pub fn price(category: RoomCategory, nights: u32, is_peak: bool) -> f64 {
    let base = f64::from(nights) * category.base_rate();
    let total = if is_peak { base * PEAK_SURCHARGE } else { base };

    (total * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_peak_price() {
        for category in RoomCategory::ALL {
            for nights in 1..=10 {
                assert_eq!(
                    price(category, nights, false),
                    f64::from(nights) * category.base_rate()
                );
            }
        }
    }

    #[test]
    fn test_peak_surcharge() {
        assert_eq!(price(RoomCategory::Standard, 1, true), 1200.0);
        assert_eq!(price(RoomCategory::Deluxe, 2, true), 4800.0);
        assert_eq!(price(RoomCategory::Suite, 3, true), 10800.0);
        assert_eq!(price(RoomCategory::Suite, 7, true), 25200.0);
    }

    #[test]
    fn test_resolve_by_name_and_number() {
        assert_eq!(RoomCategory::resolve("Standard").unwrap(), RoomCategory::Standard);
        assert_eq!(RoomCategory::resolve("deluxe").unwrap(), RoomCategory::Deluxe);
        assert_eq!(RoomCategory::resolve(" SUITE ").unwrap(), RoomCategory::Suite);
        assert_eq!(RoomCategory::resolve("1").unwrap(), RoomCategory::Standard);
        assert_eq!(RoomCategory::resolve("3").unwrap(), RoomCategory::Suite);
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        for choice in ["Penthouse", "", "0", "4"] {
            assert!(matches!(
                RoomCategory::resolve(choice),
                Err(ReservationError::InvalidCategory(_))
            ));
        }
    }
}
