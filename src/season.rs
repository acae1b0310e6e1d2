// 📅 Season classifier
//
// Months are compared in canonical form ("March": first letter upper, rest
// lower) everywhere: validation, peak lookup and persistence.

use chrono::Month;

/// Months that attract the peak-season surcharge
pub const PEAK_MONTHS: [Month; 4] = [Month::March, Month::April, Month::May, Month::December];

/// All twelve months, January first
pub fn all_months() -> impl Iterator<Item = Month> {
    std::iter::successors(Some(Month::January), |m| match m {
        Month::December => None,
        _ => Some(m.succ()),
    })
}

/// Canonical capitalization: first character uppercase, remainder lowercase.
pub fn normalize_month(input: &str) -> String {
    let mut chars = input.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Full month name (any case) to `Month`. Abbreviations are rejected.
pub fn parse_month(input: &str) -> Option<Month> {
    let normalized = normalize_month(input);
    all_months().find(|m| m.name() == normalized)
}

pub fn is_valid_month(input: &str) -> bool {
    parse_month(input).is_some()
}

/// True iff `input` names March, April, May or December.
pub fn is_peak_season(input: &str) -> bool {
    parse_month(input).is_some_and(|m| PEAK_MONTHS.contains(&m))
}
