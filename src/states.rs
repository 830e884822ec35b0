//! US state names, postal abbreviations and input validation predicates.
//!
//! The predicates never fail; they only answer yes or no, so a prompt loop
//! can call them on any raw input.

use crate::zipcode::ZipIndex;

const STATES: &[(&str, &str)] = &[
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
    ("DISTRICT OF COLUMBIA", "DC"),
    ("AMERICAN SAMOA", "AS"),
    ("GUAM", "GU"),
    ("NORTHERN MARIANA ISLANDS", "MP"),
    ("PUERTO RICO", "PR"),
    ("UNITED STATES MINOR OUTLYING ISLANDS", "UM"),
    ("U.S. VIRGIN ISLANDS", "VI"),
];

/// Trims, uppercases and collapses inner whitespace.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Postal abbreviation for a full state name, in any case.
pub fn state_abbrev(state: &str) -> Option<&'static str> {
    let state = normalize_name(state);
    STATES
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, abbrev)| *abbrev)
}

pub fn is_valid_state(state: &str) -> bool {
    state_abbrev(state).is_some()
}

/// Whether `county` appears in the zip index under the given full state name.
pub fn is_valid_county(zips: &ZipIndex, county: &str, state: &str) -> bool {
    match state_abbrev(state) {
        Some(abbrev) => !county.trim().is_empty() && zips.has_county(&normalize_name(county), abbrev),
        None => false,
    }
}
