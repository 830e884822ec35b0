//! Conversion between [`LocationTree`] and its JSON storage form.
//!
//! Two layouts are understood, both rooted at `{country: {state: ...}}`:
//!
//! - structured: each state holds a list of
//!   `{"county": C, "state": S, "nearby": [[c, s], ...]}` entries;
//! - legacy: each state is an object keyed by the tuple text
//!   `"('C', 'S')"`, mapping to the nearby list. Each nearby county is
//!   wrapped in its own one-element list: `[[["JACKSON", "IL"]], ...]`.
//!
//! Decoding accepts either layout per state, and legacy nearby counties with
//! or without the wrapping list. Key and list order are kept (`serde_json` is
//! built with `preserve_order`). A county listed twice in one state keeps its
//! first entry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GeoError, Result};
use crate::location_tree::{CountyNode, LocationTree, StateNode};
use crate::types::CountyRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeFormat {
    #[default]
    Structured,
    /// Tuple-text county keys, readable by older copies of the data file.
    Legacy,
}

#[derive(Debug, Serialize, Deserialize)]
struct CountyEntry {
    county: String,
    state: String,
    #[serde(default)]
    nearby: Vec<CountyRef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyLeaf {
    Pair(CountyRef),
    Wrapped([CountyRef; 1]),
}

impl From<LegacyLeaf> for CountyRef {
    fn from(leaf: LegacyLeaf) -> Self {
        match leaf {
            LegacyLeaf::Pair(county) | LegacyLeaf::Wrapped([county]) => county,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StateBody {
    Entries(Vec<CountyEntry>),
    Keyed(Map<String, Value>),
}

pub fn encode(tree: &LocationTree, format: TreeFormat) -> Value {
    let mut states = Map::new();
    for state in tree.states() {
        let body = match format {
            TreeFormat::Structured => Value::Array(
                state
                    .counties()
                    .iter()
                    .map(|node| {
                        serde_json::json!({
                            "county": node.county().county,
                            "state": node.county().state,
                            "nearby": node.nearby(),
                        })
                    })
                    .collect(),
            ),
            TreeFormat::Legacy => Value::Object(
                state
                    .counties()
                    .iter()
                    .map(|node| {
                        let leaves: Vec<[&CountyRef; 1]> = node.nearby().iter().map(|c| [c]).collect();
                        (legacy_key(node.county()), serde_json::json!(leaves))
                    })
                    .collect(),
            ),
        };
        states.insert(state.label().to_string(), body);
    }

    let mut root = Map::new();
    root.insert(tree.country().to_string(), Value::Object(states));
    Value::Object(root)
}

pub fn decode(value: &Value) -> Result<LocationTree> {
    let root = value.as_object().ok_or(GeoError::MissingCountry)?;
    let (country, states) = root.iter().next().ok_or(GeoError::MissingCountry)?;
    let states: Map<String, Value> = serde_json::from_value(states.clone())?;

    let mut tree = LocationTree::new(country.as_str());
    for (label, body) in states {
        let mut state = StateNode::new(label);
        match serde_json::from_value::<StateBody>(body)? {
            StateBody::Entries(entries) => {
                for entry in entries {
                    let county = CountyRef::new(&entry.county, &entry.state);
                    push_unique(&mut state, CountyNode::new(county, entry.nearby));
                }
            }
            StateBody::Keyed(keyed) => {
                for (key, nearby) in keyed {
                    let county = parse_legacy_key(&key)?;
                    let leaves: Vec<LegacyLeaf> = serde_json::from_value(nearby)?;
                    let nearby = leaves.into_iter().map(CountyRef::from).collect();
                    push_unique(&mut state, CountyNode::new(county, nearby));
                }
            }
        }
        tree.push_state(state);
    }
    Ok(tree)
}

fn push_unique(state: &mut StateNode, node: CountyNode) {
    if state.county(node.county()).is_some() {
        tracing::warn!(state = state.label(), county = %node.county(), "Skipping duplicate county entry");
        return;
    }
    state.push_county(node);
}

/// Formats a county the way the legacy file keyed it: `('MADISON', 'IL')`.
pub fn legacy_key(county: &CountyRef) -> String {
    let quote = if county.county.contains('\'') && !county.county.contains('"') {
        '"'
    } else {
        '\''
    };
    format!("({quote}{}{quote}, '{}')", county.county, county.state)
}

/// Inverts [`legacy_key`]. The layout is fixed width at both ends: two
/// characters of prefix, then the county, then an eight character suffix
/// `', 'ST')` holding the state abbreviation.
pub fn parse_legacy_key(key: &str) -> Result<CountyRef> {
    let malformed = || GeoError::MalformedCountyKey(key.to_string());
    let bytes = key.as_bytes();
    let n = bytes.len();
    if n <= 10 || bytes[0] != b'(' {
        return Err(malformed());
    }
    let quote = bytes[1];
    if quote != b'\'' && quote != b'"' {
        return Err(malformed());
    }
    let suffix = &bytes[n - 8..];
    let well_formed = suffix[0] == quote
        && &suffix[1..4] == b", '"
        && suffix[4..6].iter().all(u8::is_ascii_alphabetic)
        && &suffix[6..] == b"')";
    if !well_formed {
        return Err(malformed());
    }
    // Both cut points sit next to ASCII bytes, so they are char boundaries.
    Ok(CountyRef::new(&key[2..n - 8], &key[n - 4..n - 2]))
}
