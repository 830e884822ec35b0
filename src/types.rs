use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One row of the zip-code reference dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZipRecord {
    #[serde(deserialize_with = "string_from_scalar")]
    pub zip: String,
    #[serde(rename = "Latitude", deserialize_with = "f64_from_scalar")]
    pub latitude: f64,
    #[serde(rename = "Longitude", deserialize_with = "f64_from_scalar")]
    pub longitude: f64,
    #[serde(rename = "County Name")]
    pub county_name: String,
    #[serde(rename = "State")]
    pub state_abbrev: String,
    /// "City, ST" label used as the listings API location.
    #[serde(rename = "Zipcode name")]
    pub display_name: String,
}

impl ZipRecord {
    pub fn county_ref(&self) -> CountyRef {
        CountyRef::new(&self.county_name, &self.state_abbrev)
    }
}

/// A county identified by its (uppercased) name and 2-letter state abbreviation.
///
/// Serialized as a `[county, state]` pair, which is how the location data file
/// stores leaf entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct CountyRef {
    pub county: String,
    pub state: String,
}

impl CountyRef {
    pub fn new(county: &str, state: &str) -> Self {
        Self {
            county: county.trim().to_uppercase(),
            state: state.trim().to_uppercase(),
        }
    }

    /// Case-insensitive match against raw dataset values.
    pub fn matches(&self, county: &str, state: &str) -> bool {
        same_name(&self.county, county.trim()) && same_name(&self.state, state.trim())
    }
}

/// Compares place names ignoring case over the full Unicode range, so
/// "DOÑA ANA" and "Doña Ana" are the same county.
pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl From<(String, String)> for CountyRef {
    fn from((county, state): (String, String)) -> Self {
        Self::new(&county, &state)
    }
}

impl From<CountyRef> for (String, String) {
    fn from(county: CountyRef) -> Self {
        (county.county, county.state)
    }
}

impl fmt::Display for CountyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.county, self.state)
    }
}

/// One row of the county poverty dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyPovertyRecord {
    pub county: String,
    pub state: String,
    pub is_high_poverty: bool,
}

/// Transient query handed to the listings collaborator.
#[derive(Debug, Clone, Default)]
pub struct ListingsQuery {
    pub counties: Vec<CountyRef>,
    pub tag: Option<String>,
}

/// A marketplace listing. Fields not named here are ignored; `Display`
/// shows only the title and URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub listing_id: Option<u64>,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.url)
    }
}

/// Envelope returned by the listings endpoint. `count` is the API's total
/// match count, which may exceed the page in `results`.
#[derive(Debug, Deserialize)]
pub struct ListingsResponse {
    #[serde(default)]
    pub count: Option<u64>,
    pub results: Vec<Listing>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

// The upstream dataset stores coordinates as strings and zips as either
// strings or numbers (leading zeroes dropped).
fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s.trim().to_string(),
        Scalar::Number(n) => n.to_string(),
    })
}

fn f64_from_scalar<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate: {s:?}"))),
        Scalar::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid coordinate: {n}"))),
    }
}
