//! In-memory zip-code reference table.
//!
//! Loaded once at startup and never mutated. Every query is a linear scan;
//! the dataset is a few tens of thousands of rows, so no spatial index is kept.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{GeoError, Result};
use crate::types::{ZipRecord, same_name};

#[derive(Debug, Clone, Default)]
pub struct ZipIndex {
    records: Vec<ZipRecord>,
}

impl ZipIndex {
    pub fn from_records(records: Vec<ZipRecord>) -> Self {
        Self { records }
    }

    /// Load the zip dataset from a JSON array on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| GeoError::Dataset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let records: Vec<ZipRecord> =
            serde_json::from_str(&raw).map_err(|e| GeoError::Dataset {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), records = records.len(), "Loaded zip index");
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Coordinates of a zip. Zips handed in here always come from the index
    /// itself, so a miss means the index and its caller disagree.
    pub fn lookup_coordinate(&self, zip: &str) -> Result<(f64, f64)> {
        match self.records.iter().find(|r| r.zip == zip) {
            Some(record) => Ok((record.latitude, record.longitude)),
            None => {
                tracing::error!(zip, "Zip lookup missed; index is inconsistent with caller");
                Err(GeoError::ZipNotFound(zip.to_string()))
            }
        }
    }

    /// Every record strictly inside the square `lat ± radius`, `long ± radius`.
    pub fn find_within_box(&self, lat: f64, long: f64, radius: f64) -> Vec<&ZipRecord> {
        self.records
            .iter()
            .filter(|r| {
                lat - radius < r.latitude
                    && r.latitude < lat + radius
                    && long - radius < r.longitude
                    && r.longitude < long + radius
            })
            .collect()
    }

    pub fn find_by_county(&self, county: &str, state: &str) -> Vec<&ZipRecord> {
        let county = county.trim();
        let state = state.trim();
        self.records
            .iter()
            .filter(|r| {
                same_name(&r.county_name, county) && same_name(&r.state_abbrev, state)
            })
            .collect()
    }

    pub fn has_county(&self, county: &str, state: &str) -> bool {
        let county = county.trim();
        let state = state.trim();
        self.records.iter().any(|r| {
            same_name(&r.county_name, county) && same_name(&r.state_abbrev, state)
        })
    }

    /// Distinct "City, ST" labels of a county, used as listings locations.
    pub fn distinct_display_names_for_county(&self, county: &str, state: &str) -> BTreeSet<String> {
        self.find_by_county(county, state)
            .into_iter()
            .map(|r| r.display_name.clone())
            .collect()
    }
}
