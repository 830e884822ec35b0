//! Nearby high-poverty county resolution.
//!
//! For an origin county, every zip in that county is used as the center of a
//! square bounding box. Counties touched by any of those boxes are filtered
//! down to the high-poverty ones. The box grows one degree at a time until
//! something is found or `max_radius` is reached.

use std::collections::HashSet;

use crate::error::{GeoError, Result};
use crate::poverty::PovertyClassifier;
use crate::types::{CountyRef, ZipRecord};
use crate::zipcode::ZipIndex;

/// Exceeds the span of the contiguous US.
pub const DEFAULT_MAX_RADIUS: u32 = 50;

/// Computes the nearby high-poverty counties of an origin county.
pub trait CountyResolver {
    fn nearby_high_poverty_counties(&self, origin: &CountyRef) -> Result<Vec<CountyRef>>;
}

impl<T: CountyResolver + ?Sized> CountyResolver for &T {
    fn nearby_high_poverty_counties(&self, origin: &CountyRef) -> Result<Vec<CountyRef>> {
        (**self).nearby_high_poverty_counties(origin)
    }
}

pub struct ProximityResolver<'a> {
    zips: &'a ZipIndex,
    poverty: &'a PovertyClassifier,
    max_radius: u32,
}

impl<'a> ProximityResolver<'a> {
    pub fn new(zips: &'a ZipIndex, poverty: &'a PovertyClassifier) -> Self {
        Self {
            zips,
            poverty,
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }

    pub fn with_max_radius(mut self, max_radius: u32) -> Self {
        self.max_radius = max_radius.max(1);
        self
    }

    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }

    /// Distinct counties represented in a set of zip records, first-seen order.
    pub fn nearby_counties<'r>(records: impl IntoIterator<Item = &'r ZipRecord>) -> Vec<CountyRef> {
        let mut seen = HashSet::new();
        records
            .into_iter()
            .map(ZipRecord::county_ref)
            .filter(|county| seen.insert(county.clone()))
            .collect()
    }

    /// Counties whose zips fall inside the bounding box around one zip.
    pub fn nearby_counties_of_zip(&self, zip: &str, radius: u32) -> Result<Vec<CountyRef>> {
        let (lat, long) = self.zips.lookup_coordinate(zip)?;
        let close = self.zips.find_within_box(lat, long, f64::from(radius));
        Ok(Self::nearby_counties(close))
    }

    /// A single pass at a fixed radius over every zip of the origin county.
    pub fn high_poverty_counties_within(&self, origin: &CountyRef, radius: u32) -> Result<Vec<CountyRef>> {
        let zips = self.origin_zips(origin)?;
        self.scan(&zips, radius)
    }

    fn origin_zips(&self, origin: &CountyRef) -> Result<Vec<&'a ZipRecord>> {
        let zips = self.zips.find_by_county(&origin.county, &origin.state);
        if zips.is_empty() {
            return Err(GeoError::UnknownCounty {
                county: origin.county.clone(),
                state: origin.state.clone(),
            });
        }
        Ok(zips)
    }

    fn scan(&self, zips: &[&ZipRecord], radius: u32) -> Result<Vec<CountyRef>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for zip in zips {
            let nearby = self.nearby_counties_of_zip(&zip.zip, radius)?;
            for county in self.poverty.filter_high_poverty(&nearby) {
                if seen.insert(county.clone()) {
                    found.push(county);
                }
            }
        }
        Ok(found)
    }
}

impl CountyResolver for ProximityResolver<'_> {
    fn nearby_high_poverty_counties(&self, origin: &CountyRef) -> Result<Vec<CountyRef>> {
        let zips = self.origin_zips(origin)?;
        for radius in 1..=self.max_radius {
            let found = self.scan(&zips, radius)?;
            if !found.is_empty() {
                tracing::debug!(%origin, radius, found = found.len(), "Resolved nearby high-poverty counties");
                return Ok(found);
            }
            tracing::trace!(%origin, radius, "No high-poverty county yet, widening search");
        }
        tracing::warn!(%origin, max_radius = self.max_radius, "Search radius exhausted");
        Err(GeoError::NoPovertyCountyFound {
            origin: origin.clone(),
            max_radius: self.max_radius,
        })
    }
}
