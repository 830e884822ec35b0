//! Runtime configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, EtsyConfig};
use crate::proximity::DEFAULT_MAX_RADIUS;
use crate::tree_codec::TreeFormat;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub listings_endpoint: String,
    pub request_timeout: Duration,
    pub zip_data: PathBuf,
    pub county_data: PathBuf,
    pub location_data: PathBuf,
    pub tree_format: TreeFormat,
    pub max_radius: u32,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            listings_endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            zip_data: PathBuf::from("final_zipcodes.json"),
            county_data: PathBuf::from("county_data.csv"),
            location_data: PathBuf::from("location_data.json"),
            tree_format: TreeFormat::Structured,
            max_radius: DEFAULT_MAX_RADIUS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable values fall back to
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: get("ETSY_API_KEY"),
            listings_endpoint: get("GFG_LISTINGS_ENDPOINT").unwrap_or(defaults.listings_endpoint),
            request_timeout: get("GFG_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            zip_data: get("GFG_ZIP_DATA").map(PathBuf::from).unwrap_or(defaults.zip_data),
            county_data: get("GFG_COUNTY_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.county_data),
            location_data: get("GFG_LOCATION_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.location_data),
            tree_format: match get("GFG_LEGACY_TREE_FORMAT").as_deref() {
                Some("1" | "true" | "yes") => TreeFormat::Legacy,
                _ => defaults.tree_format,
            },
            max_radius: get("GFG_MAX_RADIUS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|r| *r > 0)
                .unwrap_or(defaults.max_radius),
            page_size: get("GFG_PAGE_SIZE")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
        }
    }

    pub fn etsy(&self) -> Option<EtsyConfig> {
        let api_key = self.api_key.clone()?;
        Some(EtsyConfig {
            api_key,
            endpoint: self.listings_endpoint.clone(),
            timeout: self.request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert!(config.api_key.is_none());
        assert!(config.etsy().is_none());
        assert_eq!(config.listings_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.location_data, PathBuf::from("location_data.json"));
        assert_eq!(config.max_radius, 50);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.tree_format, TreeFormat::Structured);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("ETSY_API_KEY", " abc123 "),
            ("GFG_MAX_RADIUS", "12"),
            ("GFG_PAGE_SIZE", "25"),
            ("GFG_REQUEST_TIMEOUT_SECS", "3"),
            ("GFG_LOCATION_DATA", "/tmp/tree.json"),
            ("GFG_LEGACY_TREE_FORMAT", "true"),
        ]);
        let etsy = config.etsy().unwrap();
        assert_eq!(etsy.api_key, "abc123");
        assert_eq!(etsy.timeout, Duration::from_secs(3));
        assert_eq!(config.max_radius, 12);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.location_data, PathBuf::from("/tmp/tree.json"));
        assert_eq!(config.tree_format, TreeFormat::Legacy);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config(&[("GFG_MAX_RADIUS", "0"), ("GFG_PAGE_SIZE", "lots"), ("ETSY_API_KEY", "  ")]);
        assert_eq!(config.max_radius, 50);
        assert_eq!(config.page_size, 100);
        assert!(config.api_key.is_none());
    }
}
