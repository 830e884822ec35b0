//! Ties reference data, the location tree and the listings source together.

use std::future::Future;

use crate::client::ListingsError;
use crate::error::{GeoError, Result};
use crate::location_tree::{CountyNode, LocationTree};
use crate::proximity::CountyResolver;
use crate::states::{normalize_name, state_abbrev};
use crate::tree_store::TreeSink;
use crate::types::{CountyRef, Listing, ListingsQuery};
use crate::zipcode::ZipIndex;

/// Anything that can answer `search(location, tag)` with listings.
pub trait ListingsSource {
    fn search(
        &self,
        location: &str,
        tag: Option<&str>,
    ) -> impl Future<Output = std::result::Result<Vec<Listing>, ListingsError>>;
}

/// What happened to the stored tree during a resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// Nothing was added, nothing written.
    Unchanged,
    Saved,
    /// The tree changed in memory but could not be written.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub state: String,
    pub county: CountyNode,
    pub created_state: bool,
    pub created_county: bool,
    pub persist: PersistOutcome,
}

impl Resolution {
    pub fn nearby(&self) -> &[CountyRef] {
        self.county.nearby()
    }
}

#[derive(Debug, Default)]
pub struct ListingsOutcome {
    pub listings: Vec<Listing>,
    /// Locations whose search failed, with the error text.
    pub failures: Vec<(String, String)>,
    pub locations_searched: usize,
}

pub struct QueryOrchestrator<'a, R, S> {
    zips: &'a ZipIndex,
    resolver: R,
    sink: S,
}

impl<'a, R: CountyResolver, S: TreeSink> QueryOrchestrator<'a, R, S> {
    pub fn new(zips: &'a ZipIndex, resolver: R, sink: S) -> Self {
        Self { zips, resolver, sink }
    }

    /// Looks up (or computes and records) the nearby high-poverty counties
    /// of `county` in the full-name `state`.
    ///
    /// Any new state or county node triggers a full save of the tree. A
    /// failed save is reported in the result; the in-memory tree keeps the
    /// new node either way.
    pub fn resolve(&self, tree: &mut LocationTree, state: &str, county: &str) -> Result<Resolution> {
        let label = normalize_name(state);
        let abbrev = state_abbrev(&label).ok_or_else(|| GeoError::UnknownState(state.trim().to_string()))?;
        let county_ref = CountyRef::new(&normalize_name(county), abbrev);

        let cached = tree
            .state(&label)
            .and_then(|s| s.county(&county_ref))
            .is_some();
        if !cached && (county_ref.county.is_empty() || !self.zips.has_county(&county_ref.county, abbrev)) {
            return Err(GeoError::UnknownCounty {
                county: county_ref.county,
                state: abbrev.to_string(),
            });
        }

        let (created_state, resolved) = {
            let (state_node, created_state) = tree.get_or_create_state(&label);
            let resolved = state_node
                .get_or_create_county(&county_ref, &self.resolver)
                .map(|(node, created)| (node.clone(), created));
            (created_state, resolved)
        };

        let (node, created_county) = match resolved {
            Ok(found) => found,
            Err(e) => {
                if created_state {
                    self.persist(tree);
                }
                return Err(e);
            }
        };

        let persist = if created_state || created_county {
            self.persist(tree)
        } else {
            tracing::debug!(state = %label, county = %county_ref, "Location tree hit");
            PersistOutcome::Unchanged
        };

        Ok(Resolution {
            state: label,
            county: node,
            created_state,
            created_county,
            persist,
        })
    }

    fn persist(&self, tree: &LocationTree) -> PersistOutcome {
        match self.sink.save(tree) {
            Ok(()) => PersistOutcome::Saved,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save location tree");
                PersistOutcome::Failed(e.to_string())
            }
        }
    }

    /// Searches every "City, ST" location of every requested county, one
    /// request at a time. A failed location is recorded and skipped.
    pub async fn search_listings<L: ListingsSource>(
        &self,
        query: &ListingsQuery,
        source: &L,
    ) -> ListingsOutcome {
        let mut outcome = ListingsOutcome::default();
        let tag = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());

        for county in &query.counties {
            let locations = self
                .zips
                .distinct_display_names_for_county(&county.county, &county.state);
            if locations.is_empty() {
                tracing::warn!(%county, "County has no zip locations to search");
            }
            for location in locations {
                outcome.locations_searched += 1;
                match source.search(&location, tag).await {
                    Ok(listings) => {
                        tracing::debug!(%location, found = listings.len(), "Listings fetched");
                        outcome.listings.extend(listings);
                    }
                    Err(e) => {
                        tracing::warn!(%location, error = %e, "Listings search failed");
                        outcome.failures.push((location, e.to_string()));
                    }
                }
            }
        }
        outcome
    }
}

/// Narrows a nearby-county list to the user's choice.
///
/// `choice` is a county name, optionally followed by `, ST`. Returns `None`
/// when nothing in `nearby` matches.
pub fn select_counties(nearby: &[CountyRef], choice: &str) -> Option<Vec<CountyRef>> {
    let (county, state) = match choice.rsplit_once(',') {
        Some((county, state)) => (normalize_name(county), Some(normalize_name(state))),
        None => (normalize_name(choice), None),
    };
    let picked: Vec<CountyRef> = nearby
        .iter()
        .filter(|c| c.county == county && state.as_ref().is_none_or(|s| &c.state == s))
        .cloned()
        .collect();
    (!picked.is_empty()).then_some(picked)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;
    use crate::location_tree::test_support::CountingResolver;
    use crate::seed::seed_tree;
    use crate::zipcode::fixtures::zip;

    #[derive(Default)]
    struct RecordingSink {
        saves: Cell<usize>,
        fail: bool,
    }

    impl TreeSink for RecordingSink {
        fn save(&self, _tree: &LocationTree) -> Result<()> {
            self.saves.set(self.saves.get() + 1);
            if self.fail {
                return Err(GeoError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    fn zips() -> ZipIndex {
        ZipIndex::from_records(vec![
            zip("62025", 38.8, -89.9, "Madison", "IL", "EDWARDSVILLE, IL"),
            zip("62901", 37.7, -89.2, "Jackson", "IL", "CARBONDALE, IL"),
            zip("62902", 37.6, -89.2, "Jackson", "IL", "CARBONDALE, IL"),
            zip("62966", 37.8, -89.3, "Jackson", "IL", "MURPHYSBORO, IL"),
            zip("43701", 39.9, -82.0, "Muskingum", "OH", "ZANESVILLE, OH"),
            zip("63650", 37.6, -90.6, "Iron", "MO", "IRONTON, MO"),
        ])
    }

    #[test]
    fn test_seeded_county_is_not_recomputed() {
        let zips = zips();
        let resolver = CountingResolver::new(vec![]);
        let sink = RecordingSink::default();
        let orchestrator = QueryOrchestrator::new(&zips, &resolver, &sink);
        let mut tree = seed_tree();

        let resolution = orchestrator.resolve(&mut tree, "ILLINOIS", "MADISON").unwrap();
        assert_eq!(
            resolution.nearby(),
            &[
                CountyRef::new("WASHINGTON", "MO"),
                CountyRef::new("JACKSON", "IL"),
                CountyRef::new("IRON", "MO"),
            ]
        );
        assert_eq!(resolver.calls.get(), 0);
        assert_eq!(sink.saves.get(), 0);
        assert_eq!(resolution.persist, PersistOutcome::Unchanged);
        assert_eq!(tree, seed_tree());
    }

    #[test]
    fn test_new_state_and_county_are_resolved_and_saved() {
        let zips = zips();
        let resolver = CountingResolver::new(vec![CountyRef::new("ATHENS", "OH")]);
        let sink = RecordingSink::default();
        let orchestrator = QueryOrchestrator::new(&zips, &resolver, &sink);
        let mut tree = seed_tree();

        let resolution = orchestrator.resolve(&mut tree, "ohio", " muskingum ").unwrap();
        assert!(resolution.created_state);
        assert!(resolution.created_county);
        assert_eq!(resolution.state, "OHIO");
        assert_eq!(resolution.county.county(), &CountyRef::new("MUSKINGUM", "OH"));
        assert_eq!(resolution.persist, PersistOutcome::Saved);
        assert_eq!(sink.saves.get(), 1);
        assert_eq!(tree.child_labels().last(), Some(&"OHIO"));

        // Second query is a cache hit
        let again = orchestrator.resolve(&mut tree, "Ohio", "Muskingum").unwrap();
        assert!(!again.created_state && !again.created_county);
        assert_eq!(resolver.calls.get(), 1);
        assert_eq!(sink.saves.get(), 1);
        assert_eq!(tree.state("OHIO").unwrap().counties().len(), 1);
    }

    #[test]
    fn test_invalid_inputs_do_not_touch_tree() {
        let zips = zips();
        let resolver = CountingResolver::new(vec![]);
        let sink = RecordingSink::default();
        let orchestrator = QueryOrchestrator::new(&zips, &resolver, &sink);
        let mut tree = seed_tree();

        let err = orchestrator.resolve(&mut tree, "Atlantis", "Madison").unwrap_err();
        assert!(matches!(err, GeoError::UnknownState(s) if s == "Atlantis"));
        let err = orchestrator.resolve(&mut tree, "Ohio", "Franklin").unwrap_err();
        assert!(matches!(err, GeoError::UnknownCounty { .. }));
        assert_eq!(tree, seed_tree());
        assert_eq!(sink.saves.get(), 0);
    }

    #[test]
    fn test_save_failure_keeps_in_memory_tree() {
        let zips = zips();
        let resolver = CountingResolver::new(vec![CountyRef::new("IRON", "MO")]);
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let orchestrator = QueryOrchestrator::new(&zips, &resolver, &sink);
        let mut tree = seed_tree();

        let resolution = orchestrator.resolve(&mut tree, "Illinois", "Jackson").unwrap();
        assert!(matches!(resolution.persist, PersistOutcome::Failed(ref e) if e.contains("disk full")));
        assert!(tree
            .state("ILLINOIS")
            .unwrap()
            .county(&CountyRef::new("JACKSON", "IL"))
            .is_some());
    }

    struct FakeListings {
        by_location: HashMap<&'static str, Vec<Listing>>,
        seen: RefCell<Vec<(String, Option<String>)>>,
    }

    impl ListingsSource for FakeListings {
        async fn search(
            &self,
            location: &str,
            tag: Option<&str>,
        ) -> std::result::Result<Vec<Listing>, ListingsError> {
            self.seen
                .borrow_mut()
                .push((location.to_string(), tag.map(str::to_string)));
            self.by_location
                .get(location)
                .cloned()
                .ok_or_else(|| ListingsError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
        }
    }

    fn listing(title: &str) -> Listing {
        Listing {
            listing_id: None,
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            price: None,
            currency_code: None,
        }
    }

    #[tokio::test]
    async fn test_search_listings_skips_failed_locations() {
        let zips = zips();
        let orchestrator = QueryOrchestrator::new(&zips, CountingResolver::new(vec![]), RecordingSink::default());
        let source = FakeListings {
            by_location: HashMap::from([
                ("CARBONDALE, IL", vec![listing("mug"), listing("scarf")]),
                ("IRONTON, MO", vec![listing("quilt")]),
            ]),
            seen: RefCell::new(Vec::new()),
        };
        let query = ListingsQuery {
            counties: vec![CountyRef::new("JACKSON", "IL"), CountyRef::new("IRON", "MO")],
            tag: Some(" necklace ".to_string()),
        };

        let outcome = orchestrator.search_listings(&query, &source).await;
        let titles: Vec<_> = outcome.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["mug", "scarf", "quilt"]);
        assert_eq!(outcome.locations_searched, 3);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "MURPHYSBORO, IL");
        assert!(source
            .seen
            .borrow()
            .iter()
            .all(|(_, tag)| tag.as_deref() == Some("necklace")));
    }

    #[test]
    fn test_select_counties() {
        let nearby = vec![
            CountyRef::new("WASHINGTON", "MO"),
            CountyRef::new("JACKSON", "IL"),
            CountyRef::new("JACKSON", "MO"),
        ];
        assert_eq!(
            select_counties(&nearby, "washington"),
            Some(vec![CountyRef::new("WASHINGTON", "MO")])
        );
        assert_eq!(select_counties(&nearby, "Jackson").map(|c| c.len()), Some(2));
        assert_eq!(
            select_counties(&nearby, "jackson, mo"),
            Some(vec![CountyRef::new("JACKSON", "MO")])
        );
        assert_eq!(select_counties(&nearby, "Cook"), None);
    }
}
