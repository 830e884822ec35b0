//! Persistent cache of resolved counties.
//!
//! Root (country) → states → counties → nearby high-poverty counties.
//! Children keep insertion order. A county node only ever exists together
//! with its computed leaf list, so a missing node means "not computed yet".

use crate::error::Result;
use crate::proximity::CountyResolver;
use crate::types::CountyRef;

pub const DEFAULT_COUNTRY: &str = "United States";

#[derive(Debug, Clone, PartialEq)]
pub struct LocationTree {
    country: String,
    states: Vec<StateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateNode {
    label: String,
    counties: Vec<CountyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountyNode {
    county: CountyRef,
    nearby: Vec<CountyRef>,
}

impl LocationTree {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            states: Vec::new(),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn states(&self) -> &[StateNode] {
        &self.states
    }

    pub fn state(&self, label: &str) -> Option<&StateNode> {
        self.states.iter().find(|s| s.label == label)
    }

    pub fn child_labels(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.label.as_str()).collect()
    }

    /// Returns the state node for `label`, appending an empty one if needed.
    pub fn get_or_create_state(&mut self, label: &str) -> (&mut StateNode, bool) {
        match self.states.iter().position(|s| s.label == label) {
            Some(idx) => (&mut self.states[idx], false),
            None => {
                tracing::info!(state = label, "Adding state to location tree");
                self.states.push(StateNode::new(label));
                let last = self.states.len() - 1;
                (&mut self.states[last], true)
            }
        }
    }

    /// Appends a fully built state node. Used when decoding stored trees.
    pub(crate) fn push_state(&mut self, state: StateNode) {
        self.states.push(state);
    }
}

impl Default for LocationTree {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY)
    }
}

impl StateNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counties: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn counties(&self) -> &[CountyNode] {
        &self.counties
    }

    pub fn county(&self, county: &CountyRef) -> Option<&CountyNode> {
        self.counties.iter().find(|c| &c.county == county)
    }

    pub fn child_refs(&self) -> Vec<&CountyRef> {
        self.counties.iter().map(|c| &c.county).collect()
    }

    /// Returns the node for `county`, resolving and inserting it on a miss.
    ///
    /// This is the only way a county enters the tree, so a new node always
    /// carries a freshly computed leaf list. If resolution fails the tree is
    /// left untouched.
    pub fn get_or_create_county<R: CountyResolver + ?Sized>(
        &mut self,
        county: &CountyRef,
        resolver: &R,
    ) -> Result<(&CountyNode, bool)> {
        if let Some(idx) = self.counties.iter().position(|c| &c.county == county) {
            return Ok((&self.counties[idx], false));
        }

        let nearby = resolver.nearby_high_poverty_counties(county)?;
        tracing::info!(
            state = %self.label,
            %county,
            nearby = nearby.len(),
            "Adding county to location tree"
        );
        self.counties.push(CountyNode::new(county.clone(), nearby));
        let last = self.counties.len() - 1;
        Ok((&self.counties[last], true))
    }

    pub(crate) fn push_county(&mut self, county: CountyNode) {
        self.counties.push(county);
    }
}

impl CountyNode {
    pub fn new(county: CountyRef, nearby: Vec<CountyRef>) -> Self {
        Self { county, nearby }
    }

    pub fn county(&self) -> &CountyRef {
        &self.county
    }

    /// Nearby high-poverty counties, in the order they were resolved.
    pub fn nearby(&self) -> &[CountyRef] {
        &self.nearby
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;

    use crate::error::Result;
    use crate::proximity::CountyResolver;
    use crate::types::CountyRef;

    /// Resolver double that returns a fixed answer and counts calls.
    pub struct CountingResolver {
        pub answer: Vec<CountyRef>,
        pub calls: Cell<usize>,
    }

    impl CountingResolver {
        pub fn new(answer: Vec<CountyRef>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl CountyResolver for CountingResolver {
        fn nearby_high_poverty_counties(&self, _origin: &CountyRef) -> Result<Vec<CountyRef>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.answer.clone())
        }
    }
}
