pub mod client;
pub mod config;
pub mod error;
pub mod location_tree;
pub mod orchestrator;
pub mod poverty;
pub mod prompt;
pub mod proximity;
pub mod seed;
pub mod session;
pub mod states;
pub mod tree_codec;
pub mod tree_store;
pub mod types;
pub mod zipcode;

pub use client::{EtsyClient, EtsyConfig, ListingsError};
pub use config::Config;
pub use error::{GeoError, Result};
pub use location_tree::{CountyNode, LocationTree, StateNode};
pub use orchestrator::{ListingsSource, PersistOutcome, QueryOrchestrator, Resolution};
pub use poverty::PovertyClassifier;
pub use prompt::Prompter;
pub use proximity::{CountyResolver, ProximityResolver};
pub use tree_codec::TreeFormat;
pub use tree_store::{TreeSink, TreeStore};
pub use types::{CountyRef, Listing, ListingsQuery, ZipRecord};
pub use zipcode::ZipIndex;
