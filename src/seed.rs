//! Built-in starting tree, used when no location data file can be read.

use crate::location_tree::{CountyNode, DEFAULT_COUNTRY, LocationTree, StateNode};
use crate::types::CountyRef;

type SeedCounty = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const SEED: &[(&str, &[SeedCounty])] = &[
    (
        "ILLINOIS",
        &[
            ("MADISON", "IL", &[("WASHINGTON", "MO"), ("JACKSON", "IL"), ("IRON", "MO")]),
            ("COOK", "IL", &[("LAKE", "MI"), ("MECOSTA", "MI"), ("COLES", "IL"), ("CHAMPAIGN", "IL")]),
            (
                "WAYNE",
                "IL",
                &[
                    ("JACKSON", "IL"),
                    ("ALEXANDER", "IL"),
                    ("SALINE", "IL"),
                    ("PULASKI", "IL"),
                    ("WEBSTER", "KY"),
                    ("COLES", "IL"),
                    ("UNION", "KY"),
                    ("GALLATIN", "IL"),
                ],
            ),
            ("ROCK ISLAND", "IL", &[("MCDONOUGH", "IL")]),
            (
                "RANDOLPH",
                "IL",
                &[
                    ("JACKSON", "IL"),
                    ("ALEXANDER", "IL"),
                    ("IRON", "MO"),
                    ("SALINE", "IL"),
                    ("PULASKI", "IL"),
                    ("WASHINGTON", "MO"),
                    ("NEW MADRID", "MO"),
                    ("WAYNE", "MO"),
                    ("MISSISSIPPI", "MO"),
                ],
            ),
        ],
    ),
    (
        "INDIANA",
        &[
            ("WELLS", "IN", &[("DELAWARE", "IN")]),
            (
                "PIKE",
                "IN",
                &[
                    ("MONROE", "IN"),
                    ("GALLATIN", "IL"),
                    ("GRAYSON", "KY"),
                    ("WEBSTER", "KY"),
                    ("COLES", "IL"),
                    ("UNION", "KY"),
                ],
            ),
            ("JASPER", "IN", &[("CHAMPAIGN", "IL")]),
            ("GREENE", "IN", &[("MONROE", "IN"), ("COLES", "IL"), ("CHAMPAIGN", "IL")]),
            ("LAKE", "IN", &[("CHAMPAIGN", "IL")]),
        ],
    ),
    (
        "MICHIGAN",
        &[
            ("SCHOOLCRAFT", "MI", &[("LAKE", "MI"), ("CLARE", "MI"), ("HOUGHTON", "MI")]),
            ("ONTONAGON", "MI", &[("HOUGHTON", "MI")]),
            ("BAY", "MI", &[("MECOSTA", "MI"), ("CLARE", "MI"), ("ISABELLA", "MI")]),
            ("OAKLAND", "MI", &[("WAYNE", "MI")]),
            ("OCEANA", "MI", &[("LAKE", "MI"), ("MECOSTA", "MI")]),
        ],
    ),
    (
        "MINNESOTA",
        &[
            ("ITASCA", "MN", &[("MAHNOMEN", "MN")]),
            (
                "HENNEPIN",
                "MN",
                &[("THURSTON", "NE"), ("ROBERTS", "SD"), ("STORY", "IA"), ("MAHNOMEN", "MN")],
            ),
            ("REDWOOD", "MN", &[("THURSTON", "NE"), ("ROBERTS", "SD"), ("CLAY", "SD")]),
            ("ROSEAU", "MN", &[("MAHNOMEN", "MN")]),
            ("RAMSEY", "MN", &[("STORY", "IA"), ("MAHNOMEN", "MN")]),
        ],
    ),
    (
        "WISCONSIN",
        &[
            ("DANE", "WI", &[("MENOMINEE", "WI")]),
            ("DUNN", "WI", &[("HOUGHTON", "MI"), ("STORY", "IA"), ("MENOMINEE", "WI")]),
            ("MILWAUKEE", "WI", &[("LAKE", "MI"), ("MENOMINEE", "WI")]),
            ("FOREST", "WI", &[("MENOMINEE", "WI")]),
            ("DOUGLAS", "WI", &[("HOUGHTON", "MI"), ("MENOMINEE", "WI")]),
        ],
    ),
];

pub fn seed_tree() -> LocationTree {
    let mut tree = LocationTree::new(DEFAULT_COUNTRY);
    for (label, counties) in SEED {
        let mut state = StateNode::new(*label);
        for (county, abbrev, nearby) in counties.iter() {
            let nearby = nearby.iter().map(|(c, s)| CountyRef::new(c, s)).collect();
            state.push_county(CountyNode::new(CountyRef::new(county, abbrev), nearby));
        }
        tree.push_state(state);
    }
    tree
}
