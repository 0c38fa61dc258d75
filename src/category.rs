//! Material categories and the static object-name mapping.
//!
//! Object names follow the ImageNet class naming used by the classifier
//! backends (`tin_can`, `water_bottle`, ...). Anything not listed here
//! resolves to [`Category::Garbage`].

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Closed set of material categories that drive recommendations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "E-Waste")]
    EWaste,
    Plastic,
    Metals,
    Cloth,
    Paper,
    Glass,
    Wood,
    Garbage,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::EWaste,
        Category::Plastic,
        Category::Metals,
        Category::Cloth,
        Category::Paper,
        Category::Glass,
        Category::Wood,
        Category::Garbage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::EWaste => "E-Waste",
            Category::Plastic => "Plastic",
            Category::Metals => "Metals",
            Category::Cloth => "Cloth",
            Category::Paper => "Paper",
            Category::Glass => "Glass",
            Category::Wood => "Wood",
            Category::Garbage => "Garbage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| anyhow!("unknown category '{}'", value))
    }
}

/// Object name to category table. Read-only for the life of the process.
pub const CATEGORY_MAPPING: &[(&str, Category)] = &[
    // electronics
    ("laptop", Category::EWaste),
    ("monitor", Category::EWaste),
    ("mobile_phone", Category::EWaste),
    ("keyboard", Category::EWaste),
    ("mouse", Category::EWaste),
    ("remote_control", Category::EWaste),
    ("cellular_telephone", Category::EWaste),
    ("printer", Category::EWaste),
    ("modem", Category::EWaste),
    // bottles, containers, wrappers
    ("water_bottle", Category::Plastic),
    ("plastic_bag", Category::Plastic),
    ("plastic_cup", Category::Plastic),
    ("plastic_container", Category::Plastic),
    ("syringe", Category::Plastic),
    ("tray", Category::Plastic),
    ("cup", Category::Plastic),
    // cans, tools, structural items
    ("tin_can", Category::Metals),
    ("soda_can", Category::Metals),
    ("aluminum_can", Category::Metals),
    ("wrench", Category::Metals),
    ("bolt", Category::Metals),
    ("screw", Category::Metals),
    ("chain", Category::Metals),
    ("casserole", Category::Metals),
    ("frying_pan", Category::Metals),
    ("nail", Category::Metals),
    ("metal_scrap", Category::Metals),
    ("beam", Category::Metals),
    ("metal_drum", Category::Metals),
    // fabric, garments
    ("jersey", Category::Cloth),
    ("trench_coat", Category::Cloth),
    ("sweatshirt", Category::Cloth),
    ("sock", Category::Cloth),
    ("jean", Category::Cloth),
    ("apron", Category::Cloth),
    ("scarf", Category::Cloth),
    // office, packaging
    ("envelope", Category::Paper),
    ("newspaper", Category::Paper),
    ("book", Category::Paper),
    ("magazine", Category::Paper),
    ("cardboard", Category::Paper),
    // bottles, jars
    ("wine_bottle", Category::Glass),
    ("beer_bottle", Category::Glass),
    ("glass_jar", Category::Glass),
    ("beaker", Category::Glass),
    // structural, furniture, tools
    ("wooden_spoon", Category::Wood),
    ("barrel", Category::Wood),
    ("crate", Category::Wood),
    ("plank", Category::Wood),
    ("chair", Category::Wood),
    ("desk", Category::Wood),
    ("log", Category::Wood),
    ("wood_scrap", Category::Wood),
    ("lumber", Category::Wood),
    ("board", Category::Wood),
    ("pallet", Category::Wood),
    // organic
    ("carrot", Category::Garbage),
    ("banana", Category::Garbage),
    ("broccoli", Category::Garbage),
    ("vegetable", Category::Garbage),
    ("fruit", Category::Garbage),
    ("orange", Category::Garbage),
    ("apple", Category::Garbage),
    ("potato", Category::Garbage),
];

/// Raw prediction substrings that indicate wood scrap when no mapped name matched.
pub const WOOD_FALLBACK_KEYWORDS: &[&str] =
    &["lumber", "board", "pallet", "plank", "crate", "wooden", "scrap"];

/// Canonical label used when the wood fallback fires.
pub const WOOD_FALLBACK_LABEL: &str = "lumber";

/// Exact lookup in [`CATEGORY_MAPPING`].
pub fn lookup(object: &str) -> Option<Category> {
    CATEGORY_MAPPING
        .iter()
        .find(|(name, _)| *name == object)
        .map(|(_, category)| *category)
}

/// Resolve an object name to its category, defaulting to Garbage.
pub fn resolve(object: &str) -> Category {
    lookup(object).unwrap_or(Category::Garbage)
}

/// Deterministic simulated material breakdown for a detected object.
pub fn simulated_components(object: &str) -> Vec<String> {
    let main = format!("Main: {object}");
    let rest: &[&str] = match resolve(object) {
        Category::EWaste => &["Plastic Shell", "Circuit Board", "Copper Wiring"],
        Category::Plastic => &["PET/HDPE Plastic", "Label Wrapper"],
        Category::Metals => &["Aluminum/Steel Alloy", "High Recyclable Value"],
        Category::Garbage => &["100% Biodegradable", "Organic Content"],
        Category::Cloth | Category::Paper | Category::Glass | Category::Wood => {
            &["Recyclable Material"]
        }
    };
    std::iter::once(main)
        .chain(rest.iter().map(|entry| entry.to_string()))
        .collect()
}
