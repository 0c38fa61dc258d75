//! Mock directory of nearby handling centers.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Kind of destination a center offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CenterType {
    Recycler,
    #[serde(rename = "Scrap Dealer")]
    ScrapDealer,
    #[serde(rename = "NGO")]
    Ngo,
    Composting,
}

impl CenterType {
    pub fn as_str(self) -> &'static str {
        match self {
            CenterType::Recycler => "Recycler",
            CenterType::ScrapDealer => "Scrap Dealer",
            CenterType::Ngo => "NGO",
            CenterType::Composting => "Composting",
        }
    }
}

impl std::fmt::Display for CenterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disposal, recycling or donation destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Center {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: CenterType,
    pub distance: &'static str,
    pub contact: &'static str,
}

/// Every known center, in display order.
pub const CENTERS: &[Center] = &[
    Center {
        name: "GreenCycle Solutions",
        kind: CenterType::Recycler,
        distance: "2.5 km",
        contact: "9876543210",
    },
    Center {
        name: "EcoWaste Scrap Metal",
        kind: CenterType::ScrapDealer,
        distance: "4.1 km",
        contact: "9123456789",
    },
    Center {
        name: "Hope Foundation (Cloth/Books)",
        kind: CenterType::Ngo,
        distance: "1.2 km",
        contact: "8888888888",
    },
    Center {
        name: "City Organic Processing",
        kind: CenterType::Composting,
        distance: "3.5 km",
        contact: "9988776655",
    },
];

/// Number of centers listed when the query names no category.
const DEFAULT_CENTER_COUNT: usize = 3;

/// Center types that handle a category.
pub fn center_types_for(category: Category) -> &'static [CenterType] {
    match category {
        Category::EWaste
        | Category::Metals
        | Category::Plastic
        | Category::Glass
        | Category::Paper
        | Category::Wood => &[CenterType::Recycler, CenterType::ScrapDealer],
        Category::Garbage => &[CenterType::Composting],
        Category::Cloth => &[CenterType::Ngo],
    }
}

/// Centers able to take items of `category`, in table order.
pub fn nearby_centers(category: Category) -> Vec<Center> {
    let wanted = center_types_for(category);
    CENTERS
        .iter()
        .filter(|center| wanted.contains(&center.kind))
        .cloned()
        .collect()
}

/// Centers for a free-text category query.
///
/// Queries that do not name a category get the first three centers.
pub fn centers_for_query(query: &str) -> Vec<Center> {
    match query.parse::<Category>() {
        Ok(category) => nearby_centers(category),
        Err(_) => CENTERS.iter().take(DEFAULT_CENTER_COUNT).cloned().collect(),
    }
}
