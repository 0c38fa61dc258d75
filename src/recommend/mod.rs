//! Rule-based disposal recommendations.
//!
//! A detected object name is resolved to its [`Category`], which picks the
//! ideal action. The user's stated intent and the item's condition may then
//! override that action. Everything here is a pure function of its inputs.

pub mod centers;

use serde::Serialize;

use crate::category::{self, Category};

pub use centers::{centers_for_query, nearby_centers, Center, CenterType, CENTERS};

/// Value used when the user skipped a question.
pub const NOT_ANSWERED: &str = "N/A";

/// Ideal outcome for a category, regardless of user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BestAction {
    SellAndRecycle,
    Compost,
    MaterialRecycling,
    Recycle,
}

impl BestAction {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::EWaste | Category::Metals => BestAction::SellAndRecycle,
            Category::Garbage => BestAction::Compost,
            Category::Plastic | Category::Glass | Category::Paper | Category::Wood => {
                BestAction::MaterialRecycling
            }
            Category::Cloth => BestAction::Recycle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BestAction::SellAndRecycle => "Sell & Recycle",
            BestAction::Compost => "Compost",
            BestAction::MaterialRecycling => "Material Recycling",
            BestAction::Recycle => "Recycle",
        }
    }

    fn detail(self) -> Option<&'static str> {
        match self {
            BestAction::SellAndRecycle => Some(
                "This object contains valuable metals. The ideal process is recovery and certified disposal.",
            ),
            BestAction::Compost => Some(
                "This is organic waste. It must be composted to return nutrients to the soil.",
            ),
            BestAction::MaterialRecycling => {
                Some("This is high-volume recyclable material ready for processing.")
            }
            BestAction::Recycle => None,
        }
    }
}

/// What the user said they want to do with the item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Sell,
    Donate,
    Dispose,
    Other,
}

impl Intent {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("sell") {
            Intent::Sell
        } else if value.eq_ignore_ascii_case("donate") {
            Intent::Donate
        } else if value.eq_ignore_ascii_case("dispose") {
            Intent::Dispose
        } else {
            Intent::Other
        }
    }
}

fn is_reusable_condition(condition: &str) -> bool {
    let condition = condition.trim();
    condition.eq_ignore_ascii_case("good") || condition.eq_ignore_ascii_case("usable")
}

/// Structured recommendation for one classified item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub category: Category,
    pub best_action: String,
    pub best_description: String,
    pub user_recommendation: String,
    pub user_response_summary: String,
    pub centers: Vec<Center>,
}

/// Derive a recommendation from a detected label and the user's answers.
pub fn recommend(label: &str, condition: &str, intent: &str) -> Recommendation {
    let category = category::resolve(label);
    let best = BestAction::for_category(category);

    let mut best_description = format!(
        "The AI identified the specific object: {}. It is classified as {}.",
        display_name(label),
        category
    );
    if let Some(detail) = best.detail() {
        best_description.push(' ');
        best_description.push_str(detail);
    }

    let mut user_response_summary =
        format!("User indicated intention: {intent}. Condition: {condition}.");
    let (user_recommendation, note) = match (Intent::parse(intent), category) {
        (Intent::Sell, Category::EWaste | Category::Metals) => (
            "Sell to Scrap Dealer".to_string(),
            Some("We recommend selling to a scrap dealer for best monetary return."),
        ),
        (Intent::Donate, Category::Cloth) if is_reusable_condition(condition) => (
            "Donate to NGO".to_string(),
            Some("This is the most socially responsible action."),
        ),
        (Intent::Dispose, _) => (
            format!("Recycle ({category})"),
            Some("Since disposal is intended, specialized recycling is the safest path."),
        ),
        _ => (best.as_str().to_string(), None),
    };
    if let Some(note) = note {
        user_response_summary.push(' ');
        user_response_summary.push_str(note);
    }

    Recommendation {
        category,
        best_action: best.as_str().to_string(),
        best_description,
        user_recommendation,
        user_response_summary,
        centers: nearby_centers(category),
    }
}

/// Recommendation with both questions unanswered.
pub fn recommend_default(label: &str) -> Recommendation {
    recommend(label, NOT_ANSWERED, NOT_ANSWERED)
}

/// `tin_can` -> `Tin Can`.
pub fn display_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_alpha = false;
    for ch in label.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
