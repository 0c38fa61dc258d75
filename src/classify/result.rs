use serde::{Deserialize, Serialize};

pub const UNKNOWN_OBJECT_LABEL: &str = "Unknown Object";
pub const SYSTEM_ERROR_LABEL: &str = "System Error";
pub const ZERO_CONFIDENCE: &str = "0.00";

/// Outcome of classifying one uploaded image.
///
/// Sentinel results have the same shape as real ones; they carry zero
/// confidence and an explanatory components entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Detected object name (ImageNet style, e.g. `tin_can`) or a sentinel label.
    pub label: String,
    /// Percentage with two decimals, e.g. `"87.12"`.
    pub confidence: String,
    /// Simulated material breakdown.
    pub components: Vec<String>,
}

/// Why a sentinel result was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentinel {
    /// The model ran but none of its top predictions mapped to a category.
    Unresolved,
    /// No model is loaded and the file name matched no known keyword.
    ModelUnavailable,
    /// Decoding or inference failed.
    SystemError,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, score: f32, components: Vec<String>) -> Self {
        Self {
            label: label.into(),
            confidence: format_confidence(score),
            components,
        }
    }

    pub fn sentinel(kind: Sentinel) -> Self {
        let (label, component) = match kind {
            Sentinel::Unresolved => (
                UNKNOWN_OBJECT_LABEL,
                "Please upload a clear image of a single waste item.",
            ),
            Sentinel::ModelUnavailable => (UNKNOWN_OBJECT_LABEL, "Image Quality Check Required"),
            Sentinel::SystemError => (SYSTEM_ERROR_LABEL, "Analysis Failed"),
        };
        Self {
            label: label.to_string(),
            confidence: ZERO_CONFIDENCE.to_string(),
            components: vec![component.to_string()],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.label == UNKNOWN_OBJECT_LABEL || self.label == SYSTEM_ERROR_LABEL
    }
}

/// Format a 0..1 score as a two-decimal percentage.
pub fn format_confidence(score: f32) -> String {
    format!("{:.2}", score * 100.0)
}

/// One ranked model output, already mapped to its class name.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub name: String,
    /// Probability in 0..1.
    pub score: f32,
}

impl Prediction {
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
