//! Waste item classification.
//!
//! A [`Classifier`] wraps one [`ClassifierBackend`]: the ONNX model backend
//! when a model is configured and loads, otherwise file-name keyword
//! matching. Model outputs are mapped onto the category table by
//! [`resolve_predictions`].

mod backend;
pub mod backends;
mod classifier;
pub mod labels;
pub mod preprocess;
mod resolve;
mod result;

pub use backend::ClassifierBackend;
pub use backends::{KeywordBackend, StubBackend};
pub use classifier::Classifier;
pub use resolve::{resolve_predictions, to_probabilities, top_k, DEFAULT_TOP_K};
pub use result::{
    format_confidence, ClassificationResult, Prediction, Sentinel, SYSTEM_ERROR_LABEL,
    UNKNOWN_OBJECT_LABEL, ZERO_CONFIDENCE,
};

#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
