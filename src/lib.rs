//! Eco Connect
//!
//! Classifies a photographed waste item into a material category and tells
//! the user what to do with it.
//!
//! # Pipeline
//!
//! 1. **Classify**: the uploaded image goes through a [`Classifier`]. With an
//!    ONNX ImageNet model (feature `backend-tract`) the top predictions are
//!    mapped onto the category table; without one, the file name is matched
//!    against a few keywords. Failures never escape: they come back as
//!    sentinel results with zero confidence.
//! 2. **Recommend**: [`recommend()`] resolves the label to a [`Category`],
//!    picks the ideal action, applies the user's intent and condition, and
//!    lists matching mock centers.
//!
//! # Module Structure
//!
//! - `category`: material categories and the object-name table
//! - `classify`: classifier backends, preprocessing, prediction resolution
//! - `recommend`: recommendation rules and the center directory
//! - `api`: HTTP front end; `session`: in-memory session store
//! - `config`: file + environment configuration

pub mod api;
pub mod category;
pub mod classify;
pub mod config;
pub mod recommend;
pub mod session;
pub mod ui;

pub use category::{Category, CATEGORY_MAPPING};
pub use classify::{ClassificationResult, Classifier, ClassifierBackend, Sentinel};
pub use config::{AppConfig, ModelSettings};
pub use recommend::{recommend, recommend_default, Center, CenterType, Recommendation};
