use std::path::Path;

use anyhow::Result;

use crate::classify::backend::ClassifierBackend;
use crate::classify::preprocess::load_rgb;
use crate::classify::resolve::resolve_predictions;
use crate::classify::result::{ClassificationResult, Prediction};

/// Stub backend for testing.
///
/// Decodes the image like a model backend would, then resolves a fixed list
/// of ranked predictions instead of running inference.
#[derive(Clone, Debug, Default)]
pub struct StubBackend {
    predictions: Vec<Prediction>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predictions returned for every decodable image, highest rank first.
    pub fn with_predictions(mut self, predictions: Vec<Prediction>) -> Self {
        self.predictions = predictions;
        self
    }
}

impl ClassifierBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn uses_model(&self) -> bool {
        true
    }

    fn classify(&self, image_path: &Path) -> Result<ClassificationResult> {
        load_rgb(image_path, 8)?;
        Ok(resolve_predictions(&self.predictions))
    }
}
