use std::path::Path;

use anyhow::Result;

use crate::classify::result::ClassificationResult;

/// Classifier backend trait.
///
/// Backends are selected once at process start and shared read-only
/// across requests, so `classify` takes `&self`.
///
/// Backends report failures as errors. Converting them into sentinel
/// results is the job of [`crate::classify::Classifier`].
pub trait ClassifierBackend: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the backend runs a real model over pixels.
    fn uses_model(&self) -> bool;

    /// Classify the image stored at `image_path`.
    fn classify(&self, image_path: &Path) -> Result<ClassificationResult>;

    /// Optional warm-up hook.
    fn warm_up(&self) -> Result<()> {
        Ok(())
    }
}
