use std::path::Path;
use std::sync::Arc;

use crate::classify::backend::ClassifierBackend;
use crate::classify::backends::KeywordBackend;
use crate::classify::result::{ClassificationResult, Sentinel};
use crate::config::ModelSettings;

/// Classifier facade shared by every request.
///
/// Wraps exactly one backend, chosen when the process starts. `classify`
/// always answers: backend errors become the system-error sentinel.
#[derive(Clone)]
pub struct Classifier {
    backend: Arc<dyn ClassifierBackend>,
}

impl Classifier {
    pub fn new<B: ClassifierBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Pick a backend from model settings.
    ///
    /// Uses the ONNX model when one is configured and loads; otherwise falls
    /// back to file-name keyword matching.
    pub fn from_settings(settings: &ModelSettings) -> Self {
        match select_model_backend(settings) {
            Some(classifier) => classifier,
            None => Self::new(KeywordBackend::new()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn uses_model(&self) -> bool {
        self.backend.uses_model()
    }

    /// Classify an uploaded image. Never fails.
    pub fn classify(&self, image_path: &Path) -> ClassificationResult {
        match self.backend.classify(image_path) {
            Ok(result) => {
                log::info!(
                    "classified {} as {} ({}%) via {}",
                    image_path.display(),
                    result.label,
                    result.confidence,
                    self.backend.name()
                );
                result
            }
            Err(err) => {
                log::error!(
                    "classification of {} failed: {:#}",
                    image_path.display(),
                    err
                );
                ClassificationResult::sentinel(Sentinel::SystemError)
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(KeywordBackend::new())
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(feature = "backend-tract")]
fn select_model_backend(settings: &ModelSettings) -> Option<Classifier> {
    use crate::classify::backends::TractBackend;

    let model_path = settings.path.as_ref()?;
    let Some(labels_path) = settings.labels_path.as_ref() else {
        log::warn!("model configured without a label file; using keyword fallback");
        return None;
    };
    let loaded = TractBackend::new(
        model_path,
        labels_path,
        settings.input_size,
        settings.layout,
    );
    let backend = match loaded {
        Ok(backend) => backend.with_top_k(settings.top_k),
        Err(err) => {
            log::warn!(
                "classification model {} unavailable, using keyword fallback: {:#}",
                model_path.display(),
                err
            );
            return None;
        }
    };
    if let Err(err) = backend.warm_up() {
        log::warn!("model warm-up failed, using keyword fallback: {:#}", err);
        return None;
    }
    log::info!("loaded classification model {}", model_path.display());
    Some(Classifier::new(backend))
}

#[cfg(not(feature = "backend-tract"))]
fn select_model_backend(settings: &ModelSettings) -> Option<Classifier> {
    if let Some(path) = &settings.path {
        log::warn!(
            "model {} configured but built without backend-tract; using keyword fallback",
            path.display()
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::backends::StubBackend;
    use crate::classify::result::Prediction;
    use anyhow::{anyhow, Result};

    struct FailingBackend;

    impl ClassifierBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn uses_model(&self) -> bool {
            true
        }

        fn classify(&self, _image_path: &Path) -> Result<ClassificationResult> {
            Err(anyhow!("inference exploded"))
        }
    }

    #[test]
    fn backend_errors_become_system_error_sentinel() {
        let classifier = Classifier::new(FailingBackend);
        let result = classifier.classify(Path::new("whatever.png"));
        assert_eq!(result.label, "System Error");
        assert_eq!(result.confidence, "0.00");
        assert_eq!(result.components, vec!["Analysis Failed"]);
    }

    #[test]
    fn undecodable_upload_is_absorbed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("laptop.jpg");
        std::fs::write(&path, b"not an image")?;

        let backend = StubBackend::new().with_predictions(vec![Prediction::new("laptop", 0.9)]);
        let classifier = Classifier::new(backend);
        let result = classifier.classify(&path);
        assert_eq!(result, ClassificationResult::sentinel(Sentinel::SystemError));
        Ok(())
    }

    #[test]
    fn missing_model_selects_keyword_backend() {
        let classifier = Classifier::from_settings(&ModelSettings::default());
        assert_eq!(classifier.backend_name(), "keyword");
        assert!(!classifier.uses_model());

        let result = classifier.classify(Path::new("blank.png"));
        assert_eq!(result.label, "Unknown Object");
        assert_eq!(result.confidence, "0.00");
    }

    #[test]
    fn unloadable_model_falls_back_to_keywords() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = ModelSettings {
            path: Some(dir.path().join("missing.onnx")),
            labels_path: Some(dir.path().join("missing.txt")),
            ..ModelSettings::default()
        };
        let classifier = Classifier::from_settings(&settings);
        assert_eq!(classifier.backend_name(), "keyword");
        Ok(())
    }
}
