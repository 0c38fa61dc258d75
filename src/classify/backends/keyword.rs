use std::path::Path;

use anyhow::Result;

use crate::category::simulated_components;
use crate::classify::backend::ClassifierBackend;
use crate::classify::result::{ClassificationResult, Sentinel};

/// Confidence reported for a file-name keyword hit.
const KEYWORD_SCORE: f32 = 0.95;

/// Substrings checked against the lowercased file name, in order, and the
/// object they stand for.
const FILENAME_KEYWORDS: &[(&[&str], &str)] = &[
    (&["tin_can", "steel"], "tin_can"),
    (&["wood_scrap", "lumber"], "lumber"),
    (&["laptop"], "laptop"),
];

/// Backend used when no classification model is available.
///
/// Never looks at pixels; only the upload's file name.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordBackend;

impl KeywordBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ClassifierBackend for KeywordBackend {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn uses_model(&self) -> bool {
        false
    }

    fn classify(&self, image_path: &Path) -> Result<ClassificationResult> {
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let hit = FILENAME_KEYWORDS.iter().find(|(needles, _)| {
            needles.iter().any(|needle| file_name.contains(needle))
        });

        Ok(match hit {
            Some((_, object)) => {
                ClassificationResult::new(*object, KEYWORD_SCORE, simulated_components(object))
            }
            None => ClassificationResult::sentinel(Sentinel::ModelUnavailable),
        })
    }
}
