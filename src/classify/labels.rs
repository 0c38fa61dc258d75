//! ImageNet class label table loaded alongside the model.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::classify::resolve::{to_probabilities, top_k};
use crate::classify::result::Prediction;

/// Class names indexed by model output position.
#[derive(Clone, Debug)]
pub struct ClassLabels {
    names: Vec<String>,
}

impl ClassLabels {
    /// Load a label file with one class per line.
    ///
    /// Lines like `tin can, tin` keep the first synonym; spaces become
    /// underscores so names match the category table (`tin_can`).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label file {}", path.display()))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let names: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(normalize_label)
            .collect();
        if names.is_empty() {
            return Err(anyhow!("label file contains no classes"));
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check that a model producing `num_outputs` scores fits this table:
    /// one score per label, or one more for a leading background class.
    pub fn check_outputs(&self, num_outputs: usize) -> Result<()> {
        let labels = self.names.len();
        if num_outputs == labels || num_outputs == labels + 1 {
            return Ok(());
        }
        Err(anyhow!(
            "model produces {} scores but the label file has {} classes",
            num_outputs,
            labels
        ))
    }

    /// Named predictions for raw model scores, best first, at most `k`.
    ///
    /// Scores are turned into probabilities over every output. The unnamed
    /// background class is dropped before the cut, so it never takes one of
    /// the `k` places.
    pub fn rank(&self, scores: &[f32], k: usize) -> Result<Vec<Prediction>> {
        self.check_outputs(scores.len())?;
        let probabilities = to_probabilities(scores);
        Ok(top_k(&probabilities, probabilities.len())
            .into_iter()
            .filter_map(|(index, score)| {
                self.name_for(index, scores.len())
                    .map(|name| Prediction::new(name, score))
            })
            .take(k)
            .collect())
    }

    /// Name for output `index` of a model that produces `num_outputs` scores.
    ///
    /// Models with one extra output carry a leading background class, which
    /// has no name.
    pub fn name_for(&self, index: usize, num_outputs: usize) -> Option<&str> {
        let offset = num_outputs.saturating_sub(self.names.len());
        match offset {
            0 => self.names.get(index).map(String::as_str),
            1 => index
                .checked_sub(1)
                .and_then(|i| self.names.get(i))
                .map(String::as_str),
            _ => None,
        }
    }
}

fn normalize_label(line: &str) -> String {
    let first = line.split(',').next().unwrap_or(line).trim();
    first
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
