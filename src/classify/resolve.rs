//! Mapping of ranked model predictions onto a waste label.

use crate::category::{
    lookup, simulated_components, WOOD_FALLBACK_KEYWORDS, WOOD_FALLBACK_LABEL,
};
use crate::classify::result::{ClassificationResult, Prediction, Sentinel};

/// Number of ranked predictions considered per image.
pub const DEFAULT_TOP_K: usize = 10;

/// Resolve ranked predictions into a classification result.
///
/// The first prediction whose name is in the category mapping wins. When
/// none is, the first prediction whose name contains a wood keyword is
/// reported as `lumber` with its own score. Otherwise the result is the
/// unresolved sentinel.
pub fn resolve_predictions(predictions: &[Prediction]) -> ClassificationResult {
    if let Some(hit) = predictions
        .iter()
        .find(|prediction| lookup(&prediction.name).is_some())
    {
        return ClassificationResult::new(
            hit.name.clone(),
            hit.score,
            simulated_components(&hit.name),
        );
    }

    if let Some(hit) = predictions.iter().find(|prediction| {
        WOOD_FALLBACK_KEYWORDS
            .iter()
            .any(|keyword| prediction.name.contains(keyword))
    }) {
        log::debug!("wood fallback matched raw prediction {}", hit.name);
        return ClassificationResult::new(
            WOOD_FALLBACK_LABEL,
            hit.score,
            simulated_components(WOOD_FALLBACK_LABEL),
        );
    }

    ClassificationResult::sentinel(Sentinel::Unresolved)
}

/// Pick the `k` highest scores, highest first. Ties keep class-index order.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Turn raw outputs into probabilities.
///
/// Outputs that already form a distribution are passed through; logits get a
/// softmax.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() < 1e-2 {
        return scores.to_vec();
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
