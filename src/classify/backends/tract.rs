#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::classify::backend::ClassifierBackend;
use crate::classify::labels::ClassLabels;
use crate::classify::preprocess::{load_rgb, normalize_mobilenet, InputLayout};
use crate::classify::resolve::{resolve_predictions, DEFAULT_TOP_K};
use crate::classify::result::{ClassificationResult, Prediction};

/// Tract-based backend for a pretrained ImageNet classifier in ONNX format
/// (MobileNetV2 by default).
///
/// The model is loaded and optimized once; inference only reads it.
pub struct TractBackend {
    model: TypedRunnableModel<TypedModel>,
    labels: ClassLabels,
    input_size: u32,
    layout: InputLayout,
    top_k: usize,
}

impl TractBackend {
    /// Load an ONNX model and its label table from disk.
    pub fn new<P: AsRef<Path>, L: AsRef<Path>>(
        model_path: P,
        labels_path: L,
        input_size: u32,
        layout: InputLayout,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let labels = ClassLabels::load(labels_path.as_ref())?;
        let shape = layout.shape(input_size);
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(shape[0], shape[1], shape[2], shape[3]),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            labels,
            input_size,
            layout,
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Override how many ranked predictions are considered.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn build_input(&self, image_path: &Path) -> Result<Tensor> {
        let rgb = load_rgb(image_path, self.input_size)?;
        let values = normalize_mobilenet(&rgb, self.layout);
        let shape = self.layout.shape(self.input_size);
        let input = tract_ndarray::Array4::from_shape_vec(
            (shape[0], shape[1], shape[2], shape[3]),
            values,
        )
        .context("preprocessed image does not match model input shape")?;
        Ok(input.into_tensor())
    }

    fn output_scores(outputs: TVec<TValue>) -> Result<Vec<f32>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let scores = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        Ok(scores.iter().copied().collect())
    }
}

impl ClassifierBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn uses_model(&self) -> bool {
        true
    }

    fn classify(&self, image_path: &Path) -> Result<ClassificationResult> {
        let input = self.build_input(image_path)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let scores = Self::output_scores(outputs)?;
        let predictions = self.labels.rank(&scores, self.top_k)?;
        if let Some(best) = predictions.first() {
            log::debug!("top prediction {} ({:.4})", best.name, best.score);
        }
        Ok(resolve_predictions(&predictions))
    }

    fn warm_up(&self) -> Result<()> {
        let shape = self.layout.shape(self.input_size);
        let blank = Tensor::zero::<f32>(&shape)?;
        let outputs = self
            .model
            .run(tvec!(blank.into()))
            .context("ONNX warm-up inference failed")?;
        let scores = Self::output_scores(outputs)?;
        self.labels.check_outputs(scores.len())
    }
}
