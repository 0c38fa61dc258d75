//! Image loading and MobileNetV2 input preparation.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use serde::Deserialize;

/// Default square input resolution for MobileNetV2.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Memory layout of the model's image input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// `[1, H, W, 3]`, the Keras export layout.
    #[default]
    Nhwc,
    /// `[1, 3, H, W]`.
    Nchw,
}

impl InputLayout {
    pub fn shape(self, size: u32) -> [usize; 4] {
        let size = size as usize;
        match self {
            InputLayout::Nhwc => [1, size, size, 3],
            InputLayout::Nchw => [1, 3, size, size],
        }
    }
}

impl std::str::FromStr for InputLayout {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nhwc" => Ok(InputLayout::Nhwc),
            "nchw" => Ok(InputLayout::Nchw),
            other => Err(anyhow!("unknown input layout '{}'", other)),
        }
    }
}

/// Decode an image file and resize it to a `size`×`size` RGB square.
pub fn load_rgb(path: &Path, size: u32) -> Result<RgbImage> {
    if size == 0 {
        return Err(anyhow!("input size must be greater than zero"));
    }
    let decoded = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    let rgb = decoded.to_rgb8();
    Ok(image::imageops::resize(&rgb, size, size, FilterType::Triangle))
}

/// Scale pixels into `[-1, 1]` the way MobileNetV2 expects and lay them out
/// for the model input.
pub fn normalize_mobilenet(rgb: &RgbImage, layout: InputLayout) -> Vec<f32> {
    let (width, height) = rgb.dimensions();
    let (w, h) = (width as usize, height as usize);
    let raw = rgb.as_raw();
    let scale = |value: u8| value as f32 / 127.5 - 1.0;

    match layout {
        InputLayout::Nhwc => raw.iter().copied().map(scale).collect(),
        InputLayout::Nchw => {
            let plane = w * h;
            let mut out = vec![0.0f32; plane * 3];
            for (idx, pixel) in raw.chunks_exact(3).enumerate() {
                for (channel, value) in pixel.iter().enumerate() {
                    out[channel * plane + idx] = scale(*value);
                }
            }
            out
        }
    }
}
