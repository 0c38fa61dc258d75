use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classify::preprocess::{InputLayout, DEFAULT_INPUT_SIZE};
use crate::classify::DEFAULT_TOP_K;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize, Default)]
struct AppConfigFile {
    addr: Option<String>,
    upload_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
    model: Option<ModelConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelConfigFile {
    path: Option<PathBuf>,
    labels_path: Option<PathBuf>,
    input_size: Option<u32>,
    layout: Option<InputLayout>,
    top_k: Option<usize>,
}

/// Settings for the web application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub model: ModelSettings,
}

/// Where to find the classification model and how to feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// ONNX model file. `None` selects the file-name keyword fallback.
    pub path: Option<PathBuf>,
    /// ImageNet label file, one class per line.
    pub labels_path: Option<PathBuf>,
    pub input_size: u32,
    pub layout: InputLayout,
    pub top_k: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: None,
            labels_path: None,
            input_size: DEFAULT_INPUT_SIZE,
            layout: InputLayout::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Command-line values that replace loaded model settings when present.
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    pub path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub input_size: Option<u32>,
    pub layout: Option<InputLayout>,
    pub top_k: Option<usize>,
}

impl ModelSettings {
    /// Apply overrides, then check the merged settings.
    pub fn with_overrides(mut self, overrides: ModelOverrides) -> Result<Self> {
        if let Some(path) = overrides.path {
            self.path = Some(path);
        }
        if let Some(path) = overrides.labels_path {
            self.labels_path = Some(path);
        }
        if let Some(size) = overrides.input_size {
            self.input_size = size;
        }
        if let Some(layout) = overrides.layout {
            self.layout = layout;
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(anyhow!("model input_size must be greater than zero"));
        }
        if self.top_k == 0 {
            return Err(anyhow!("model top_k must be greater than zero"));
        }
        if self.path.is_some() && self.labels_path.is_none() {
            return Err(anyhow!("model labels_path is required when a model path is set"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            model: ModelSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from the JSON file named by `ECO_CONFIG` (if any), then apply
    /// `ECO_*` environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ECO_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AppConfigFile) -> Self {
        let defaults = ModelSettings::default();
        let model = file.model.unwrap_or_default();
        Self {
            addr: file.addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            upload_dir: file
                .upload_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: file.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            model: ModelSettings {
                path: model.path,
                labels_path: model.labels_path,
                input_size: model.input_size.unwrap_or(defaults.input_size),
                layout: model.layout.unwrap_or(defaults.layout),
                top_k: model.top_k.unwrap_or(defaults.top_k),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(addr) = non_empty_env("ECO_ADDR") {
            self.addr = addr;
        }
        if let Some(dir) = non_empty_env("ECO_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(limit) = non_empty_env("ECO_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = limit
                .parse()
                .map_err(|_| anyhow!("ECO_MAX_UPLOAD_BYTES must be an integer number of bytes"))?;
        }
        if let Some(path) = non_empty_env("ECO_MODEL_PATH") {
            self.model.path = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty_env("ECO_LABELS_PATH") {
            self.model.labels_path = Some(PathBuf::from(path));
        }
        if let Some(layout) = non_empty_env("ECO_MODEL_LAYOUT") {
            self.model.layout = layout.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than zero"));
        }
        self.model.validate()
    }
}

fn read_config_file(path: &Path) -> Result<AppConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
