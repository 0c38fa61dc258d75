//! eco-classify - classify one image and print the recommendation as JSON

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use eco_connect::classify::preprocess::InputLayout;
use eco_connect::recommend::NOT_ANSWERED;
use eco_connect::ui::{Ui, UiMode};
use eco_connect::config::{AppConfig, ModelOverrides};
use eco_connect::{recommend, Classifier};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image of the waste item.
    image: PathBuf,
    /// ONNX ImageNet classifier. Without one (here or in ECO_CONFIG), the
    /// file name is matched against keywords.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Label file for the model, one class per line.
    #[arg(long)]
    labels: Option<PathBuf>,
    /// Model input layout.
    #[arg(long)]
    layout: Option<InputLayout>,
    /// Square input size in pixels.
    #[arg(long)]
    input_size: Option<u32>,
    /// Ranked predictions considered per image.
    #[arg(long)]
    top_k: Option<usize>,
    /// Item condition (e.g. Good, Usable, Broken).
    #[arg(long, default_value = NOT_ANSWERED)]
    condition: String,
    /// What to do with the item (Sell, Donate, Dispose).
    #[arg(long, default_value = NOT_ANSWERED)]
    intent: String,
    /// Progress output style.
    #[arg(long, value_enum, default_value_t = UiMode::Auto)]
    ui: UiMode,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let ui = Ui::for_stderr(args.ui);

    let settings = AppConfig::load()?.model.with_overrides(ModelOverrides {
        path: args.model.clone(),
        labels_path: args.labels.clone(),
        input_size: args.input_size,
        layout: args.layout,
        top_k: args.top_k,
    })?;
    let classifier = {
        let _stage = ui.stage("Loading classifier");
        Classifier::from_settings(&settings)
    };
    let classification = {
        let _stage = ui.stage(&format!("Classifying with {}", classifier.backend_name()));
        classifier.classify(&args.image)
    };
    let recommendation = recommend(&classification.label, &args.condition, &args.intent);

    let output = serde_json::json!({
        "classification": classification,
        "recommendation": recommendation,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
