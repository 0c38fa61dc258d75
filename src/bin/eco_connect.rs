//! eco-connect - Eco Connect web server
//!
//! This daemon:
//! 1. Loads configuration (ECO_CONFIG file + ECO_* environment)
//! 2. Loads the classification model once, or falls back to keyword matching
//! 3. Serves the upload / classify / recommend pages until Ctrl-C

use anyhow::{anyhow, Result};
use std::sync::mpsc;

use eco_connect::{
    api::{ApiConfig, ApiServer},
    AppConfig, Classifier,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    let classifier = Classifier::from_settings(&config.model);
    log::info!("classifier backend: {}", classifier.backend_name());
    if !classifier.uses_model() {
        log::warn!("no classification model loaded; results come from file-name keywords");
    }

    let api_handle = ApiServer::new(ApiConfig::from(&config), classifier).spawn()?;
    log::info!("eco-connect listening on http://{}", api_handle.addr);
    log::info!("uploads stored in {}", config.upload_dir.display());

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;

    log::info!("eco-connect waiting for shutdown signal (Ctrl-C)...");
    let _ = rx.recv();
    log::info!("shutdown signal received, stopping web server...");
    api_handle.stop()?;

    Ok(())
}
