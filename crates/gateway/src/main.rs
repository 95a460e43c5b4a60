use anyhow::Context;
use detector::backend::InferenceBackend;
use detector::backend::ort::OrtBackend;
use detector::{Detector, DetectorConfig, provision};
use gateway::{
    config::get_configuration, logging::setup_logging, routes::run_server, state::AppState,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration().context("failed to load configuration")?;
    setup_logging(&config);

    let detector_config = DetectorConfig::from_env()?;
    tracing::info!(
        config = ?detector_config,
        "Loaded detector configuration"
    );

    let weights = provision::ensure_weights(
        Path::new(&detector_config.model_path),
        &detector_config.model_url,
        detector_config.model_sha256.as_deref(),
    )?;

    tracing::info!("Loading detection model");
    let backend = OrtBackend::load_model(
        weights
            .to_str()
            .context("model path is not valid UTF-8")?,
    )?;
    tracing::info!("Model loaded successfully");

    let state = AppState::new(Detector::new(backend, detector_config));

    run_server(&config.addr, state).await
}
