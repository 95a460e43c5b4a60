use std::env;

pub use common::Environment;

/// Default confidence threshold used by the UI slider.
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub environment: Environment,
    pub model_path: String,
    pub model_url: String,
    pub model_sha256: Option<String>,
    pub input_size: (u32, u32),
    pub iou_threshold: f32,
}

impl DetectorConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let model_path = env::var("DETECTOR_MODEL_PATH")
            .unwrap_or_else(|_| "models/concrete-defects.onnx".to_string());

        let model_url = env::var("DETECTOR_MODEL_URL").unwrap_or_else(|_| {
            "https://storage.googleapis.com/hormigon-models/concrete-defects-v1.onnx".to_string()
        });

        let model_sha256 = env::var("DETECTOR_MODEL_SHA256").ok().filter(|s| !s.is_empty());

        let input_width = env::var("DETECTOR_INPUT_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(640);

        let input_height = env::var("DETECTOR_INPUT_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(640);

        let iou_threshold = env::var("DETECTOR_IOU_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.45);

        Ok(Self {
            environment,
            model_path,
            model_url,
            model_sha256,
            input_size: (input_width, input_height),
            iou_threshold,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: "models/concrete-defects.onnx".to_string(),
            model_url: "https://example.com/concrete-defects.onnx".to_string(),
            model_sha256: None,
            input_size: (640, 640),
            iou_threshold: 0.45,
        }
    }
}
