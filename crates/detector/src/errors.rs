use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("failed to fetch model weights: {0}")]
    Fetch(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("confidence threshold {0} is outside [0.0, 1.0]")]
    InvalidParameter(f32),

    #[error("model inference failed: {0}")]
    Inference(#[from] anyhow::Error),

    #[error("class id {0} does not map to a known defect class")]
    UnknownClass(u32),
}
