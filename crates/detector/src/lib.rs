pub mod aggregate;
pub mod annotate;
pub mod backend;
pub mod classes;
pub mod config;
pub mod errors;
pub mod processing;
pub mod provision;
pub mod service;

// Re-export commonly used types for convenience
pub use aggregate::{DetectionCounts, DetectionSummary, Finding};
pub use backend::{InferenceBackend, InferenceOutput};
pub use classes::DefectClass;
pub use config::{DEFAULT_CONFIDENCE, DetectorConfig};
pub use errors::DetectError;
pub use processing::post::Detection;
pub use service::{Analysis, Detector};
