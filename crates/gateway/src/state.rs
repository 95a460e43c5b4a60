use detector::Detector;
use detector::backend::ort::OrtBackend;
use std::sync::{Arc, Mutex};

/// Shared application state. The detector holds the process-wide model
/// session, loaded once at startup; the mutex is held only for the duration
/// of a single invocation.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Mutex<Detector<OrtBackend>>>,
}

impl AppState {
    pub fn new(detector: Detector<OrtBackend>) -> Self {
        Self {
            detector: Arc::new(Mutex::new(detector)),
        }
    }
}
