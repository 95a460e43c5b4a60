use ndarray::{Array, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

pub trait InferenceBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference on a preprocessed NCHW batch.
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    // [1, 4 + num_classes, num_candidates]: cxcywh rows then class scores
    pub preds: ndarray::ArrayD<f32>,
}
