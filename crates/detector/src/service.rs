use crate::aggregate::{self, DetectionSummary};
use crate::annotate::Annotator;
use crate::backend::InferenceBackend;
use crate::config::DetectorConfig;
use crate::errors::DetectError;
use crate::processing::post::{Detection, PostProcessor, TransformParams};
use crate::processing::pre::PreProcessor;
use image::RgbImage;

/// Everything one user interaction produces: the retained detections, their
/// per-class summary, and the annotated frame for display.
pub struct Analysis {
    pub detections: Vec<Detection>,
    pub summary: DetectionSummary,
    pub annotated: RgbImage,
}

pub struct Detector<B: InferenceBackend> {
    backend: B,
    config: DetectorConfig,
    preprocessor: PreProcessor,
    annotator: Annotator,
}

impl<B: InferenceBackend> Detector<B> {
    pub fn new(backend: B, config: DetectorConfig) -> Self {
        let preprocessor = PreProcessor::new(config.input_size);
        Self {
            backend,
            config,
            preprocessor,
            annotator: Annotator::new(),
        }
    }

    /// Run the full pipeline over one encoded image: decode, preprocess,
    /// one model invocation, postprocess, annotate, aggregate.
    pub fn analyze(
        &mut self,
        image_bytes: &[u8],
        confidence: f32,
    ) -> Result<Analysis, DetectError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DetectError::InvalidParameter(confidence));
        }

        let image = image::load_from_memory(image_bytes)?.to_rgb8();
        let (orig_width, orig_height) = image.dimensions();

        let (input, scale, offset_x, offset_y) = self.preprocessor.preprocess(&image)?;

        let output = self.backend.infer(&input)?;

        let transform = TransformParams {
            orig_width,
            orig_height,
            input_width: self.config.input_size.0,
            input_height: self.config.input_size.1,
            scale,
            offset_x,
            offset_y,
        };
        let postprocessor = PostProcessor::new(confidence, self.config.iou_threshold);
        let detections = postprocessor.parse_detections(&output.preds.view(), &transform)?;

        tracing::debug!(
            detections = detections.len(),
            confidence,
            "inference completed"
        );

        let annotated = self.annotator.annotate(&image, &detections)?;
        let summary = aggregate::summarize(&detections)?;

        Ok(Analysis {
            detections,
            summary,
            annotated,
        })
    }
}
