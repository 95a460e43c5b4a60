/// Letterbox geometry needed to map predictions back onto the original image.
pub struct TransformParams {
    pub orig_width: u32,
    pub orig_height: u32,
    pub input_width: u32,
    pub input_height: u32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1) * (self.y2 - self.y1)
    }

    pub fn intersection_area(&self, other: &Detection) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    pub fn iou(&self, other: &Detection) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 { intersection / union } else { 0.0 }
    }
}

pub struct PostProcessor {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32, iou_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
        }
    }

    /// Parse detections from the YOLO-style output tensor.
    ///
    /// Expects `preds` shaped [1, 4 + num_classes, num_candidates]: rows 0-3
    /// are cxcywh in input-image pixels, the remaining rows are per-class
    /// scores. Candidates below the confidence threshold are dropped, the
    /// rest are mapped back through the letterbox transform and deduplicated
    /// with per-class non-maximum suppression.
    pub fn parse_detections(
        &self,
        preds: &ndarray::ArrayViewD<f32>,
        transform: &TransformParams,
    ) -> anyhow::Result<Vec<Detection>> {
        let shape = preds.shape();
        if shape.len() != 3 || shape[1] < 5 {
            anyhow::bail!(
                "unexpected prediction tensor shape {:?}, want [1, 4 + classes, candidates]",
                shape
            );
        }

        let num_classes = shape[1] - 4;
        let num_candidates = shape[2];

        let mut detections = Vec::new();

        for i in 0..num_candidates {
            // Argmax over class scores
            let mut confidence = f32::NEG_INFINITY;
            let mut class_idx = 0usize;
            for c in 0..num_classes {
                let score = preds[[0, 4 + c, i]];
                if score > confidence {
                    confidence = score;
                    class_idx = c;
                }
            }

            if confidence < self.confidence_threshold {
                continue;
            }

            let cx = preds[[0, 0, i]];
            let cy = preds[[0, 1, i]];
            let w = preds[[0, 2, i]];
            let h = preds[[0, 3, i]];

            let (x1_input, y1_input, x2_input, y2_input) = cxcywh_to_xyxy(cx, cy, w, h);

            // Apply inverse letterbox transform to original image coordinates
            let x1 = ((x1_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y1 = ((y1_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);
            let x2 = ((x2_input - transform.offset_x) / transform.scale)
                .max(0.0)
                .min(transform.orig_width as f32);
            let y2 = ((y2_input - transform.offset_y) / transform.scale)
                .max(0.0)
                .min(transform.orig_height as f32);

            detections.push(Detection {
                x1,
                y1,
                x2,
                y2,
                confidence,
                class_id: class_idx as u32,
            });
        }

        Ok(non_max_suppression(detections, self.iou_threshold))
    }
}

fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    (
        cx - w / 2.0,
        cy - h / 2.0,
        cx + w / 2.0,
        cy + h / 2.0,
    )
}

/// Greedy per-class NMS: keep the highest-confidence box, drop same-class
/// boxes overlapping it above the IoU threshold.
fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());

    for candidate in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    const NUM_CLASSES: usize = 3;

    fn identity_transform() -> TransformParams {
        TransformParams {
            orig_width: 640,
            orig_height: 640,
            input_width: 640,
            input_height: 640,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Build a [1, 4 + NUM_CLASSES, n] tensor from (cxcywh, class, score)
    fn create_preds(candidates: &[([f32; 4], usize, f32)]) -> Array<f32, IxDyn> {
        let n = candidates.len();
        let mut preds = Array::zeros(IxDyn(&[1, 4 + NUM_CLASSES, n]));

        for (i, (bbox, class_idx, score)) in candidates.iter().enumerate() {
            for (row, v) in bbox.iter().enumerate() {
                preds[[0, row, i]] = *v;
            }
            preds[[0, 4 + class_idx, i]] = *score;
        }

        preds
    }

    #[test]
    fn below_threshold_candidates_are_dropped() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds = create_preds(&[
            ([100.0, 100.0, 50.0, 50.0], 0, 0.9),
            ([300.0, 300.0, 50.0, 50.0], 1, 0.3),
        ]);

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_id, 0);
    }

    #[test]
    fn argmax_picks_the_strongest_class() {
        let post = PostProcessor::new(0.5, 0.45);
        let mut preds = create_preds(&[([100.0, 100.0, 50.0, 50.0], 2, 0.8)]);
        // A weaker competing class on the same candidate
        preds[[0, 4, 0]] = 0.6;

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_id, 2);
        assert_eq!(detections[0].confidence, 0.8);
    }

    #[test]
    fn boxes_convert_from_cxcywh_to_xyxy() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds = create_preds(&[([100.0, 80.0, 40.0, 20.0], 0, 0.9)]);

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        let d = &detections[0];
        assert_eq!((d.x1, d.y1, d.x2, d.y2), (80.0, 70.0, 120.0, 90.0));
    }

    #[test]
    fn letterbox_transform_is_inverted() {
        let post = PostProcessor::new(0.5, 0.45);
        // 1280x720 image letterboxed into 640x640: scale 0.5, y offset 140
        let transform = TransformParams {
            orig_width: 1280,
            orig_height: 720,
            input_width: 640,
            input_height: 640,
            scale: 0.5,
            offset_x: 0.0,
            offset_y: 140.0,
        };
        let preds = create_preds(&[([320.0, 320.0, 100.0, 100.0], 0, 0.9)]);

        let detections = post.parse_detections(&preds.view(), &transform).unwrap();

        let d = &detections[0];
        assert_eq!((d.x1, d.y1), (540.0, 260.0));
        assert_eq!((d.x2, d.y2), (740.0, 460.0));
    }

    #[test]
    fn coordinates_clamp_to_image_bounds() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds = create_preds(&[([10.0, 10.0, 100.0, 100.0], 0, 0.9)]);

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        let d = &detections[0];
        assert_eq!((d.x1, d.y1), (0.0, 0.0));
    }

    #[test]
    fn nms_keeps_highest_confidence_of_overlapping_same_class() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds = create_preds(&[
            ([100.0, 100.0, 50.0, 50.0], 0, 0.7),
            ([102.0, 102.0, 50.0, 50.0], 0, 0.9),
        ]);

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].confidence, 0.9);
    }

    #[test]
    fn nms_keeps_overlapping_boxes_of_different_classes() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds = create_preds(&[
            ([100.0, 100.0, 50.0, 50.0], 0, 0.7),
            ([102.0, 102.0, 50.0, 50.0], 1, 0.9),
        ]);

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        assert_eq!(detections.len(), 2);
    }

    #[test]
    fn empty_candidate_set_yields_no_detections() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds: Array<f32, IxDyn> = Array::zeros(IxDyn(&[1, 4 + NUM_CLASSES, 0]));

        let detections = post
            .parse_detections(&preds.view(), &identity_transform())
            .unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn malformed_tensor_shape_is_rejected() {
        let post = PostProcessor::new(0.5, 0.45);
        let preds: Array<f32, IxDyn> = Array::zeros(IxDyn(&[1, 4]));

        assert!(
            post.parse_detections(&preds.view(), &identity_transform())
                .is_err()
        );
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let d = Detection {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            confidence: 0.9,
            class_id: 0,
        };
        assert!((d.iou(&d.clone()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = Detection {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            confidence: 0.9,
            class_id: 0,
        };
        let b = Detection {
            x1: 20.0,
            y1: 20.0,
            x2: 30.0,
            y2: 30.0,
            confidence: 0.9,
            class_id: 0,
        };
        assert_eq!(a.iou(&b), 0.0);
    }
}
