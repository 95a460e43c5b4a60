use crate::classes::DefectClass;
use crate::errors::DetectError;
use crate::processing::post::Detection;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

fn class_color(class: DefectClass) -> Rgb<u8> {
    match class {
        DefectClass::CorrodedRebar => Rgb([255, 75, 75]),
        DefectClass::Spalling => Rgb([255, 165, 0]),
        DefectClass::Cracking => Rgb([64, 156, 255]),
    }
}

/// Renders detection overlays onto a copy of the input image.
pub struct Annotator {
    font: Option<FontVec>,
    font_scale: f32,
    bbox_thickness: i32,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    /// Creates an annotator with a system font when one can be found.
    /// Without a font, boxes are still drawn and labels are skipped.
    pub fn new() -> Self {
        Self {
            font: load_system_font(),
            font_scale: 16.0,
            bbox_thickness: 2,
        }
    }

    /// Draw one colored box (and label, font permitting) per detection.
    pub fn annotate(
        &self,
        image: &RgbImage,
        detections: &[Detection],
    ) -> Result<RgbImage, DetectError> {
        let mut output = image.clone();

        for detection in detections {
            let class = DefectClass::from_id(detection.class_id)?;
            let color = class_color(class);

            self.draw_bbox(&mut output, detection, color);
            self.draw_label(&mut output, detection, class, color);
        }

        Ok(output)
    }

    fn draw_bbox(&self, image: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
        let x = detection.x1 as i32;
        let y = detection.y1 as i32;
        let w = (detection.x2 - detection.x1).max(1.0) as u32;
        let h = (detection.y2 - detection.y1).max(1.0) as u32;

        for t in 0..self.bbox_thickness {
            let shrink = 2 * t as u32;
            if w <= shrink || h <= shrink {
                break;
            }
            let rect = Rect::at(x + t, y + t).of_size(w - shrink, h - shrink);
            draw_hollow_rect_mut(image, rect, color);
        }
    }

    fn draw_label(
        &self,
        image: &mut RgbImage,
        detection: &Detection,
        class: DefectClass,
        color: Rgb<u8>,
    ) {
        let Some(font) = &self.font else {
            return;
        };

        let text = format!("{} {:.0}%", class.label(), detection.confidence * 100.0);
        let scale = PxScale::from(self.font_scale);

        let tag_height = self.font_scale as u32 + 4;
        let tag_width = (text.chars().count() as f32 * self.font_scale * 0.6) as u32;
        let x = detection.x1 as i32;
        let y = (detection.y1 as i32 - tag_height as i32).max(0);

        draw_filled_rect_mut(image, Rect::at(x, y).of_size(tag_width.max(1), tag_height), color);
        draw_text_mut(image, TEXT_COLOR, x + 2, y + 2, scale, font, &text);
    }
}

/// Attempts to load a font from common system locations.
fn load_system_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in font_paths {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                tracing::debug!(path, "loaded annotation font");
                return Some(font);
            }
        }
    }

    tracing::debug!("no system font found, annotation labels disabled");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fontless_annotator() -> Annotator {
        Annotator {
            font: None,
            font_scale: 16.0,
            bbox_thickness: 2,
        }
    }

    fn detection(class_id: u32) -> Detection {
        Detection {
            x1: 20.0,
            y1: 20.0,
            x2: 60.0,
            y2: 60.0,
            confidence: 0.9,
            class_id,
        }
    }

    #[test]
    fn no_detections_leaves_image_untouched() {
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let annotated = fontless_annotator().annotate(&image, &[]).unwrap();
        assert_eq!(annotated, image);
    }

    #[test]
    fn boxes_are_drawn_in_the_class_color() {
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let annotated = fontless_annotator()
            .annotate(&image, &[detection(0)])
            .unwrap();

        assert_eq!(
            *annotated.get_pixel(20, 20),
            class_color(DefectClass::CorrodedRebar)
        );
        // Interior stays untouched
        assert_eq!(*annotated.get_pixel(40, 40), Rgb([0, 0, 0]));
    }

    #[test]
    fn unknown_class_id_fails_instead_of_drawing() {
        let image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let result = fontless_annotator().annotate(&image, &[detection(5)]);

        assert!(matches!(result, Err(DetectError::UnknownClass(5))));
    }
}
