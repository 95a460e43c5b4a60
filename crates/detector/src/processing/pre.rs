use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::RgbImage;
use ndarray::{Array, IxDyn};
use std::default::Default;

const LETTERBOX_COLOR: u8 = 114;

pub struct PreProcessor {
    pub input_size: (u32, u32),
    rgb_buffer: Vec<u8>,
    letterboxed_buffer: Vec<u8>,
}

impl PreProcessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            input_size,
            rgb_buffer: Vec::with_capacity(1920 * 1080 * 3),
            letterboxed_buffer: vec![LETTERBOX_COLOR; (input_size.0 * input_size.1 * 3) as usize],
        }
    }

    /// Letterbox the image into the model input size and produce the
    /// normalized NCHW tensor plus the transform back to image coordinates.
    pub fn preprocess(
        &mut self,
        image: &RgbImage,
    ) -> anyhow::Result<(Array<f32, IxDyn>, f32, f32, f32)> {
        let (width, height) = image.dimensions();

        tracing::trace!(width, height, "Preprocessing image dimensions");

        self.copy_rgb_pixels(image)?;

        let (scale, offset_x, offset_y, resized) = self.resize_and_letterbox(width, height)?;

        let input = Self::normalize(&resized)?;

        Ok((input, scale, offset_x, offset_y))
    }

    fn copy_rgb_pixels(&mut self, image: &RgbImage) -> anyhow::Result<()> {
        let (width, height) = image.dimensions();
        let expected_size = (width * height * 3) as usize;

        self.rgb_buffer.clear();
        self.rgb_buffer.extend_from_slice(image.as_raw());

        if self.rgb_buffer.len() != expected_size {
            anyhow::bail!(
                "Buffer size mismatch: expected {}, got {} bytes",
                expected_size,
                self.rgb_buffer.len()
            );
        }

        Ok(())
    }

    fn resize_and_letterbox(
        &mut self,
        width: u32,
        height: u32,
    ) -> anyhow::Result<(f32, f32, f32, Image<'_>)> {
        let scale =
            (self.input_size.0 as f32 / width as f32).min(self.input_size.1 as f32 / height as f32);
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        let offset_x = (self.input_size.0 - new_width) / 2;
        let offset_y = (self.input_size.1 - new_height) / 2;

        let src = Image::from_slice_u8(width, height, &mut self.rgb_buffer, PixelType::U8x3)?;

        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        self.letterboxed_buffer.fill(LETTERBOX_COLOR);

        let resized_data = resized.buffer();
        let stride = self.input_size.0 * 3;

        for y in 0..new_height {
            let src_row = (y * new_width * 3) as usize;
            let dst_row = ((y + offset_y) * stride + offset_x * 3) as usize;

            self.letterboxed_buffer[dst_row..dst_row + (new_width * 3) as usize]
                .copy_from_slice(&resized_data[src_row..src_row + (new_width * 3) as usize]);
        }

        let final_img = Image::from_slice_u8(
            self.input_size.0,
            self.input_size.1,
            &mut self.letterboxed_buffer,
            PixelType::U8x3,
        )?;

        Ok((scale, offset_x as f32, offset_y as f32, final_img))
    }

    fn normalize(image: &Image) -> anyhow::Result<Array<f32, IxDyn>> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let spatial = width * height;

        let mut output = vec![0.0f32; 3 * spatial];
        let buf = image.buffer();

        for (i, px) in buf.chunks_exact(3).enumerate() {
            output[i] = px[0] as f32 / 255.0;
            output[spatial + i] = px[1] as f32 / 255.0;
            output[2 * spatial + i] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(
            IxDyn(&[1, 3, height, width]),
            output,
        )?)
    }
}
