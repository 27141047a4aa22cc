use crate::{ChannelOrder, InputSpec, Preprocess, PreprocessResult};
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array, IxDyn};

pub struct CpuPreProcessor {
    pub input_spec: InputSpec,
    resizer: Resizer,
}

impl CpuPreProcessor {
    pub fn new(input_spec: InputSpec) -> Self {
        Self {
            input_spec,
            resizer: Resizer::new(),
        }
    }

    pub fn preprocess_from_u8_slice(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> anyhow::Result<(Array<f32, IxDyn>, f32, (u32, u32))> {
        let _s = span!("preprocess_image");

        tracing::trace!(
            width,
            height,
            order = ?order,
            pixel_bytes = pixels.len(),
            "Preprocessing image dimensions"
        );

        if width == 0 || height == 0 {
            anyhow::bail!("Empty image: {}x{}", width, height);
        }

        let expected_size = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected_size {
            anyhow::bail!(
                "Buffer size mismatch: expected {}, got {} bytes",
                expected_size,
                pixels.len()
            );
        }

        let scale = self.input_spec.scale_for(width, height);
        let (new_width, new_height) = self.input_spec.scaled_size(width, height);

        let input = if (new_width, new_height) == (width, height) {
            self.normalize(pixels, width, height, order)?
        } else {
            let resized = self.resize(pixels, width, height, new_width, new_height)?;
            self.normalize(resized.buffer(), new_width, new_height, order)?
        };

        Ok((input, scale as f32, (new_width, new_height)))
    }

    fn resize(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
    ) -> anyhow::Result<Image<'static>> {
        let _s = span!("resize");

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;
        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        self.resizer.resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        Ok(resized)
    }

    /// Interleaved HWC bytes to planar RGB CHW floats with the mean removed.
    fn normalize(
        &self,
        buf: &[u8],
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> anyhow::Result<Array<f32, IxDyn>> {
        let _s = span!("normalize");

        let width = width as usize;
        let height = height as usize;
        let spatial = width * height;
        let mean = self.input_spec.mean;

        let mut output = vec![0.0f32; 3 * spatial];

        for (i, px) in buf.chunks_exact(3).enumerate() {
            let (r, g, b) = match order {
                ChannelOrder::Rgb => (px[0], px[1], px[2]),
                ChannelOrder::Bgr => (px[2], px[1], px[0]),
            };

            output[i] = r as f32 - mean[0];
            output[i + spatial] = g as f32 - mean[1];
            output[i + 2 * spatial] = b as f32 - mean[2];
        }

        Ok(Array::from_shape_vec(
            IxDyn(&[1, 3, height, width]),
            output,
        )?)
    }
}

impl Preprocess for CpuPreProcessor {
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> anyhow::Result<PreprocessResult> {
        let (data, scale, input_size) =
            self.preprocess_from_u8_slice(pixels, width, height, order)?;
        Ok(PreprocessResult {
            data,
            scale,
            input_size,
        })
    }

    fn input_spec(&self) -> &InputSpec {
        &self.input_spec
    }
}
