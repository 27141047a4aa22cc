pub mod cpu;

use ndarray::{Array, IxDyn};

pub use cpu::CpuPreProcessor;

/// Channel order of interleaved input pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    /// OpenCV / camera driver order; flipped to RGB before normalization
    Bgr,
}

/// Size bounds and channel mean the network was trained with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSpec {
    /// Target length of the shorter image side
    pub min_size: u32,
    /// Upper bound on the longer image side after scaling
    pub max_size: u32,
    /// Per-channel mean in RGB order, subtracted from raw 0-255 values
    pub mean: [f32; 3],
}

impl InputSpec {
    /// Scale factor that brings the short side to `min_size` unless that
    /// pushes the long side past `max_size`.
    pub fn scale_for(&self, width: u32, height: u32) -> f64 {
        let short = width.min(height) as f64;
        let long = width.max(height) as f64;

        let scale = self.min_size as f64 / short;
        if scale * long > self.max_size as f64 {
            self.max_size as f64 / long
        } else {
            scale
        }
    }

    /// Network input (width, height) for an image of the given size.
    /// Each side is rounded to the nearest pixel.
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.scale_for(width, height);
        let w = ((width as f64 * scale).round() as u32).max(1);
        let h = ((height as f64 * scale).round() as u32).max(1);
        (w, h)
    }
}

/// Result of preprocessing including transformation parameters
#[derive(Debug)]
pub struct PreprocessResult {
    /// `[1, 3, H, W]` RGB tensor, mean-subtracted
    pub data: Array<f32, IxDyn>,
    /// Scale factor from original to network input coordinates
    pub scale: f32,
    /// Network input size as (width, height)
    pub input_size: (u32, u32),
}

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Preprocess an interleaved 3-channel image
    ///
    /// # Arguments
    /// * `pixels` - pixel data in HWC format
    /// * `width` - Image width
    /// * `height` - Image height
    /// * `order` - channel order of `pixels`
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        order: ChannelOrder,
    ) -> anyhow::Result<PreprocessResult>;

    /// Get the input bounds this preprocessor targets
    fn input_spec(&self) -> &InputSpec;
}
