use ndarray::{Array, ArrayD, IxDyn};
use std::fmt;
use std::path::Path;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Compute device a model session is bound to.
///
/// Passed explicitly at load time; nothing process-global is switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Cuda {
        device_id: i32,
    },
}

impl Device {
    /// Accelerator index convention: negative means CPU only
    pub fn from_index(index: i32) -> Self {
        if index >= 0 {
            Device::Cuda { device_id: index }
        } else {
            Device::Cpu
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda { device_id } => write!(f, "cuda:{}", device_id),
        }
    }
}

/// How a model session is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub device: Device,
    pub intra_threads: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            intra_threads: 4,
        }
    }
}

pub trait InferenceBackend {
    fn load_model(path: &Path, options: SessionOptions) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run the network on a `[1, 3, H, W]` batch
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

/// Raw network outputs for a single-image batch, in input-tensor coordinates.
#[derive(Debug, Clone)]
pub struct InferenceOutput {
    pub bboxes: ArrayD<f32>, // [1, R, 4] (y_min, x_min, y_max, x_max)
    pub masks: ArrayD<f32>,  // [1, R, H, W] soft masks in [0, 1]
    pub labels: ArrayD<i64>, // [1, R] 0-based foreground class ids
    pub scores: ArrayD<f32>, // [1, R]
}

impl InferenceOutput {
    /// Number of detections, after checking all four outputs agree on it
    pub fn num_detections(&self) -> anyhow::Result<usize> {
        let n = self.scores.shape().get(1).copied().unwrap_or(0);

        if self.scores.ndim() != 2 || self.scores.shape()[0] != 1 {
            anyhow::bail!("Unexpected scores shape {:?}, expected [1, R]", self.scores.shape());
        }
        if self.labels.shape() != [1, n] {
            anyhow::bail!("Unexpected labels shape {:?}, expected [1, {}]", self.labels.shape(), n);
        }
        if self.bboxes.shape() != [1, n, 4] {
            anyhow::bail!("Unexpected bboxes shape {:?}, expected [1, {}, 4]", self.bboxes.shape(), n);
        }
        if self.masks.ndim() != 4 || self.masks.shape()[..2] != [1, n] {
            anyhow::bail!(
                "Unexpected masks shape {:?}, expected [1, {}, H, W]",
                self.masks.shape(),
                n
            );
        }

        Ok(n)
    }
}
