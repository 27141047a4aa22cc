use super::{Device, InferenceBackend, InferenceOutput, SessionOptions};
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;

pub struct OrtBackend {
    session: Session,
    device: Device,
}

impl OrtBackend {
    /// Load model bound to `device` with an explicit intra-op thread count
    pub fn load_model_on(path: &Path, device: Device, intra_threads: usize) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?;

        match device {
            Device::Cuda { device_id } => {
                tracing::info!(device_id, "Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(device_id)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            Device::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(path = %path.display(), %device, "Model loaded");
        Ok(Self { session, device })
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &Path, options: SessionOptions) -> anyhow::Result<Self> {
        Self::load_model_on(path, options.device, options.intra_threads)
    }

    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
        let outputs = self.session.run(ort::inputs![
            "images" => TensorRef::from_array_view(images.view())?
        ])?;

        let bboxes = outputs["bboxes"].try_extract_array::<f32>()?;
        let masks = outputs["masks"].try_extract_array::<f32>()?;
        let labels = outputs["labels"].try_extract_array::<i64>()?;
        let scores = outputs["scores"].try_extract_array::<f32>()?;

        Ok(InferenceOutput {
            bboxes: bboxes.into_owned(),
            masks: masks.into_owned(),
            labels: labels.into_owned(),
            scores: scores.into_owned(),
        })
    }
}
