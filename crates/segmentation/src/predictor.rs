use crate::{
    backend::{Device, InferenceBackend, SessionOptions},
    config::PredictorConfig,
    error::ConfigError,
    locator::PackageLocator,
    model::ModelSpec,
    processing::post::{PostProcessor, TransformParams},
    result::Segmentation,
};
use common::span;
use ndarray::ArrayView3;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
};
use preprocess::{ChannelOrder, CpuPreProcessor, Preprocess};
use std::time::Instant;

struct PredictorMetrics {
    duration: Histogram<f64>,
    predictions: Counter<u64>,
    detections: Counter<u64>,
}

impl PredictorMetrics {
    fn init(meter_name: &'static str) -> Self {
        let meter = global::meter(meter_name);
        let latency_buckets = [
            0.01, 0.02, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0,
        ];

        Self {
            duration: meter
                .f64_histogram("segmentation_predict_duration_seconds")
                .with_description("Time for one predict call (preprocess + infer + postprocess)")
                .with_unit("s")
                .with_boundaries(latency_buckets.to_vec())
                .build(),
            predictions: meter
                .u64_counter("segmentation_predictions_total")
                .with_description("Total predict calls that returned a result")
                .build(),
            detections: meter
                .u64_counter("segmentation_detections_total")
                .with_description("Total detections above the score threshold")
                .build(),
        }
    }
}

/// Mask R-CNN instance segmentation on BGR images.
///
/// Configuration is fixed at construction. Each [`predict`](Self::predict)
/// call is one blocking pass through the network.
pub struct MaskRcnnPredictor<B: InferenceBackend> {
    backend: B,
    model: ModelSpec,
    device: Device,
    preprocessor: CpuPreProcessor,
    postprocessor: PostProcessor,
    metrics: PredictorMetrics,
}

impl<B: InferenceBackend> MaskRcnnPredictor<B> {
    /// Resolve the configured model, load its weights through `B` and bind
    /// the session to the configured device.
    ///
    /// Unknown model names fail here with a [`ConfigError`]; weight loading
    /// and device errors come back from the backend unchanged.
    pub fn new(config: &PredictorConfig) -> anyhow::Result<Self> {
        validate_threshold(config.score_threshold)?;

        let locator = PackageLocator::from_env(config.data_dir.as_deref());
        let model = ModelSpec::resolve(&config.model, &config.pretrained_model, &locator)?;
        let device = Device::from_index(config.gpu);

        tracing::info!(
            model = %model.architecture,
            pretrained_model = %model.pretrained_model,
            weights = %model.weights_path.display(),
            %device,
            "Loading segmentation model"
        );

        let backend = B::load_model(
            &model.weights_path,
            SessionOptions {
                device,
                intra_threads: config.intra_threads,
            },
        )?;

        Ok(Self::with_backend(
            backend,
            model,
            device,
            config.score_threshold,
        ))
    }

    /// Assemble a predictor around an already loaded backend
    pub fn with_backend(backend: B, model: ModelSpec, device: Device, score_threshold: f32) -> Self {
        tracing::debug!(
            n_layers = model.params.n_layers,
            n_fg_class = model.n_fg_class(),
            anchor_scales = ?model.params.anchor_scales,
            roi_size = model.params.roi_size,
            min_size = model.params.min_size,
            max_size = model.params.max_size,
            score_threshold,
            "Model parameters"
        );

        Self {
            backend,
            preprocessor: CpuPreProcessor::new(model.params.input_spec()),
            postprocessor: PostProcessor::new(score_threshold),
            model,
            device,
            metrics: PredictorMetrics::init("segmentation"),
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        self.model.label_names
    }

    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn score_threshold(&self) -> f32 {
        self.postprocessor.score_threshold
    }

    /// Segment one `H x W x 3` BGR image.
    ///
    /// Returns index-aligned ROI masks, `(y_min, x_min, y_max, x_max)` boxes,
    /// labels and scores for detections strictly above the score threshold.
    pub fn predict(&mut self, image: ArrayView3<u8>) -> anyhow::Result<Segmentation> {
        let _s = span!("predict");
        let start = Instant::now();

        let (height, width, channels) = image.dim();
        if channels != 3 {
            anyhow::bail!("Expected a 3-channel image, got {} channels", channels);
        }

        let image = image.as_standard_layout();
        let pixels = image
            .as_slice()
            .ok_or_else(|| anyhow::anyhow!("Image is not contiguous"))?;

        let input = self.preprocessor.preprocess(
            pixels,
            width as u32,
            height as u32,
            ChannelOrder::Bgr,
        )?;

        let output = {
            let _s = span!("infer");
            self.backend.infer(&input.data)?
        };

        let transform = TransformParams {
            orig_width: width as u32,
            orig_height: height as u32,
            scale: input.scale,
        };
        let result = self.postprocessor.process(&output, &transform)?;

        self.metrics
            .duration
            .record(start.elapsed().as_secs_f64(), &[]);
        self.metrics.predictions.add(1, &[]);
        self.metrics.detections.add(result.len() as u64, &[]);

        tracing::debug!(
            width,
            height,
            input_width = input.input_size.0,
            input_height = input.input_size.1,
            detections = result.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prediction complete"
        );

        Ok(result)
    }
}

fn validate_threshold(score_threshold: f32) -> Result<(), ConfigError> {
    if score_threshold.is_finite() {
        Ok(())
    } else {
        tracing::warn!(score_threshold, "Rejecting score threshold");
        Err(ConfigError::InvalidScoreThreshold(score_threshold))
    }
}
