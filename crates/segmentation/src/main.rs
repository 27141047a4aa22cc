use anyhow::Context;
use common::TelemetryGuard;
use ndarray::Array3;
use segmentation::{
    MaskRcnnPredictor, PredictorConfig, backend::InferenceBackend, labels::label_name,
    logging::setup_logging,
};
use std::path::Path;

#[cfg(feature = "ort-backend")]
use segmentation::backend::ort::OrtBackend as Backend;

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the segment binary");

/// Decode an image file into `H x W x 3` BGR bytes
fn load_bgr_image(path: &Path) -> anyhow::Result<Array3<u8>> {
    let rgb = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgb8();

    let (width, height) = rgb.dimensions();
    let mut bgr = rgb.into_raw();
    for px in bgr.chunks_exact_mut(3) {
        px.swap(0, 2);
    }

    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, 3),
        bgr,
    )?)
}

fn run<B: InferenceBackend>(
    mut predictor: MaskRcnnPredictor<B>,
    paths: &[String],
) -> anyhow::Result<()> {
    let names = predictor.label_names();

    for path in paths {
        let image = load_bgr_image(Path::new(path))?;
        let result = predictor.predict(image.view())?;

        tracing::info!(image = %path, detections = result.len(), "Segmented image");

        for det in result.iter() {
            tracing::info!(
                image = %path,
                label = det.label,
                name = label_name(names, det.label).unwrap_or("unknown"),
                score = det.score,
                bbox = ?det.bbox,
                mask_height = det.roi_mask.nrows(),
                mask_width = det.roi_mask.ncols(),
                "Detection"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PredictorConfig::from_env()?;

    let _telemetry = match config.otel_endpoint.as_ref() {
        Some(endpoint) => Some(TelemetryGuard::init(
            "segmentation",
            endpoint,
            config.environment,
        )?),
        None => {
            setup_logging(&config)?;
            None
        }
    };

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        anyhow::bail!("Usage: segment <image>...");
    }

    let predictor = MaskRcnnPredictor::<Backend>::new(&config)?;
    tracing::info!("Model loaded successfully");

    run(predictor, &paths)
}
