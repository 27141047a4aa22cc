pub mod backend;
pub mod config;
pub mod error;
pub mod labels;
pub mod locator;
pub mod logging;
pub mod model;
pub mod predictor;
pub mod processing;
pub mod result;

// Re-export commonly used types for convenience
pub use backend::{Device, InferenceBackend, InferenceOutput, SessionOptions};
pub use config::PredictorConfig;
pub use error::ConfigError;
pub use model::{Architecture, ModelSpec, PretrainedModel};
pub use predictor::MaskRcnnPredictor;
pub use result::{Detection, Segmentation};

#[cfg(feature = "ort-backend")]
pub type OrtPredictor = MaskRcnnPredictor<backend::ort::OrtBackend>;
