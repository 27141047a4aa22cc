use std::env;
use std::path::PathBuf;

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub environment: Environment,
    /// Architecture identifier, e.g. `mask_rcnn_resnet50`
    pub model: String,
    /// Pretrained weights identifier, e.g. `coco` or `sbd`
    pub pretrained_model: String,
    /// Accelerator index; negative runs on CPU
    pub gpu: i32,
    pub score_threshold: f32,
    /// Package root holding `trained_data/`; searched via `ROS_PACKAGE_PATH` when unset
    pub data_dir: Option<PathBuf>,
    pub intra_threads: usize,
    pub otel_endpoint: Option<String>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            model: "mask_rcnn_resnet50".to_string(),
            pretrained_model: "coco".to_string(),
            gpu: -1,
            score_threshold: 0.3,
            data_dir: None,
            intra_threads: 4,
            otel_endpoint: None,
        }
    }
}

impl PredictorConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let environment = Environment::from_env();

        let model = env::var("MODEL_ARCH").unwrap_or(defaults.model);

        let pretrained_model = env::var("PRETRAINED_MODEL").unwrap_or(defaults.pretrained_model);

        let gpu = env::var("GPU_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.gpu);

        let score_threshold = env::var("SCORE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.score_threshold);

        let data_dir = env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let intra_threads = env::var("INTRA_THREADS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.intra_threads);

        let otel_endpoint = env::var("OTEL_ENDPOINT").ok().filter(|s| !s.is_empty());

        Ok(Self {
            environment,
            model,
            pretrained_model,
            gpu,
            score_threshold,
            data_dir,
            intra_threads,
            otel_endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "ENVIRONMENT",
        "MODEL_ARCH",
        "PRETRAINED_MODEL",
        "GPU_ID",
        "SCORE_THRESHOLD",
        "DATA_DIR",
        "INTRA_THREADS",
        "OTEL_ENDPOINT",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = PredictorConfig::from_env().unwrap();

        assert_eq!(config.model, "mask_rcnn_resnet50");
        assert_eq!(config.pretrained_model, "coco");
        assert_eq!(config.gpu, -1);
        assert_eq!(config.score_threshold, 0.3);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.otel_endpoint, None);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        unsafe {
            env::set_var("MODEL_ARCH", "mask_rcnn_resnet50");
            env::set_var("PRETRAINED_MODEL", "sbd");
            env::set_var("GPU_ID", "1");
            env::set_var("SCORE_THRESHOLD", "0.75");
            env::set_var("DATA_DIR", "/opt/segmentation");
            env::set_var("INTRA_THREADS", "2");
            env::set_var("ENVIRONMENT", "production");
        }

        let config = PredictorConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.pretrained_model, "sbd");
        assert_eq!(config.gpu, 1);
        assert_eq!(config.score_threshold, 0.75);
        assert_eq!(config.data_dir, Some(PathBuf::from("/opt/segmentation")));
        assert_eq!(config.intra_threads, 2);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    #[serial]
    fn test_unparsable_values_fall_back() {
        clear_env();
        unsafe {
            env::set_var("GPU_ID", "first");
            env::set_var("SCORE_THRESHOLD", "high");
            env::set_var("INTRA_THREADS", "0");
            env::set_var("OTEL_ENDPOINT", "");
        }

        let config = PredictorConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.gpu, -1);
        assert_eq!(config.score_threshold, 0.3);
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.otel_endpoint, None);
    }
}
