use thiserror::Error;

/// Construction-time configuration failures.
///
/// Everything else (missing weight file, unavailable device, malformed image)
/// is passed through from the runtime as `anyhow::Error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no model class: {0}")]
    UnknownArchitecture(String),

    #[error("no pretrained model: {pretrained_model} (model: {architecture})")]
    UnknownPretrainedModel {
        architecture: String,
        pretrained_model: String,
    },

    #[error("score threshold must be a finite number, got {0}")]
    InvalidScoreThreshold(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = ConfigError::UnknownArchitecture("yolo".to_string());
        assert_eq!(err.to_string(), "no model class: yolo");

        let err = ConfigError::UnknownPretrainedModel {
            architecture: "mask_rcnn_resnet50".to_string(),
            pretrained_model: "voc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no pretrained model: voc (model: mask_rcnn_resnet50)"
        );

        let err = ConfigError::InvalidScoreThreshold(f32::NAN);
        assert!(err.to_string().starts_with("score threshold"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        fn construct() -> anyhow::Result<()> {
            Err(ConfigError::UnknownArchitecture("fcis".to_string()).into())
        }

        let err = construct().unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnknownArchitecture("fcis".to_string()))
        );
    }
}
