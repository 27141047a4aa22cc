//! Architecture and pretrained-weights resolution.

use crate::error::ConfigError;
use crate::labels::{COCO_INSTANCE_SEGMENTATION_LABEL_NAMES, SBD_INSTANCE_SEGMENTATION_LABEL_NAMES};
use crate::locator::{PackageLocator, weights_relative_path};
use preprocess::InputSpec;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    MaskRcnnResNet50,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::MaskRcnnResNet50 => "mask_rcnn_resnet50",
        }
    }

    pub fn n_layers(&self) -> u32 {
        match self {
            Architecture::MaskRcnnResNet50 => 50,
        }
    }

    /// RGB channel mean the backbone was trained with
    pub fn mean(&self) -> [f32; 3] {
        match self {
            Architecture::MaskRcnnResNet50 => [123.152, 115.903, 103.063],
        }
    }
}

impl FromStr for Architecture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mask_rcnn_resnet50" => Ok(Architecture::MaskRcnnResNet50),
            other => Err(ConfigError::UnknownArchitecture(other.to_string())),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset the shipped weights were trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PretrainedModel {
    Coco,
    Sbd,
}

impl PretrainedModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PretrainedModel::Coco => "coco",
            PretrainedModel::Sbd => "sbd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "coco" => Some(PretrainedModel::Coco),
            "sbd" => Some(PretrainedModel::Sbd),
            _ => None,
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            PretrainedModel::Coco => &COCO_INSTANCE_SEGMENTATION_LABEL_NAMES,
            PretrainedModel::Sbd => &SBD_INSTANCE_SEGMENTATION_LABEL_NAMES,
        }
    }
}

impl fmt::Display for PretrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const COCO_ANCHOR_SCALES: [u32; 5] = [2, 4, 8, 16, 32];
const SBD_ANCHOR_SCALES: [u32; 4] = [4, 8, 16, 32];

/// Hyperparameters fixed by an architecture/weights pair.
///
/// Anchor scales and ROI size are baked into the exported graph; they are
/// kept here so a loaded model can be described in logs.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub n_layers: u32,
    pub mean: [f32; 3],
    pub anchor_scales: &'static [u32],
    pub min_size: u32,
    pub max_size: u32,
    pub roi_size: u32,
}

impl ModelParams {
    pub fn for_pair(architecture: Architecture, pretrained_model: PretrainedModel) -> Self {
        let n_layers = architecture.n_layers();
        let mean = architecture.mean();

        match (architecture, pretrained_model) {
            (Architecture::MaskRcnnResNet50, PretrainedModel::Sbd) => Self {
                n_layers,
                mean,
                anchor_scales: &SBD_ANCHOR_SCALES,
                min_size: 600,
                max_size: 1000,
                roi_size: 14,
            },
            (Architecture::MaskRcnnResNet50, PretrainedModel::Coco) => Self {
                n_layers,
                mean,
                anchor_scales: &COCO_ANCHOR_SCALES,
                min_size: 800,
                max_size: 1333,
                roi_size: 7,
            },
        }
    }

    pub fn input_spec(&self) -> InputSpec {
        InputSpec {
            min_size: self.min_size,
            max_size: self.max_size,
            mean: self.mean,
        }
    }
}

/// Everything needed to load and run one pretrained model
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub architecture: Architecture,
    pub pretrained_model: PretrainedModel,
    pub params: ModelParams,
    pub label_names: &'static [&'static str],
    pub weights_path: PathBuf,
}

impl ModelSpec {
    /// Resolve names to a concrete model. Unknown names are logged and
    /// rejected; no partially resolved spec is ever returned.
    pub fn resolve(
        architecture: &str,
        pretrained_model: &str,
        locator: &PackageLocator,
    ) -> Result<Self, ConfigError> {
        let arch = architecture.parse::<Architecture>().inspect_err(|e| {
            tracing::warn!(model = architecture, "{}", e);
        })?;

        let Some(dataset) = PretrainedModel::from_name(pretrained_model) else {
            let err = ConfigError::UnknownPretrainedModel {
                architecture: architecture.to_string(),
                pretrained_model: pretrained_model.to_string(),
            };
            tracing::warn!(model = architecture, pretrained_model, "{}", err);
            return Err(err);
        };

        let weights_path = locator.resolve(&weights_relative_path(arch.as_str(), dataset.as_str()));

        Ok(Self {
            architecture: arch,
            pretrained_model: dataset,
            params: ModelParams::for_pair(arch, dataset),
            label_names: dataset.label_names(),
            weights_path,
        })
    }

    /// Number of foreground classes the network predicts
    pub fn n_fg_class(&self) -> usize {
        self.label_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> PackageLocator {
        PackageLocator::from_data_dir("/pkg")
    }

    #[test]
    fn test_resolve_coco() {
        let spec = ModelSpec::resolve("mask_rcnn_resnet50", "coco", &locator()).unwrap();

        assert_eq!(spec.architecture, Architecture::MaskRcnnResNet50);
        assert_eq!(spec.pretrained_model, PretrainedModel::Coco);
        assert_eq!(spec.n_fg_class(), 80);
        assert_eq!(spec.params.anchor_scales, &[2, 4, 8, 16, 32]);
        assert_eq!((spec.params.min_size, spec.params.max_size), (800, 1333));
        assert_eq!(spec.params.roi_size, 7);
        assert_eq!(spec.params.n_layers, 50);
        assert_eq!(
            spec.weights_path,
            PathBuf::from("/pkg/trained_data/mask_rcnn_resnet50_coco_trained.onnx")
        );
    }

    #[test]
    fn test_resolve_sbd() {
        let spec = ModelSpec::resolve("mask_rcnn_resnet50", "sbd", &locator()).unwrap();

        assert_eq!(spec.n_fg_class(), 20);
        assert_eq!(spec.params.anchor_scales, &[4, 8, 16, 32]);
        assert_eq!((spec.params.min_size, spec.params.max_size), (600, 1000));
        assert_eq!(spec.params.roi_size, 14);
        assert_eq!(spec.params.mean, [123.152, 115.903, 103.063]);
    }

    #[test]
    fn test_label_tables_are_deterministic() {
        let a = ModelSpec::resolve("mask_rcnn_resnet50", "coco", &locator()).unwrap();
        let b = ModelSpec::resolve("mask_rcnn_resnet50", "coco", &locator()).unwrap();
        assert_eq!(a.label_names, b.label_names);
    }

    #[test]
    fn test_unknown_architecture() {
        let err = ModelSpec::resolve("fcis_resnet101", "coco", &locator()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownArchitecture("fcis_resnet101".to_string())
        );
    }

    #[test]
    fn test_unknown_pretrained_model() {
        let err = ModelSpec::resolve("mask_rcnn_resnet50", "voc", &locator()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPretrainedModel { ref pretrained_model, .. } if pretrained_model == "voc"
        ));
    }

    #[test]
    fn test_input_spec_from_params() {
        let params = ModelParams::for_pair(Architecture::MaskRcnnResNet50, PretrainedModel::Sbd);
        let spec = params.input_spec();
        assert_eq!(spec.min_size, 600);
        assert_eq!(spec.max_size, 1000);
        assert_eq!(spec.mean, params.mean);
    }
}
