//! Finds weight files shipped alongside the package.
//!
//! Weights follow a fixed layout below the package root:
//! `trained_data/<arch>_<dataset>_trained.onnx`.

use std::env;
use std::path::{Path, PathBuf};

pub const PACKAGE_NAME: &str = "segmentation";
pub const TRAINED_DATA_DIR: &str = "trained_data";
pub const WEIGHTS_EXTENSION: &str = "onnx";

/// Package-relative path of the weights for an architecture/dataset pair
pub fn weights_relative_path(architecture: &str, dataset: &str) -> PathBuf {
    Path::new(TRAINED_DATA_DIR).join(format!(
        "{}_{}_trained.{}",
        architecture, dataset, WEIGHTS_EXTENSION
    ))
}

/// Ordered list of directories searched for package data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocator {
    roots: Vec<PathBuf>,
}

impl PackageLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Single explicit package root
    pub fn from_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(vec![dir.into()])
    }

    /// Colon-separated workspace list (`ROS_PACKAGE_PATH` style). An entry
    /// that already ends in `package` is used as is, otherwise the package
    /// directory is looked up directly below it.
    pub fn from_search_path(search_path: &str, package: &str) -> Self {
        let roots = env::split_paths(search_path)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| {
                if p.file_name().is_some_and(|name| name == package) {
                    p
                } else {
                    p.join(package)
                }
            })
            .collect();
        Self::new(roots)
    }

    /// `data_dir` wins, then `ROS_PACKAGE_PATH`, then the working directory.
    pub fn from_env(data_dir: Option<&Path>) -> Self {
        if let Some(dir) = data_dir {
            return Self::from_data_dir(dir);
        }

        match env::var("ROS_PACKAGE_PATH") {
            Ok(search_path) if !search_path.trim().is_empty() => {
                Self::from_search_path(&search_path, PACKAGE_NAME)
            }
            _ => Self::from_data_dir("."),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First root holding `relative`. When none does, the first root's
    /// candidate is returned so the load error names a concrete path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        let candidates: Vec<PathBuf> = self.roots.iter().map(|root| root.join(relative)).collect();

        if let Some(found) = candidates.iter().find(|c| c.is_file()) {
            tracing::debug!(path = %found.display(), "Resolved package file");
            return found.clone();
        }

        tracing::debug!(
            relative = %relative.display(),
            roots = ?self.roots,
            "Package file not found in any root"
        );

        candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| relative.to_path_buf())
    }
}
