use panelcut::{BatchOptions, SegmentationConfig};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

fn default_write_manifest() -> bool {
    true
}

/// A batch segmentation job, loaded from TOML or JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatchJob {
    /// Directory tree (or single page) to segment
    pub input: PathBuf,
    /// Where crops and the manifest are written
    pub output_dir: PathBuf,
    /// Worker threads, 0 for one per core
    #[serde(default)]
    pub workers: usize,
    /// Per-page time budget in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_write_manifest")]
    pub write_manifest: bool,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
}

impl BatchJob {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            workers: self.workers,
            page_timeout: self.timeout_secs.map(Duration::from_secs),
            write_manifest: self.write_manifest,
        }
    }

    /// JSON schema of the job file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(BatchJob)
    }

    /// Load a job from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a job from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, JobError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load the job
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(JobError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String, JobError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load a standalone segmentation config, auto-detecting TOML or JSON
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SegmentationConfig, JobError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(toml::from_str(&fs::read_to_string(path_ref)?)?),
        Some("json") => Ok(serde_json::from_str(&fs::read_to_string(path_ref)?)?),
        _ => Err(JobError::UnsupportedFileFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelcut::ContourMode;

    #[test]
    fn test_toml_job_with_segmentation_table() {
        let job = BatchJob::from_toml(
            r#"
            input = "scans"
            output_dir = "panels"
            workers = 4
            timeout_secs = 30

            [segmentation]
            min_rectangularity = 0.9
            panel_contour_mode = "tree"
            "#,
        )
        .expect("should parse");

        assert_eq!(job.input, PathBuf::from("scans"));
        assert!(job.write_manifest);
        assert_eq!(job.segmentation.min_rectangularity, 0.9);
        assert_eq!(job.segmentation.panel_contour_mode, ContourMode::Tree);
        assert_eq!(job.segmentation.min_panel_area_fraction, 0.05);

        let options = job.batch_options();
        assert_eq!(options.workers, 4);
        assert_eq!(options.page_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_json_and_toml_agree() {
        let job = BatchJob::from_json(r#"{ "input": "a", "output_dir": "b", "write_manifest": false }"#)
            .expect("should parse");
        let reparsed = BatchJob::from_toml(&job.to_toml().expect("to toml")).expect("from toml");
        assert_eq!(job, reparsed);
        assert_eq!(job.timeout_secs, None);
    }

    #[test]
    fn test_file_format_is_detected_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = dir.path().join("job.yaml");
        fs::write(&yaml, "input: a").expect("write");
        assert!(matches!(BatchJob::from_file(&yaml), Err(JobError::UnsupportedFileFormat)));

        let config = dir.path().join("config.toml");
        fs::write(&config, "merge_proximity_fraction = 0.1\n").expect("write");
        let loaded = load_config(&config).expect("should load");
        assert_eq!(loaded.merge_proximity_fraction, 0.1);
    }
}
