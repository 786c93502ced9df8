use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Failed to decode page {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Cannot process an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Page processing exceeded its time budget of {budget:?}")]
    TimedOut { budget: Duration },

    #[error("Failed to walk input directory: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PanelError {
    /// Short, stable name of the failure class, used in batch manifests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } | Self::Image(_) => "decode_failure",
            Self::EmptyImage { .. } => "degenerate_geometry",
            Self::InvalidConfig(_) => "configuration_error",
            Self::Write { .. } => "write_failure",
            Self::TimedOut { .. } => "timed_out",
            Self::Discovery(_) | Self::Io(_) => "io_error",
            Self::WorkerPool(_) => "worker_pool",
            Self::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
