//! # Comic Page Segmentation Library
//!
//! Splits scanned comic pages into their panels and the gutters between
//! them, returning every region as an axis-aligned rectangle in reading
//! order.
//!
//! ## Core Features
//!
//! - **Seven-stage pipeline**: adaptive binarization, contour extraction,
//!   panel filtering, gutter detection, merging, expansion and composition
//! - **Pluggable seams**: swap the binarizer or contour extractor through traits
//! - **One immutable configuration**: every threshold lives in [`SegmentationConfig`]
//! - **Batch driver**: segment a whole directory tree on a worker pool with
//!   per-page failure isolation and an optional time budget
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use panelcut::Segmenter;
//!
//! let segmenter = Segmenter::builder().build()?;
//!
//! let page = image::open("page.png")?.to_luma8();
//! let segmentation = segmenter.segment(&page)?;
//! for region in &segmentation.regions {
//!     println!("{region:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Batch Processing
//!
//! ```rust,no_run
//! use std::{path::Path, time::Duration};
//! use panelcut::{BatchOptions, BatchRunner, SegmentationConfig};
//!
//! let options = BatchOptions {
//!     workers: 4,
//!     page_timeout: Some(Duration::from_secs(30)),
//!     ..Default::default()
//! };
//! let runner = BatchRunner::new(SegmentationConfig::default(), options)?;
//! let manifest = runner.run(Path::new("scans"), Path::new("panels"))?;
//! println!("{} pages done, {} failed", manifest.completed(), manifest.failed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod deadline;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod batch;

// Re-exports for convenience
pub use error::{PanelError, Result};
pub use types::{Contour, PageSegmentation, PanelCandidate, Rectangle, RegionList};
pub use config::{ContourMode, SegmentationConfig};
pub use deadline::Deadline;
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Segmenter, builder::SegmenterBuilder};
pub use io::*;
pub use batch::{BatchManifest, BatchOptions, BatchRunner, PageReport, PageStatus};
