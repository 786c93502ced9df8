use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::{
    config::SegmentationConfig,
    deadline::Deadline,
    error::{PanelError, Result},
    io::{discover_pages, export_regions, load_page, output_dir_for},
    pipeline::Segmenter,
    types::RegionList,
};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchOptions {
    /// Worker threads; 0 lets rayon pick one per core
    pub workers: usize,
    /// Time budget for a single page, unbounded when absent
    pub page_timeout: Option<Duration>,
    /// Write `manifest.json` into the output root after the run
    pub write_manifest: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            page_timeout: None,
            write_manifest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    Completed {
        regions: RegionList,
        outputs: Vec<PathBuf>,
    },
    Failed {
        kind: String,
        message: String,
    },
}

impl PageStatus {
    fn from_error(err: &PanelError) -> Self {
        Self::Failed {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageReport {
    pub page: PathBuf,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub status: PageStatus,
}

/// Per-page outcomes of a batch run, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchManifest {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub pages: Vec<PageReport>,
}

impl BatchManifest {
    pub fn completed(&self) -> usize {
        self.pages.iter().filter(|report| report.status.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.pages.len() - self.completed()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PanelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Segments a directory tree of pages on a dedicated worker pool.
///
/// Every page is an independent task: it decodes, segments and exports on
/// one worker, and its failure is recorded in the manifest without touching
/// sibling pages.
pub struct BatchRunner {
    segmenter: Arc<Segmenter>,
    pool: rayon::ThreadPool,
    options: BatchOptions,
}

impl BatchRunner {
    /// Fails with [`PanelError::InvalidConfig`] before any page is read.
    pub fn new(config: SegmentationConfig, options: BatchOptions) -> Result<Self> {
        let segmenter = Segmenter::builder().with_config(config).build()?;
        Self::with_segmenter(segmenter, options)
    }

    pub fn with_segmenter(segmenter: Segmenter, options: BatchOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .thread_name(|index| format!("panelcut-worker-{index}"))
            .build()?;

        Ok(Self {
            segmenter: Arc::new(segmenter),
            pool,
            options,
        })
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    #[tracing::instrument(skip_all, fields(input = %input_root.display(), output = %output_root.display()))]
    pub fn run(&self, input_root: &Path, output_root: &Path) -> Result<BatchManifest> {
        let pages = discover_pages(input_root)?;
        info!(pages = pages.len(), workers = self.pool.current_num_threads(), "starting batch");

        let reports: Vec<PageReport> = self.pool.install(|| {
            pages
                .par_iter()
                .map(|page| self.process_page(page, input_root, output_root))
                .collect()
        });

        let manifest = BatchManifest {
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            pages: reports,
        };
        info!(completed = manifest.completed(), failed = manifest.failed(), "batch finished");

        if self.options.write_manifest {
            fs::create_dir_all(output_root).map_err(|source| PanelError::Write {
                path: output_root.to_path_buf(),
                source,
            })?;
            manifest.save(&output_root.join(MANIFEST_FILE))?;
        }

        Ok(manifest)
    }

    fn process_page(&self, page: &Path, input_root: &Path, output_root: &Path) -> PageReport {
        let started = Instant::now();
        let deadline = self
            .options
            .page_timeout
            .map_or_else(Deadline::unbounded, Deadline::after);

        let status = match self.segment_and_export(page, input_root, output_root, &deadline) {
            Ok((regions, outputs)) => PageStatus::Completed { regions, outputs },
            Err(err) => {
                warn!(page = %page.display(), kind = err.kind(), "page failed: {err}");
                PageStatus::from_error(&err)
            }
        };

        PageReport {
            page: page.to_path_buf(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            status,
        }
    }

    fn segment_and_export(
        &self,
        page: &Path,
        input_root: &Path,
        output_root: &Path,
        deadline: &Deadline,
    ) -> Result<(RegionList, Vec<PathBuf>)> {
        let image = load_page(page)?;
        let segmentation = self.segmenter.segment_image(&image, deadline)?;
        // Nothing is written for a page that ran out of time
        deadline.check()?;

        let dir = output_dir_for(page, input_root, output_root);
        let outputs = export_regions(&image, &segmentation.regions, &dir)?;
        Ok((segmentation.regions, outputs))
    }
}
