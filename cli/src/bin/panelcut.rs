use clap::{Parser, Subcommand};
use cli::{BatchJob, load_config};
use color_eyre::eyre::{Result, eyre};
use panelcut::{
    BatchManifest, BatchOptions, BatchRunner, Deadline, PageStatus, Segmenter, SegmentationConfig,
    export_regions, load_page, output_dir_for,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a single page and export its regions
    Segment {
        /// Path to the page image
        #[arg(short, long)]
        input: PathBuf,
        /// Directory the crops are written under
        #[arg(short, long, required_unless_present = "json")]
        output_dir: Option<PathBuf>,
        /// Segmentation config file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the region list as JSON instead of exporting crops
        #[arg(long)]
        json: bool,
    },
    /// Segment every page under a directory
    Batch {
        /// Root directory of page images
        #[arg(short, long)]
        input: PathBuf,
        /// Directory the crops and manifest are written under
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Worker threads (0 for one per core)
        #[arg(short, long, default_value = "0")]
        workers: usize,
        /// Per-page time budget in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Segmentation config file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a batch described by a job file
    Process {
        /// Path to the TOML or JSON job file
        #[arg(short, long)]
        job: PathBuf,
    },
    /// Print the JSON schema of job files
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Segment { input, output_dir, config, json } => {
            segment_page(input, output_dir.as_deref(), config.as_deref(), *json)?;
        }
        Commands::Batch { input, output_dir, workers, timeout_secs, config } => {
            let options = BatchOptions {
                workers: *workers,
                page_timeout: timeout_secs.map(Duration::from_secs),
                write_manifest: true,
            };
            run_batch(read_config(config.as_deref())?, options, input, output_dir)?;
        }
        Commands::Process { job } => {
            let job = BatchJob::from_file(job)?;
            info!("Job: {:?}", job);
            let options = job.batch_options();
            run_batch(job.segmentation, options, &job.input, &job.output_dir)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&BatchJob::schema())?);
        }
    }

    Ok(())
}

fn read_config(path: Option<&Path>) -> Result<SegmentationConfig> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(SegmentationConfig::default()),
    }
}

fn segment_page(input: &Path, output_dir: Option<&Path>, config: Option<&Path>, json: bool) -> Result<()> {
    let segmenter = Segmenter::builder()
        .with_config(read_config(config)?)
        .build()?;
    info!("{}", segmenter.info());

    let page = load_page(input)?;
    let segmentation = segmenter.segment_image(&page, &Deadline::unbounded())?;
    info!(
        "Found {} panels and {} gutters in {:?}",
        segmentation.panels.len(),
        segmentation.gutters.len(),
        input
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&segmentation.regions)?);
        return Ok(());
    }

    let output_dir = output_dir.ok_or_else(|| eyre!("--output-dir is required unless --json is given"))?;
    let dir = output_dir_for(input, input, output_dir);
    for path in export_regions(&page, &segmentation.regions, &dir)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_batch(
    config: SegmentationConfig,
    options: BatchOptions,
    input: &Path,
    output_dir: &Path,
) -> Result<()> {
    let runner = BatchRunner::new(config, options)?;
    let manifest = runner.run(input, output_dir)?;
    print_summary(&manifest);

    if manifest.failed() > 0 {
        return Err(eyre!("{} of {} pages failed", manifest.failed(), manifest.pages.len()));
    }

    info!("✅ Segmented {} pages", manifest.completed());
    Ok(())
}

fn print_summary(manifest: &BatchManifest) {
    for report in &manifest.pages {
        match &report.status {
            PageStatus::Completed { regions, .. } => {
                println!("ok     {} ({} regions, {} ms)", report.page.display(), regions.len(), report.elapsed_ms);
            }
            PageStatus::Failed { kind, message } => {
                warn!("{}: {}", report.page.display(), message);
                println!("failed {} ({kind})", report.page.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_json_needs_no_output_dir() {
        let cli = Cli::try_parse_from(["panelcut", "segment", "--input", "page.png", "--json"])
            .expect("should parse");
        match cli.command {
            Commands::Segment { output_dir, json, .. } => {
                assert!(json);
                assert_eq!(output_dir, None);
            }
            _ => panic!("expected the segment subcommand"),
        }
    }

    #[test]
    fn test_segment_export_requires_output_dir() {
        assert!(Cli::try_parse_from(["panelcut", "segment", "--input", "page.png"]).is_err());

        let cli = Cli::try_parse_from(["panelcut", "segment", "-i", "page.png", "-o", "out"])
            .expect("should parse");
        match cli.command {
            Commands::Segment { output_dir, .. } => assert_eq!(output_dir, Some(PathBuf::from("out"))),
            _ => panic!("expected the segment subcommand"),
        }
    }
}
