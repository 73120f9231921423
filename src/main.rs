use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use s2_acquire::acquire::{run_acquisition, AcquisitionOutcome};
use s2_acquire::aoi;
use s2_acquire::cdse::{authenticate, CdseClient};
use s2_acquire::config::RunConfig;
use s2_acquire::selection::{IndexList, InteractivePrompt, SelectAll, SelectionSource};

#[derive(Parser, Debug)]
#[command(
    name = "s2-acquire",
    about = "Search and download Sentinel-2 imagery from the Copernicus Data Space"
)]
struct Cli {
    /// Path to the run configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Download every candidate without prompting
    #[arg(long, conflicts_with = "select")]
    all: bool,

    /// Comma-separated product numbers, e.g. "1,3" (skips the prompt)
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = RunConfig::read(&cli.config)?;
    if let Some(output_dir) = cli.output_dir {
        config.download.output_dir = output_dir;
    }

    let aoi_wkt = aoi::load_aoi(&config.paths.aoi_path)?;
    let http = reqwest::Client::new();
    let token = authenticate(&http, &config.credentials()).await?;
    let client = CdseClient::new(http, token);

    let selector: Box<dyn SelectionSource> = if cli.all {
        Box::new(SelectAll)
    } else if let Some(indices) = cli.select {
        Box::new(IndexList::new(indices))
    } else {
        Box::new(InteractivePrompt)
    };

    let criteria = config.criteria(aoi_wkt);
    let outcome = run_acquisition(
        &client,
        &client,
        selector.as_ref(),
        &criteria,
        &config.download,
    )
    .await?;

    match outcome {
        AcquisitionOutcome::NoProducts => {
            println!("No products found for the given AOI/date range.");
        }
        AcquisitionOutcome::NothingSelected => {
            println!("Nothing selected; no downloads.");
        }
        AcquisitionOutcome::Downloaded(outcomes) => {
            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(result) => println!(
                        "Downloaded: {} ({} bytes)",
                        result.path.display(),
                        result.bytes_written
                    ),
                    Err(err) => {
                        failed += 1;
                        eprintln!("Failed: {}: {}", outcome.product_name, err);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} download(s) failed", failed, outcomes.len());
            }
        }
    }

    Ok(())
}
