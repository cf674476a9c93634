//! CLI entry point for the workshop utility.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use workshop_core::list_file::expand_inputs;
use workshop_core::{
    DEFAULT_POOL_CAPACITY, DownloadRequest, FetchRequest, GenerateRequest, HttpTimeouts, Pipeline,
    PipelineConfig, StageStats,
};

mod app_config;
mod cli;

use app_config::{FileConfig, load_file_config};
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?;
    debug!(?file_config, "config file loaded");

    let config = build_pipeline_config(&args, &file_config);
    let pipeline = Pipeline::new(config).context("Failed to set up pipeline")?;

    info!(mode = args.command.label(), "workshop-util starting");

    match args.command {
        Command::Fetch { path, pages, .. } => run_fetch(&pipeline, path, pages).await,
        Command::Generate {
            path,
            app_id,
            download,
            inputs,
        } => {
            let request = GenerateRequest {
                references: expand_inputs(&inputs).await,
                app_id: app_id.or(file_config.app_id),
                output: path,
                download_dir: download,
            };
            run_generate(&pipeline, request).await
        }
        Command::Download { path, inputs } => {
            let download_dir = path
                .or(file_config.download_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let request = DownloadRequest {
                addresses: expand_inputs(&inputs).await,
                download_dir,
            };
            let report = pipeline.download(request).await?;
            print_summary("download", report.stats);
            Ok(())
        }
    }
}

/// Merges CLI flags over file values over built-in defaults.
fn build_pipeline_config(args: &Args, file: &FileConfig) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let item_selector = match &args.command {
        Command::Fetch {
            selector: Some(selector),
            ..
        } => selector.clone(),
        _ => defaults.item_selector,
    };

    PipelineConfig {
        concurrency: args
            .concurrency
            .or(file.concurrency)
            .map_or(DEFAULT_POOL_CAPACITY, usize::from),
        lookup_url: args
            .lookup_url
            .clone()
            .or_else(|| file.lookup_url.clone())
            .unwrap_or(defaults.lookup_url),
        item_selector,
        timeouts: HttpTimeouts::from_secs(file.connect_timeout_secs, file.read_timeout_secs),
        verbose: args.verbose > 0,
    }
}

async fn run_fetch(pipeline: &Pipeline, output: Option<PathBuf>, pages: Vec<String>) -> Result<()> {
    let echo = output.is_none();
    let report = pipeline.fetch(FetchRequest { pages, output }).await?;

    if echo {
        for reference in &report.references {
            println!("{reference}");
        }
    }
    print_summary("fetch", report.pages);
    Ok(())
}

async fn run_generate(pipeline: &Pipeline, request: GenerateRequest) -> Result<()> {
    let echo = request.output.is_none();
    let report = pipeline.generate(request).await?;

    if echo {
        for target in report.targets() {
            println!("{target}");
        }
    }
    print_summary("generate", report.resolve);
    if let Some(download) = &report.download {
        print_summary("download", download.stats);
    }
    Ok(())
}

fn print_summary(stage: &str, stats: StageStats) {
    println!("{stage}: {stats}");
}
