// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ocrprep — decode an image, normalise its pixels for OCR and report its
// resolution.
//
// Entry point. Initialises logging, layers configuration, runs the
// preparation pipeline and prints a text or JSON report.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use ocrprep_core::config::{MetadataPolicy, PrepConfig};
use ocrprep_core::error::Result;
use ocrprep_core::types::{ImageFileFormat, image_file_format};
use ocrprep_image::{decode_file, prepare};

#[derive(Debug, Parser)]
#[command(name = "ocrprep")]
#[command(about = "Prepare images for OCR: canonical pixel buffers and resolution metadata")]
#[command(version)]
struct Cli {
    /// Image file to prepare
    path: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resolution assumed for axes the image does not describe
    #[arg(long)]
    default_dpi: Option<u32>,

    /// Substitute the default resolution for malformed metadata values
    #[arg(long)]
    lenient: bool,

    /// Write the prepared pixel buffer to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Include the metadata tree in the report
    #[arg(long)]
    dump_metadata: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// What `ocrprep` reports about one image.
#[derive(Debug, Serialize)]
struct Report {
    path: PathBuf,
    format_tag: String,
    detected_format: &'static str,
    width: u32,
    height: u32,
    channels: usize,
    bytes_per_line: usize,
    buffer_len: usize,
    dpi_x: u32,
    dpi_y: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "ocrprep starting");

    match run(&cli).and_then(|report| print_report(&report, cli.json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Preparation failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Configuration file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<PrepConfig> {
    let mut config = match &cli.config {
        Some(path) => PrepConfig::from_json_file(path)?,
        None => PrepConfig::default(),
    };
    if let Some(dpi) = cli.default_dpi {
        config.default_dpi = dpi;
    }
    if cli.lenient {
        config.metadata_policy = MetadataPolicy::Lenient;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<Report> {
    let config = resolve_config(cli)?;
    let decoded = decode_file(&cli.path)?;
    let prepared = prepare(&decoded.raster, decoded.metadata.as_ref(), &config)?;

    if let Some(output) = &cli.output {
        std::fs::write(output, prepared.buffer.as_bytes())?;
        tracing::info!(
            path = %output.display(),
            len = prepared.buffer.len(),
            "Pixel buffer written"
        );
    }

    Ok(Report {
        path: cli.path.clone(),
        format_tag: image_file_format(&cli.path),
        detected_format: detected_format(&cli.path, decoded.format).tag(),
        width: prepared.buffer.width(),
        height: prepared.buffer.height(),
        channels: prepared.buffer.channels(),
        bytes_per_line: prepared.buffer.bytes_per_line(),
        buffer_len: prepared.buffer.len(),
        dpi_x: prepared.resolution.dpi_x,
        dpi_y: prepared.resolution.dpi_y,
        metadata: cli
            .dump_metadata
            .then(|| decoded.metadata.as_ref().map(|tree| tree.to_json()))
            .flatten(),
    })
}

/// The codec's format, or the file extension's when the codec's has no
/// dedicated tag.
fn detected_format(path: &Path, decoded: ImageFileFormat) -> ImageFileFormat {
    if decoded != ImageFileFormat::Other {
        return decoded;
    }
    path.extension()
        .map(|ext| ImageFileFormat::from_extension(&ext.to_string_lossy()))
        .unwrap_or(ImageFileFormat::Other)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("File: {}", report.path.display());
    println!("Format: {} (detected {})", report.format_tag, report.detected_format);
    println!("Dimensions: {}x{}", report.width, report.height);
    println!("Channels: {}", report.channels);
    println!("Buffer: {} bytes ({} per line)", report.buffer_len, report.bytes_per_line);
    println!("Resolution: {}x{} dpi", report.dpi_x, report.dpi_y);
    if let Some(metadata) = &report.metadata {
        println!("Metadata: {}", serde_json::to_string_pretty(metadata)?);
    }
    Ok(())
}
