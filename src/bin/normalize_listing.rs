#![forbid(unsafe_code)]

//! Reads raw list entries as JSON, normalizes them and prints the resulting
//! view models. Handy for checking what a list would display for a captured
//! proxy or scraper response.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viewtube_listing::{
    CanonicalVideo, Normalizer,
    config::{DEFAULT_CONFIG_PATH, load_listing_settings_from},
    links::{BackendPreference, ThumbnailPreference, thumbnail_url},
    publish::TemplateLocalizer,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Normalize ViewTube list entries.")]
struct Cli {
    #[arg(
        value_name = "INPUT",
        help = "JSON file with one record or an array of records (default: stdin)"
    )]
    input: Option<PathBuf>,
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Path to the settings file"
    )]
    config: PathBuf,
    #[arg(
        long = "backend",
        value_name = "NAME",
        help = "Backend preference; \"invidious\" uses the proxy instance for thumbnails"
    )]
    backend: Option<String>,
    #[arg(
        long = "thumbnails",
        value_name = "PREF",
        help = "Thumbnail preference: start, middle, end or default"
    )]
    thumbnails: Option<String>,
    #[arg(
        long = "invidious-instance",
        value_name = "URL",
        help = "Override the proxy instance base URL"
    )]
    invidious_instance: Option<String>,
    #[arg(long = "pretty", help = "Pretty-print the JSON output")]
    pretty: bool,
}

#[derive(Serialize)]
struct ListingOutput {
    #[serde(flatten)]
    video: CanonicalVideo,
    thumbnail: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "viewtube_listing=info,normalize_listing=info".into()
        })))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = load_listing_settings_from(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    if let Some(backend) = cli.backend.as_deref() {
        settings.backend = BackendPreference::from_setting(backend);
    }
    if let Some(thumbnails) = cli.thumbnails.as_deref() {
        settings.thumbnails = ThumbnailPreference::from_setting(thumbnails);
    }
    if let Some(instance) = cli.invidious_instance {
        settings.invidious_instance = instance.trim_end_matches('/').to_string();
    }

    let records = read_records(cli.input.as_deref())?;
    info!(count = records.len(), "normalizing list entries");

    let normalizer = Normalizer::new(Arc::new(TemplateLocalizer::new()), settings.strings.clone())
        .with_local_upload_placeholder(settings.local_upload_placeholder);

    let mut entries: Vec<_> = records
        .iter()
        .map(|record| normalizer.present(record))
        .collect();

    let mut output = Vec::with_capacity(entries.len());
    for entry in &mut entries {
        let video = entry.settle().await;
        let thumbnail = thumbnail_url(
            &video.id,
            settings.backend,
            settings.thumbnails,
            &settings.invidious_instance,
        );
        output.push(ListingOutput { video, thumbnail });
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let written = if cli.pretty {
        serde_json::to_writer_pretty(&mut handle, &output)
    } else {
        serde_json::to_writer(&mut handle, &output)
    };
    written.context("writing normalized entries")?;
    writeln!(handle)?;
    Ok(())
}

/// Accepts a single record or an array of records.
fn read_records(input: Option<&Path>) -> Result<Vec<Value>> {
    let mut raw = String::new();
    match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            BufReader::new(file)
                .read_to_string(&mut raw)
                .with_context(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin()
                .read_to_string(&mut raw)
                .context("reading records from stdin")?;
        }
    }

    let parsed: Value = serde_json::from_str(&raw).context("parsing records JSON")?;
    Ok(match parsed {
        Value::Array(records) => records,
        record => vec![record],
    })
}
