use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use nextriders_media::CompressionPolicy;
use nextriders_uploads::{add_listing_images, create_listing_images, ListingStore, Upload};

/// Compress listing photo uploads into `<root>/<listing-id>/<index>.jpg`.
#[derive(Parser, Debug)]
#[command(name = "nextriders-uploads", version)]
#[command(about = "Compress listing photos to size-capped JPEGs and store them by index")]
struct Args {
    /// Listing the photos belong to
    listing_id: String,

    /// Uploaded image files, in display order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory holding one subdirectory per listing
    #[arg(long, default_value = "uploads")]
    root: PathBuf,

    /// Continue numbering after the listing's existing photos
    #[arg(long)]
    append: bool,

    /// JSON file with compression policy fields; missing fields keep defaults
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Byte ceiling for each stored photo
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Maximum long edge in pixels
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Apply EXIF orientation before compressing
    #[arg(long)]
    auto_orient: bool,

    /// Log every encode attempt
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let policy = build_policy(&args)?;
    let store = ListingStore::new(&args.root);

    let uploads = args
        .files
        .iter()
        .map(|path| Upload::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;

    let result = if args.append {
        add_listing_images(&store, &args.listing_id, &uploads, &policy)
    } else {
        create_listing_images(&store, &args.listing_id, &uploads, &policy)
    };
    let stored = result
        .with_context(|| format!("failed to store photos for listing {}", args.listing_id))?;

    for image in &stored {
        let marker = if image.within_budget { "" } else { " (over budget)" };
        println!(
            "{}\t{}\t{} bytes\tq{}\t{}x{}{}",
            image.url, image.source_name, image.bytes, image.quality, image.width, image.height, marker
        );
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Policy from file (if any), then command-line overrides.
fn build_policy(args: &Args) -> Result<CompressionPolicy> {
    let mut policy = match &args.policy {
        Some(path) => load_policy(path)?,
        None => CompressionPolicy::default(),
    };

    if let Some(max_bytes) = args.max_bytes {
        policy.max_bytes = max_bytes;
    }
    if let Some(max_dimension) = args.max_dimension {
        policy.max_dimension = max_dimension;
    }
    if args.auto_orient {
        policy.auto_orient = true;
    }

    policy.validate().context("invalid compression policy")?;
    Ok(policy)
}

fn load_policy(path: &Path) -> Result<CompressionPolicy> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse policy file {}", path.display()))
}
