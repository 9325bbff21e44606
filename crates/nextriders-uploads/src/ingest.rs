//! Batch ingestion: compress a listing's uploads and store them in order.
//!
//! Compression runs in parallel across uploads on the rayon pool. Nothing is
//! written until every upload in the batch has compressed, so a single
//! unreadable file rejects the batch without touching the disk. If a write
//! fails midway, the files this batch already wrote are removed again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use nextriders_media::{compress, CompressedImage, CompressionPolicy};
use rayon::prelude::*;

use crate::store::{image_file_name, public_url, ListingStore};
use crate::IngestError;

/// One uploaded file, as received.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name, used only for logging and errors.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an upload from disk.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let bytes = fs::read(path).map_err(|e| IngestError::io(path, e))?;
        Ok(Self::new(path.display().to_string(), bytes))
    }
}

/// A stored photo.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub index: usize,
    pub path: PathBuf,
    /// Public URL path, e.g. `/uploads/<listing_id>/0.jpg`.
    pub url: String,
    /// Name of the upload this photo came from.
    pub source_name: String,
    /// Stored size in bytes.
    pub bytes: usize,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    /// False when the ceiling could not be met and a best-effort file was stored.
    pub within_budget: bool,
}

/// Store the photos of a new listing, numbered from zero.
pub fn create_listing_images(
    store: &ListingStore,
    listing_id: &str,
    uploads: &[Upload],
    policy: &CompressionPolicy,
) -> Result<Vec<StoredImage>, IngestError> {
    ingest(store, listing_id, 0, uploads, policy)
}

/// Append photos to an existing listing, continuing its numbering.
pub fn add_listing_images(
    store: &ListingStore,
    listing_id: &str,
    uploads: &[Upload],
    policy: &CompressionPolicy,
) -> Result<Vec<StoredImage>, IngestError> {
    let start_index = store.next_image_index(listing_id)?;
    ingest(store, listing_id, start_index, uploads, policy)
}

/// Compress `uploads` and write them as `<start_index + i>.jpg`.
///
/// Over-budget results are stored and logged, never rejected.
pub fn ingest(
    store: &ListingStore,
    listing_id: &str,
    start_index: usize,
    uploads: &[Upload],
    policy: &CompressionPolicy,
) -> Result<Vec<StoredImage>, IngestError> {
    let dir = store.listing_dir(listing_id)?;
    policy.validate()?;

    let compressed = uploads
        .par_iter()
        .map(|upload| {
            compress(&upload.bytes, policy).map_err(|source| IngestError::Upload {
                name: upload.name.clone(),
                source,
            })
        })
        .collect::<Result<Vec<CompressedImage>, IngestError>>()?;

    if compressed.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(&dir).map_err(|e| IngestError::io(&dir, e))?;

    let mut stored = Vec::with_capacity(compressed.len());
    for (offset, (upload, image)) in uploads.iter().zip(compressed).enumerate() {
        let index = start_index + offset;
        let path = dir.join(image_file_name(index));

        if !image.within_budget() {
            warn!(
                "{}: stored {} bytes, over the {} byte ceiling",
                upload.name,
                image.len(),
                image.max_bytes()
            );
        }

        if let Err(e) = fs::write(&path, image.data()) {
            discard_written(&stored, &path);
            return Err(IngestError::io(&path, e));
        }
        info!(
            "{} -> {} ({} bytes, quality {}, {}x{}, {} encodes)",
            upload.name,
            path.display(),
            image.len(),
            image.quality,
            image.width,
            image.height,
            image.attempts.len()
        );

        stored.push(StoredImage {
            index,
            url: public_url(listing_id, index),
            path,
            source_name: upload.name.clone(),
            bytes: image.len(),
            quality: image.quality,
            width: image.width,
            height: image.height,
            within_budget: image.within_budget(),
        });
    }

    Ok(stored)
}

/// Roll back a partially written batch, including the file that failed.
fn discard_written(stored: &[StoredImage], failed: &Path) {
    let paths = stored.iter().map(|image| image.path.as_path()).chain([failed]);
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("could not remove {} after failed batch: {}", path.display(), e);
            }
        }
    }
}
