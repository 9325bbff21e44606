//! On-disk layout of listing photos: `<root>/<listing_id>/<index>.jpg`.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::info;

use crate::IngestError;

/// Extension of every stored photo; the compressor only emits JPEG.
pub const IMAGE_EXTENSION: &str = "jpg";

/// URL prefix under which stored photos are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Root directory holding one subdirectory per listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingStore {
    root: PathBuf,
}

impl ListingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the photos of one listing.
    pub fn listing_dir(&self, listing_id: &str) -> Result<PathBuf, IngestError> {
        validate_listing_id(listing_id)?;
        Ok(self.root.join(listing_id))
    }

    /// Path of the photo at `index` within a listing.
    pub fn image_path(&self, listing_id: &str, index: usize) -> Result<PathBuf, IngestError> {
        Ok(self.listing_dir(listing_id)?.join(image_file_name(index)))
    }

    /// Index the next added photo should take: one past the highest
    /// `<n>.jpg` already stored, or zero for a new listing.
    ///
    /// For a listing numbered without gaps this equals the photo count.
    pub fn next_image_index(&self, listing_id: &str) -> Result<usize, IngestError> {
        let dir = self.listing_dir(listing_id)?;
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&dir).map_err(|e| IngestError::io(&dir, e))?;
        let mut next = 0;
        for entry in entries {
            let entry = entry.map_err(|e| IngestError::io(&dir, e))?;
            if let Some(index) = parse_image_index(&entry.file_name().to_string_lossy()) {
                next = next.max(index + 1);
            }
        }
        Ok(next)
    }

    /// Path of a stored photo, checked to exist.
    ///
    /// `file_name` must be a plain name such as `0.jpg`; anything that could
    /// resolve outside the listing directory is refused.
    pub fn existing_image(
        &self,
        listing_id: &str,
        file_name: &str,
    ) -> Result<PathBuf, IngestError> {
        let dir = self.listing_dir(listing_id)?;
        if !is_plain_file_name(file_name) {
            return Err(IngestError::InvalidFileName(file_name.to_string()));
        }

        let path = dir.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(IngestError::ImageNotFound {
                listing_id: listing_id.to_string(),
                file_name: file_name.to_string(),
            })
        }
    }

    /// Delete a listing's directory and every photo in it.
    ///
    /// Returns `false` when the listing had no directory.
    pub fn remove_listing(&self, listing_id: &str) -> Result<bool, IngestError> {
        let dir = self.listing_dir(listing_id)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!("removed listing directory {}", dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(IngestError::io(&dir, e)),
        }
    }
}

/// File name of the photo at `index`.
pub fn image_file_name(index: usize) -> String {
    format!("{index}.{IMAGE_EXTENSION}")
}

/// Public URL path of the photo at `index`.
pub fn public_url(listing_id: &str, index: usize) -> String {
    format!("{PUBLIC_PREFIX}/{listing_id}/{}", image_file_name(index))
}

fn parse_image_index(file_name: &str) -> Option<usize> {
    let stem = file_name.strip_suffix(IMAGE_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

fn is_plain_file_name(file_name: &str) -> bool {
    if file_name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name.to_str() == Some(file_name)
    )
}

/// A listing id must be a single, ordinary path component.
fn validate_listing_id(listing_id: &str) -> Result<(), IngestError> {
    let valid = !listing_id.is_empty()
        && listing_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(IngestError::InvalidListingId(listing_id.to_string()))
    }
}
