//! Error types for upload ingestion.

use std::io;
use std::path::PathBuf;

use nextriders_media::{CompressError, PolicyError};
use thiserror::Error;

/// Errors raised while ingesting a batch of listing photos.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The listing id cannot be used as a directory name.
    #[error("invalid listing id {0:?}")]
    InvalidListingId(String),

    /// The requested file name is not a plain name inside the listing directory.
    #[error("invalid image file name {0:?}")]
    InvalidFileName(String),

    /// No stored photo under that name.
    #[error("image {file_name:?} not found for listing {listing_id:?}")]
    ImageNotFound {
        listing_id: String,
        file_name: String,
    },

    /// The compression policy is unusable; nothing was processed.
    #[error("invalid compression policy: {0}")]
    Policy(#[from] PolicyError),

    /// An upload could not be compressed. The whole batch is rejected.
    #[error("upload {name:?} could not be processed: {source}")]
    Upload {
        name: String,
        #[source]
        source: CompressError,
    },

    /// Reading or writing the listing directory failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure is the uploader's fault (bad file or id) rather
    /// than the server's.
    pub fn is_client_error(&self) -> bool {
        match self {
            IngestError::InvalidListingId(_)
            | IngestError::InvalidFileName(_)
            | IngestError::ImageNotFound { .. } => true,
            IngestError::Upload { source, .. } => matches!(source, CompressError::Decode(_)),
            IngestError::Policy(_) | IngestError::Io { .. } => false,
        }
    }
}
