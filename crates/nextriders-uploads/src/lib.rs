//! NextRiders Uploads - listing photo ingestion
//!
//! Sits where the listing-creation and add-images handlers call into
//! `nextriders-media`: it compresses every uploaded file in a batch and lays
//! the results out as `<root>/<listing_id>/<index>.jpg`.
//!
//! # Module Structure
//!
//! - `store` - On-disk layout and listing id validation
//! - `ingest` - Parallel batch compression and writing
//! - `error` - Ingestion error type

mod error;
pub mod ingest;
pub mod store;

pub use error::IngestError;
pub use ingest::{add_listing_images, create_listing_images, ingest, StoredImage, Upload};
pub use store::{public_url, ListingStore};

