//! Upload Module
//!
//! Single-request file uploads for the branding editor:
//! - Content sniffing against a MIME allow-list
//! - Size limit
//! - Random file names with a MIME-derived extension
//!
//! Flow:
//! 1. Editor posts a multipart form with a `file` field
//! 2. Server sniffs the content type and checks the size
//! 3. File is written under the upload directory
//! 4. Server answers with the public URL of the stored file

pub mod sniff;
pub mod store;
pub mod types;

pub use sniff::{describe_mime, sniff_mime};
pub use store::{StoredUpload, UploadStore};
pub use types::*;
