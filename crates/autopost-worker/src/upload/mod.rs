//! Upload records and the uploader state machine
//!
//! `Pending` records wait for review, `Queued` records are delivered on the
//! next drain, and `Complete`, `Failed` and `Skipped` are terminal.

mod deliver;
mod record;
mod uploader;

pub use record::UploadRecord;
pub use uploader::{Uploader, UploaderConfig};
