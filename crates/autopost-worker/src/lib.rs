//! Autopost worker
//!
//! Everything that runs in the background:
//! - [`Uploader`]: the upload record collection and its state machine
//! - [`DirectoryScanner`]: incremental discovery of new screenshots
//! - [`WatcherSupervisor`]: one scanner task per watched directory, restarted
//!   wholesale on configuration change

pub mod error;
pub mod scanner;
pub mod supervisor;
pub mod upload;

pub use error::ScanError;
pub use scanner::DirectoryScanner;
pub use supervisor::WatcherSupervisor;
pub use upload::{UploadRecord, Uploader, UploaderConfig};
