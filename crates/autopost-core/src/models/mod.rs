//! Data models for the application
//!
//! Each sub-module represents a specific feature area.

mod log;
mod upload;

pub use log::*;
pub use upload::*;
