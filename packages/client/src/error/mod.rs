//! Error types for resolution, failover and transport

mod classification;
pub(crate) mod constructors;
mod types;

pub use types::{Error, Kind, Result};
