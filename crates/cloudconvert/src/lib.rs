//! CloudConvert REST client library.
//!
//! Provides typed job/task descriptors, an HTTP API wrapper, the
//! cancellable status poller, and [`relay::ConversionRelay`], which drives
//! a whole import → convert → export job for one uploaded file.

pub mod api;
pub mod error;
pub mod job;
pub mod poller;
pub mod relay;

pub use error::ConversionError;
