//! Winzaap core domain logic.
//!
//! Pure, I/O-free building blocks shared by the provider client and the
//! HTTP server: the conversion task graph, upload naming, and the poll
//! backoff policy.

pub mod error;
pub mod naming;
pub mod pipeline;
pub mod polling;
