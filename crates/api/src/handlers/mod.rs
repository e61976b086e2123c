//! Request handlers.
//!
//! Handlers stage uploads, delegate to the conversion relay in
//! `AppState`, and map failures via [`AppError`](crate::error::AppError).

pub mod convert;
