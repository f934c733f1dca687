//! HTTP client for the study backend
//!
//! Every endpoint is a plain request/response call: no retries, no backoff
//! and no cancellation. Records are mirrored one-to-one from the backend's
//! JSON responses.

mod client;
mod error;
mod types;

pub use client::{ApiClient, Upload, QUOTA_MESSAGE};
pub use error::ApiError;
pub use types::*;
