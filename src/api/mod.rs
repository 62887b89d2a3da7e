//! REST API module for the granary service.
//!
//! Mirrors the ingestion and browsing boundary: grant submission with
//! per-item outcomes, tag-filtered listing, taxonomy listing, expansion
//! preview, health and metrics.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
