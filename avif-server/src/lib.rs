//! HTTP surface for the AVIF conversion service.
//!
//! Two conversion endpoints (multipart upload and remote-URL fetch) sit on
//! top of the [`avif_core`] pipeline, plus a liveness endpoint at the root.
//! Requests are stateless; the only shared state is the immutable
//! configuration and a reqwest client.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
};
pub use routes::create_app;
