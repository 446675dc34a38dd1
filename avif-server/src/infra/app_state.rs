use std::{fmt, sync::Arc};

use crate::infra::config::Config;

/// Shared per-process state, cloned into every handler.
///
/// Nothing here is mutable: configuration is fixed at startup and the
/// reqwest client is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: reqwest::Client,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // Per-request timeouts are applied at the call site; the client
        // itself only fixes the redirect policy.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config: Arc::new(config),
            http_client,
        }
    }
}
