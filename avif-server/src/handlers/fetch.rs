use std::{ops::RangeInclusive, time::Duration};

use axum::{
    extract::{Query, State},
    http::header,
    response::Response,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    handlers::convert::{
        ACCEPTED_CONTENT_TYPES, DEFAULT_BASENAME, avif_attachment_response, run_conversion,
        validated_options,
    },
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
};

const DEFAULT_TIMEOUT_SECS: f64 = 20.0;
const TIMEOUT_RANGE_SECS: RangeInclusive<f64> = 1.0..=60.0;

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    url: String,
    quality: Option<u8>,
    lossless: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
    timeout: Option<f64>,
}

/// POST /convert-url - fetch a remote image and return it as an AVIF
/// attachment. The fetch is the only operation bounded by the timeout;
/// conversion runs unbounded afterwards.
pub async fn convert_url_handler(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> AppResult<Response> {
    let options = validated_options(params.quality, params.lossless, params.width, params.height)?;

    if !has_http_scheme(&params.url) {
        return Err(AppError::bad_request("Invalid URL."));
    }

    let timeout = params.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if !TIMEOUT_RANGE_SECS.contains(&timeout) {
        return Err(AppError::bad_request(format!(
            "timeout must be between {} and {} seconds, got {timeout}",
            TIMEOUT_RANGE_SECS.start(),
            TIMEOUT_RANGE_SECS.end(),
        )));
    }

    let response = state
        .http_client
        .get(&params.url)
        .timeout(Duration::from_secs_f64(timeout))
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| AppError::bad_gateway(format!("Fetch failed: {err}")))?;

    // The remote content type is read but never enforced; a mismatch is
    // still handed to the decoder.
    if let Some(content_type) = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ACCEPTED_CONTENT_TYPES.contains(&media_type.as_str()) {
            warn!(
                content_type = %media_type,
                "fetched resource does not declare a supported image type; attempting conversion anyway"
            );
        }
    }

    let data = response
        .bytes()
        .await
        .map_err(|err| AppError::bad_gateway(format!("Fetch failed: {err}")))?;

    let max_body_bytes = state.config.limits.max_body_bytes;
    if data.len() > max_body_bytes {
        return Err(AppError::payload_too_large(format!(
            "fetched body of {} bytes exceeds the configured limit of {max_body_bytes} bytes",
            data.len(),
        )));
    }

    info!(url = %params.url, bytes = data.len(), "converting fetched image");

    let avif = run_conversion(data.to_vec(), options).await?;
    Ok(avif_attachment_response(avif, DEFAULT_BASENAME))
}

/// Pure textual scheme check; everything else about the URL is left to the
/// HTTP client.
fn has_http_scheme(url: &str) -> bool {
    let head = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}
