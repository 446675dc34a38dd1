use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{
        convert::convert_upload_handler, fetch::convert_url_handler,
        status::service_status_handler,
    },
    infra::{app_state::AppState, config::CorsConfig},
};

/// Assemble the service router.
///
/// Layer order (outer to inner): CORS, tracing, body limit.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.cors);
    let max_body_bytes = state.config.limits.max_body_bytes;

    Router::new()
        .route("/", get(service_status_handler))
        .route("/convert", post(convert_upload_handler))
        .route("/convert-url", post(convert_url_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configuration.
///
/// tower-http rejects the literal `*` together with credentials, so the
/// wildcard-with-credentials default mirrors the request instead.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.is_wildcard() {
        if config.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::any()
        }
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    let wildcard_methods = config.allowed_methods.iter().any(|method| method == "*");
    let allow_methods = if wildcard_methods {
        AllowMethods::mirror_request()
    } else {
        AllowMethods::list(
            config
                .allowed_methods
                .iter()
                .filter_map(|method| Method::from_bytes(method.as_bytes()).ok()),
        )
    };

    let wildcard_headers = config.allowed_headers.iter().any(|header| header == "*");
    let allow_headers = if wildcard_headers {
        AllowHeaders::mirror_request()
    } else {
        AllowHeaders::list(
            config
                .allowed_headers
                .iter()
                .filter_map(|header| HeaderName::from_bytes(header.as_bytes()).ok()),
        )
    };

    let mut layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(allow_headers);

    if config.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}
