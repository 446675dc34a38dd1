use axum::{
    body::Body,
    extract::{Multipart, Query},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use tracing::info;

use avif_core::{ConvertOptions, to_avif};

use crate::infra::errors::{AppError, AppResult};

/// Content types accepted for uploads, as declared on the multipart part.
pub(crate) const ACCEPTED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Attachment base name used when the upload carries no filename.
pub(crate) const DEFAULT_BASENAME: &str = "image";

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    quality: Option<u8>,
    lossless: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
}

impl ConvertParams {
    fn validate(&self) -> AppResult<ConvertOptions> {
        validated_options(self.quality, self.lossless, self.width, self.height)
    }
}

/// Loosely-deserialized query values checked into [`ConvertOptions`];
/// violations are input rejections, reported before any conversion work.
pub(crate) fn validated_options(
    quality: Option<u8>,
    lossless: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
) -> AppResult<ConvertOptions> {
    ConvertOptions::new(quality, lossless.unwrap_or(false), width, height)
        .map_err(|err| AppError::bad_request(err.to_string()))
}

/// POST /convert - multipart upload returned as an AVIF attachment.
pub async fn convert_upload_handler(
    Query(params): Query<ConvertParams>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let options = params.validate()?;

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err(AppError::bad_request("multipart field 'file' is required"));
            }
            Err(err) => {
                return Err(AppError::internal(format!(
                    "failed to read upload: {err}"
                )));
            }
        }
    };

    // Declared type is checked before the part body is read.
    let content_type = field
        .content_type()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(AppError::unsupported_media_type(
            "Only JPEG/JPG/PNG/WEBP are accepted.",
        ));
    }

    let base_name = match field.file_name() {
        Some(file_name) => file_stem(file_name),
        None => DEFAULT_BASENAME.to_string(),
    };

    let data = field
        .bytes()
        .await
        .map_err(|err| AppError::internal(format!("failed to read upload: {err}")))?;

    info!(
        bytes = data.len(),
        content_type = %content_type,
        "converting uploaded image"
    );

    let avif = run_conversion(data.to_vec(), options).await?;
    Ok(avif_attachment_response(avif, &base_name))
}

/// Conversion is synchronous CPU-bound work; run it on the blocking pool so
/// it never stalls the async workers.
pub(crate) async fn run_conversion(data: Vec<u8>, options: ConvertOptions) -> AppResult<Vec<u8>> {
    let avif = tokio::task::spawn_blocking(move || to_avif(&data, &options))
        .await
        .map_err(|err| AppError::internal(format!("conversion task failed to join: {err}")))??;

    Ok(avif)
}

pub(crate) fn avif_attachment_response(avif: Vec<u8>, base_name: &str) -> Response {
    // A filename that cannot form a valid header value falls back to the
    // default attachment name.
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{base_name}.avif\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"image.avif\""));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/avif")
        .header(header::CONTENT_LENGTH, avif.len().to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(avif))
        .unwrap()
}

/// Uploaded base name with the final extension stripped; `a.b.png` keeps
/// `a.b`, an extensionless name is kept whole.
fn file_stem(file_name: &str) -> String {
    if file_name.is_empty() {
        return DEFAULT_BASENAME.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{file_stem, validated_options};
    use axum::http::StatusCode;

    #[test]
    fn file_stem_strips_only_the_final_extension() {
        assert_eq!(file_stem("photo.png"), "photo");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(""), "image");
    }

    #[test]
    fn out_of_range_options_are_input_rejections() {
        let err = validated_options(Some(0), None, None, None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = validated_options(None, None, Some(0), None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
