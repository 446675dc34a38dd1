use thiserror::Error;

/// Failure modes of the conversion pipeline.
///
/// Every variant carries the underlying codec message. Conversion never
/// retries and never produces partial output; callers map variants to
/// transport-level statuses at their own boundary.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("AVIF encode failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
