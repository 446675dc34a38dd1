//! Image-to-AVIF conversion pipeline.
//!
//! Decodes JPEG/PNG/WEBP bytes, normalizes the color mode so the encoder
//! only ever sees `Rgb8` or `Rgba8`, optionally resizes (aspect-preserving
//! when a single target dimension is given), and encodes AVIF via the
//! `image` crate's rav1e-backed encoder.
//!
//! The pipeline is synchronous, CPU-bound work. Callers running on an async
//! runtime are expected to offload [`to_avif`] to a blocking worker.

pub mod convert;
pub mod error;
pub mod options;

pub use convert::to_avif;
pub use error::{ConvertError, Result};
pub use options::{ConvertOptions, DEFAULT_QUALITY, OptionsError};
