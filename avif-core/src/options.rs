//! Validated conversion options.
//!
//! Options are only constructible through [`ConvertOptions::new`], which
//! rejects out-of-range values before any conversion work starts.

use thiserror::Error;

/// Encoder quality used when the caller does not supply one.
pub const DEFAULT_QUALITY: u8 = 60;

/// Rejected option values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(u8),

    #[error("width must be at least 1")]
    ZeroWidth,

    #[error("height must be at least 1")]
    ZeroHeight,
}

/// Per-conversion knobs: quality, lossless mode, and optional target size.
///
/// `lossless` overrides `quality` entirely. Width and height are targets for
/// the resize step; when only one is present the other is derived from the
/// source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    quality: u8,
    lossless: bool,
    width: Option<u32>,
    height: Option<u32>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            lossless: false,
            width: None,
            height: None,
        }
    }
}

impl ConvertOptions {
    /// Build validated options. `quality` defaults to [`DEFAULT_QUALITY`]
    /// and must fall in 1..=100; width and height must be non-zero when
    /// supplied.
    pub fn new(
        quality: Option<u8>,
        lossless: bool,
        width: Option<u32>,
        height: Option<u32>,
    ) -> std::result::Result<Self, OptionsError> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(1..=100).contains(&quality) {
            return Err(OptionsError::QualityOutOfRange(quality));
        }
        if width == Some(0) {
            return Err(OptionsError::ZeroWidth);
        }
        if height == Some(0) {
            return Err(OptionsError::ZeroHeight);
        }

        Ok(Self {
            quality,
            lossless,
            width,
            height,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn lossless(&self) -> bool {
        self.lossless
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Target dimensions for a source image, or `None` when no resize was
    /// requested.
    ///
    /// Both dimensions given: taken exactly, ignoring the source aspect
    /// ratio. One given: the other is derived by scaling the source
    /// proportionally, truncating the fractional part.
    pub(crate) fn target_dimensions(&self, src_w: u32, src_h: u32) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (None, None) => None,
            (Some(width), Some(height)) => Some((width, height)),
            (Some(width), None) => {
                let height = (src_h as f64 * (width as f64 / src_w as f64)) as u32;
                Some((width, height))
            }
            (None, Some(height)) => {
                let width = (src_w as f64 * (height as f64 / src_h as f64)) as u32;
                Some((width, height))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConvertOptions, DEFAULT_QUALITY, OptionsError};

    #[test]
    fn defaults_apply_when_nothing_is_supplied() {
        let options = ConvertOptions::new(None, false, None, None).expect("valid options");
        assert_eq!(options.quality(), DEFAULT_QUALITY);
        assert!(!options.lossless());
        assert_eq!(options.width(), None);
        assert_eq!(options.height(), None);
    }

    #[test]
    fn quality_bounds_are_enforced() {
        assert_eq!(
            ConvertOptions::new(Some(0), false, None, None),
            Err(OptionsError::QualityOutOfRange(0))
        );
        assert_eq!(
            ConvertOptions::new(Some(101), false, None, None),
            Err(OptionsError::QualityOutOfRange(101))
        );
        assert!(ConvertOptions::new(Some(1), false, None, None).is_ok());
        assert!(ConvertOptions::new(Some(100), false, None, None).is_ok());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            ConvertOptions::new(None, false, Some(0), None),
            Err(OptionsError::ZeroWidth)
        );
        assert_eq!(
            ConvertOptions::new(None, false, None, Some(0)),
            Err(OptionsError::ZeroHeight)
        );
    }

    #[test]
    fn no_resize_without_targets() {
        let options = ConvertOptions::default();
        assert_eq!(options.target_dimensions(800, 600), None);
    }

    #[test]
    fn both_dimensions_ignore_aspect_ratio() {
        let options = ConvertOptions::new(None, false, Some(32), Some(32)).expect("valid options");
        assert_eq!(options.target_dimensions(800, 600), Some((32, 32)));
    }

    #[test]
    fn missing_height_is_derived_proportionally() {
        let options = ConvertOptions::new(None, false, Some(400), None).expect("valid options");
        assert_eq!(options.target_dimensions(800, 600), Some((400, 300)));
    }

    #[test]
    fn missing_width_is_derived_proportionally() {
        let options = ConvertOptions::new(None, false, None, Some(300)).expect("valid options");
        assert_eq!(options.target_dimensions(800, 600), Some((400, 300)));
    }

    #[test]
    fn derived_dimension_truncates_fractional_part() {
        // 67 * 50 / 101 = 33.16..
        let options = ConvertOptions::new(None, false, Some(50), None).expect("valid options");
        assert_eq!(options.target_dimensions(101, 67), Some((50, 33)));
    }

    #[test]
    fn derived_dimension_can_collapse_to_zero() {
        // 60 * 1 / 80 = 0.75 -> 0; the conversion step rejects it.
        let options = ConvertOptions::new(None, false, Some(1), None).expect("valid options");
        assert_eq!(options.target_dimensions(80, 60), Some((1, 0)));
    }
}
