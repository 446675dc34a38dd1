//! Decode → normalize → resize → encode pipeline.

use std::io::Cursor;

use image::{DynamicImage, codecs::avif::AvifEncoder, imageops::FilterType};
use tracing::debug;

use crate::{
    error::{ConvertError, Result},
    options::ConvertOptions,
};

/// rav1e speed preset used for every encode.
const ENCODE_SPEED: u8 = 6;

/// Quality 100 maps to rav1e's quantizer 0, its lossless path.
const LOSSLESS_QUALITY: u8 = 100;

/// Convert raw JPEG/PNG/WEBP bytes into AVIF bytes.
///
/// The input format is sniffed from magic bytes. Any decode, resize, or
/// encode failure is terminal; there is no partial output.
pub fn to_avif(data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    let decoded =
        image::load_from_memory(data).map_err(|err| ConvertError::Decode(err.to_string()))?;

    let mut image = normalize_color_mode(decoded);

    if let Some((width, height)) = options.target_dimensions(image.width(), image.height()) {
        if width == 0 || height == 0 {
            return Err(ConvertError::Resize(format!(
                "target dimensions must be non-zero, got {width}x{height}"
            )));
        }
        debug!(width, height, "resizing decoded image");
        image = image.resize_exact(width, height, FilterType::Lanczos3);
    }

    encode_avif(&image, options)
}

/// Only `Rgb8` and `Rgba8` survive unchanged; every other decoded mode
/// (gray, gray+alpha, 16-bit depths) converts to `Rgba8`, which keeps
/// transparency intact. Palette PNGs arrive already expanded by the decoder.
fn normalize_color_mode(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    }
}

fn encode_avif(image: &DynamicImage, options: &ConvertOptions) -> Result<Vec<u8>> {
    let quality = if options.lossless() {
        LOSSLESS_QUALITY
    } else {
        options.quality()
    };

    let mut out = Cursor::new(Vec::new());
    let encoder = AvifEncoder::new_with_speed_quality(&mut out, ENCODE_SPEED, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|err| ConvertError::Encode(err.to_string()))?;

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::to_avif;
    use crate::{error::ConvertError, options::ConvertOptions};
    use image::{DynamicImage, GrayAlphaImage, ImageFormat, LumaA, Rgb, RgbImage};
    use std::io::Cursor;

    fn rgb_gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode png fixture");
        out.into_inner()
    }

    fn parse_avif(bytes: &[u8]) -> avif_parse::AvifData {
        avif_parse::read_avif(&mut Cursor::new(bytes)).expect("parse avif output")
    }

    fn avif_dimensions(avif: &avif_parse::AvifData) -> (u32, u32) {
        let meta = avif.primary_item_metadata().expect("avif metadata");
        (meta.max_frame_width.get(), meta.max_frame_height.get())
    }

    #[test]
    fn rgb_source_stays_three_channel() {
        let png = png_bytes(&rgb_gradient(80, 60));

        let encoded = to_avif(&png, &ConvertOptions::default()).expect("convert rgb png");

        let avif = parse_avif(&encoded);
        assert_eq!(avif_dimensions(&avif), (80, 60));
        assert!(
            avif.alpha_item.is_none(),
            "rgb source must not gain an alpha item"
        );
    }

    #[test]
    fn gray_alpha_source_normalizes_to_rgba() {
        let image = DynamicImage::ImageLumaA8(GrayAlphaImage::from_fn(64, 48, |x, _| {
            LumaA([(x % 256) as u8, (x * 4 % 256) as u8])
        }));
        let png = png_bytes(&image);

        let encoded = to_avif(&png, &ConvertOptions::default()).expect("convert gray+alpha png");

        let avif = parse_avif(&encoded);
        assert_eq!(avif_dimensions(&avif), (64, 48));
        assert!(
            avif.alpha_item.is_some(),
            "normalized rgba output must carry an alpha item"
        );
    }

    #[test]
    fn width_only_derives_height_from_aspect_ratio() {
        let png = png_bytes(&rgb_gradient(80, 60));
        let options = ConvertOptions::new(None, false, Some(40), None).expect("valid options");

        let encoded = to_avif(&png, &options).expect("convert with width only");

        assert_eq!(avif_dimensions(&parse_avif(&encoded)), (40, 30));
    }

    #[test]
    fn height_only_derives_width_from_aspect_ratio() {
        let png = png_bytes(&rgb_gradient(80, 60));
        let options = ConvertOptions::new(None, false, None, Some(30)).expect("valid options");

        let encoded = to_avif(&png, &options).expect("convert with height only");

        assert_eq!(avif_dimensions(&parse_avif(&encoded)), (40, 30));
    }

    #[test]
    fn both_dimensions_override_aspect_ratio() {
        let png = png_bytes(&rgb_gradient(80, 60));
        let options = ConvertOptions::new(None, false, Some(32), Some(32)).expect("valid options");

        let encoded = to_avif(&png, &options).expect("convert with both dimensions");

        assert_eq!(avif_dimensions(&parse_avif(&encoded)), (32, 32));
    }

    #[test]
    fn lossless_output_is_invariant_under_quality() {
        let png = png_bytes(&rgb_gradient(64, 48));
        let low = ConvertOptions::new(Some(10), true, None, None).expect("valid options");
        let high = ConvertOptions::new(Some(90), true, None, None).expect("valid options");

        let encoded_low = to_avif(&png, &low).expect("lossless convert at quality 10");
        let encoded_high = to_avif(&png, &high).expect("lossless convert at quality 90");

        assert_eq!(
            encoded_low, encoded_high,
            "quality must not influence lossless output"
        );
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        let result = to_avif(b"definitely not an image", &ConvertOptions::default());
        assert!(matches!(result, Err(ConvertError::Decode(_))));
    }

    #[test]
    fn collapsed_target_dimension_is_a_resize_error() {
        let png = png_bytes(&rgb_gradient(80, 60));
        let options = ConvertOptions::new(None, false, Some(1), None).expect("valid options");

        let result = to_avif(&png, &options);
        assert!(matches!(result, Err(ConvertError::Resize(_))));
    }
}
