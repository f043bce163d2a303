//! Cover-fit resizing of captured screenshots.
//!
//! The source is scaled until it covers the target box, then cropped from the
//! top edge (centred horizontally). Tall full-page captures therefore keep
//! their header visible whatever the target aspect ratio is.

use crate::{CaptureError, OutputFormat, Result, Size};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder};

/// Resize encoded image bytes to exactly `target` and re-encode as `format`.
///
/// `quality` only applies to JPEG and is clamped to 1-100.
pub fn resize_image(data: &[u8], target: Size, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    if target.width == 0 || target.height == 0 {
        return Err(CaptureError::Resize(format!("invalid target size {target}")));
    }

    let source = image::load_from_memory(data)?;
    let covered = cover_top(&source, target);
    encode(&covered, format, quality)
}

fn cover_top(source: &DynamicImage, target: Size) -> DynamicImage {
    let (src_w, src_h) = (source.width() as f64, source.height() as f64);
    let scale = f64::max(target.width as f64 / src_w, target.height as f64 / src_h);

    // Rounding up can only overshoot, so the crop below always fits.
    let width = ((src_w * scale).ceil() as u32).max(target.width);
    let height = ((src_h * scale).ceil() as u32).max(target.height);

    let scaled = if (width, height) == (source.width(), source.height()) {
        source.clone()
    } else {
        source.resize_exact(width, height, FilterType::Lanczos3)
    };

    let x = (width - target.width) / 2;
    scaled.crop_imm(x, 0, target.width, target.height)
}

fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Png => {
            let rgba = image.to_rgba8();
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)?;
        }
        OutputFormat::Jpeg => {
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn png_bytes(image: RgbaImage) -> Vec<u8> {
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    /// Top half red, bottom half blue.
    fn tall_page(width: u32, height: u32) -> Vec<u8> {
        png_bytes(RgbaImage::from_fn(width, height, |_, y| {
            if y < height / 2 { RED } else { BLUE }
        }))
    }

    fn decode(data: &[u8]) -> DynamicImage {
        image::load_from_memory(data).unwrap()
    }

    #[test]
    fn test_exact_output_dimensions() {
        let source = tall_page(375, 1200);
        for target in [
            Size::new(300, 200),
            Size::new(1200, 630),
            Size::new(1080, 1920),
            Size::new(200, 150),
            Size::new(1, 1),
        ] {
            let out = decode(&resize_image(&source, target, OutputFormat::Png, 90).unwrap());
            assert_eq!((out.width(), out.height()), (target.width, target.height), "{target}");
        }
    }

    #[test]
    fn test_top_of_page_is_kept() {
        let source = tall_page(100, 400);
        let out = decode(&resize_image(&source, Size::new(100, 100), OutputFormat::Png, 90).unwrap());
        let out = out.to_rgba8();

        // The kept window is the top quarter, which is entirely red.
        for y in [0, 50, 99] {
            let px = out.get_pixel(50, y);
            assert!(px[0] > 200 && px[2] < 50, "row {y}: {px:?}");
        }
    }

    #[test]
    fn test_wide_source_is_centred() {
        // Green band on the far left, white elsewhere.
        let source = png_bytes(RgbaImage::from_fn(400, 100, |x, _| {
            if x < 100 { GREEN } else { WHITE }
        }));
        let out = decode(&resize_image(&source, Size::new(100, 100), OutputFormat::Png, 90).unwrap());
        let out = out.to_rgba8();

        for x in [0, 50, 99] {
            let px = out.get_pixel(x, 50);
            assert!(px[0] > 200 && px[1] > 200 && px[2] > 200, "col {x}: {px:?}");
        }
    }

    #[test]
    fn test_upscales_small_source() {
        let source = tall_page(50, 40);
        let out = decode(&resize_image(&source, Size::new(800, 400), OutputFormat::Png, 90).unwrap());
        assert_eq!((out.width(), out.height()), (800, 400));
    }

    #[test]
    fn test_png_signature() {
        let out = resize_image(&tall_page(64, 64), Size::new(32, 32), OutputFormat::Png, 90).unwrap();
        assert_eq!(&out[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_jpeg_output_and_quality() {
        let source = tall_page(200, 400);
        let high = resize_image(&source, Size::new(100, 100), OutputFormat::Jpeg, 100).unwrap();
        let low = resize_image(&source, Size::new(100, 100), OutputFormat::Jpeg, 0).unwrap();

        assert_eq!(&high[..2], &[0xFF, 0xD8]);
        assert_eq!(&low[..2], &[0xFF, 0xD8]);
        assert!(low.len() <= high.len());

        let decoded = decode(&high);
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn test_invalid_input() {
        let err = resize_image(b"definitely not an image", Size::new(10, 10), OutputFormat::Png, 90)
            .unwrap_err();
        assert!(matches!(err, CaptureError::Resize(_)));

        let err = resize_image(&tall_page(10, 10), Size::new(0, 10), OutputFormat::Png, 90)
            .unwrap_err();
        assert!(matches!(err, CaptureError::Resize(_)));
    }
}
