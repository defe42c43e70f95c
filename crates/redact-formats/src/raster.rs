//! Image adapter.
//!
//! Words are found by OCR on a half-size grayscale copy, judged one at a
//! time and covered with opaque black boxes on the original image. Judging a
//! single word gives the recognizer almost no context, so recall and
//! precision are far below document-level redaction.

use crate::adapter::{AdapterOutcome, DocumentKind, FormatAdapter};
use crate::ocr::OcrEngine;
use image::imageops::FilterType;
use image::{
    ColorType, DynamicImage, ImageBuffer, ImageError, ImageFormat, Luma, LumaA, Pixel, Rgb, Rgba,
};
use redact_core::fs::write_atomic_with;
use redact_core::{BoundingBox, RedactError, RedactionLevel, Result};
use redact_engine::{labels_for_level, RedactionContext};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// The OCR pass runs at `1 / OCR_SCALE` of the original size.
const OCR_SCALE: u32 = 2;

/// Redacts raster images by painting over recognized words.
pub struct ImageAdapter {
    context: RedactionContext,
    ocr: Arc<dyn OcrEngine>,
    min_confidence: f32,
}

impl ImageAdapter {
    /// Create the adapter. Words at or below `min_confidence` are skipped.
    #[must_use]
    pub fn new(context: RedactionContext, ocr: Arc<dyn OcrEngine>, min_confidence: f32) -> Self {
        Self {
            context,
            ocr,
            min_confidence,
        }
    }

    /// Boxes to paint, in original image coordinates.
    fn boxes_to_redact(
        &self,
        image: &DynamicImage,
        level: RedactionLevel,
    ) -> Result<(usize, Vec<BoundingBox>)> {
        let small = image
            .resize_exact(
                (image.width() / OCR_SCALE).max(1),
                (image.height() / OCR_SCALE).max(1),
                FilterType::Triangle,
            )
            .grayscale();

        let tokens = self.ocr.recognize_words(&small)?;
        let labels = labels_for_level(level);
        let mut boxes = Vec::new();
        let mut considered = 0;

        for token in tokens.iter().filter(|t| t.confidence > self.min_confidence) {
            considered += 1;
            let redact = if level == RedactionLevel::Advanced {
                true
            } else {
                let detections = self.context.redactor().detect(&token.text)?;
                detections
                    .first()
                    .is_some_and(|d| labels.contains(&d.label))
            };

            if redact {
                boxes.push(token.bounding_box.scaled(OCR_SCALE));
            }
        }

        tracing::debug!(
            ocr = self.ocr.name(),
            words = tokens.len(),
            considered,
            boxes = boxes.len(),
            "image words judged"
        );
        Ok((considered, boxes))
    }
}

fn decode_error(path: &Path, err: ImageError) -> RedactError {
    match err {
        ImageError::IoError(e) => RedactError::Io(e),
        _ => RedactError::UnidentifiedImage {
            path: path.to_path_buf(),
        },
    }
}

/// Fill `bbox` with `color`, edges inclusive, clipped to the image.
fn fill_box<P: Pixel>(buffer: &mut ImageBuffer<P, Vec<P::Subpixel>>, bbox: BoundingBox, color: P) {
    let (width, height) = buffer.dimensions();
    if bbox.x >= width || bbox.y >= height {
        return;
    }

    let right = bbox.x.saturating_add(bbox.width).min(width - 1);
    let bottom = bbox.y.saturating_add(bbox.height).min(height - 1);
    for y in bbox.y..=bottom {
        for x in bbox.x..=right {
            buffer.put_pixel(x, y, color);
        }
    }
}

/// Pixel layout `format` can store, keeping `image` as it is when possible.
fn storable(image: DynamicImage, format: ImageFormat) -> DynamicImage {
    let color = image.color();
    let supported = match format {
        ImageFormat::Png => matches!(
            color,
            ColorType::L8
                | ColorType::La8
                | ColorType::Rgb8
                | ColorType::Rgba8
                | ColorType::L16
                | ColorType::La16
                | ColorType::Rgb16
                | ColorType::Rgba16
        ),
        ImageFormat::Tiff => matches!(
            color,
            ColorType::L8
                | ColorType::Rgb8
                | ColorType::Rgba8
                | ColorType::L16
                | ColorType::Rgb16
                | ColorType::Rgba16
        ),
        ImageFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
        _ => matches!(color, ColorType::Rgb8 | ColorType::Rgba8),
    };

    if supported {
        image
    } else if format == ImageFormat::Jpeg {
        if color.has_color() {
            DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            DynamicImage::ImageLuma8(image.to_luma8())
        }
    } else if color.has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

fn painted<P: Pixel>(
    mut buffer: ImageBuffer<P, Vec<P::Subpixel>>,
    boxes: &[BoundingBox],
    color: P,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    for bbox in boxes {
        fill_box(&mut buffer, *bbox, color);
    }
    buffer
}

/// Paint opaque black boxes in the image's own pixel format, converting only
/// when the target format cannot store it.
fn paint(image: DynamicImage, boxes: &[BoundingBox], format: ImageFormat) -> DynamicImage {
    match storable(image, format) {
        DynamicImage::ImageLuma8(b) => DynamicImage::ImageLuma8(painted(b, boxes, Luma([0]))),
        DynamicImage::ImageLumaA8(b) => {
            DynamicImage::ImageLumaA8(painted(b, boxes, LumaA([0, u8::MAX])))
        }
        DynamicImage::ImageRgb8(b) => DynamicImage::ImageRgb8(painted(b, boxes, Rgb([0, 0, 0]))),
        DynamicImage::ImageRgba8(b) => {
            DynamicImage::ImageRgba8(painted(b, boxes, Rgba([0, 0, 0, u8::MAX])))
        }
        DynamicImage::ImageLuma16(b) => DynamicImage::ImageLuma16(painted(b, boxes, Luma([0]))),
        DynamicImage::ImageLumaA16(b) => {
            DynamicImage::ImageLumaA16(painted(b, boxes, LumaA([0, u16::MAX])))
        }
        DynamicImage::ImageRgb16(b) => DynamicImage::ImageRgb16(painted(b, boxes, Rgb([0, 0, 0]))),
        DynamicImage::ImageRgba16(b) => {
            DynamicImage::ImageRgba16(painted(b, boxes, Rgba([0, 0, 0, u16::MAX])))
        }
        other => {
            DynamicImage::ImageRgba8(painted(other.to_rgba8(), boxes, Rgba([0, 0, 0, u8::MAX])))
        }
    }
}

impl FormatAdapter for ImageAdapter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    fn apply(&self, input: &Path, output: &Path, level: RedactionLevel) -> Result<AdapterOutcome> {
        let format = ImageFormat::from_path(output).map_err(|_| RedactError::UnsupportedFormat {
            path: output.to_path_buf(),
        })?;

        let image = image::open(input).map_err(|e| decode_error(input, e))?;
        let (considered, boxes) = self.boxes_to_redact(&image, level)?;
        let painted = paint(image, &boxes, format);

        write_atomic_with(output, |file| -> Result<()> {
            let mut writer = BufWriter::new(file);
            painted.write_to(&mut writer, format).map_err(|e| match e {
                ImageError::IoError(e) => RedactError::Io(e),
                other => RedactError::Io(io::Error::other(other)),
            })?;
            writer.flush()?;
            Ok(())
        })?;

        Ok(AdapterOutcome {
            units_processed: considered,
            units_redacted: boxes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn test_fill_box_is_inclusive_and_clipped() {
        let mut buffer = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        fill_box(&mut buffer, BoundingBox::new(2, 3, 2, 1), Rgb([0, 0, 0]));

        assert_eq!(buffer.get_pixel(2, 3), &Rgb([0, 0, 0]));
        assert_eq!(buffer.get_pixel(4, 4), &Rgb([0, 0, 0]));
        assert_eq!(buffer.get_pixel(5, 4), &Rgb([255, 255, 255]));
        assert_eq!(buffer.get_pixel(2, 5), &Rgb([255, 255, 255]));

        fill_box(&mut buffer, BoundingBox::new(8, 8, 50, 50), Rgb([0, 0, 0]));
        assert_eq!(buffer.get_pixel(9, 9), &Rgb([0, 0, 0]));

        fill_box(&mut buffer, BoundingBox::new(20, 20, 5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_paint_drops_alpha_for_jpeg() {
        let image = DynamicImage::new_rgba8(4, 4);
        assert!(paint(image.clone(), &[], ImageFormat::Png).color().has_alpha());
        assert!(!paint(image, &[], ImageFormat::Jpeg).color().has_alpha());
    }

    #[test]
    fn test_paint_keeps_pixel_format() {
        let bbox = [BoundingBox::new(1, 1, 1, 1)];

        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([200])));
        let out = paint(gray, &bbox, ImageFormat::Png);
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!(out.as_luma8().expect("luma8").get_pixel(2, 2), &Luma([0]));

        let deep = DynamicImage::new_rgb16(4, 4);
        assert_eq!(paint(deep.clone(), &bbox, ImageFormat::Png).color(), ColorType::Rgb16);
        assert_eq!(paint(deep, &bbox, ImageFormat::Jpeg).color(), ColorType::Rgb8);

        let gray_alpha = DynamicImage::new_luma_a16(4, 4);
        let out = paint(gray_alpha, &bbox, ImageFormat::Png);
        assert_eq!(out.color(), ColorType::La16);
        assert_eq!(
            out.as_luma_alpha16().expect("la16").get_pixel(1, 1),
            &LumaA([0, u16::MAX])
        );

        let gray_jpeg = DynamicImage::new_luma8(4, 4);
        assert_eq!(paint(gray_jpeg, &bbox, ImageFormat::Jpeg).color(), ColorType::L8);

        let bmp = DynamicImage::new_rgba16(4, 4);
        assert_eq!(paint(bmp, &bbox, ImageFormat::Bmp).color(), ColorType::Rgba8);
    }
}
