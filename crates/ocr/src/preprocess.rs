use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_DIMENSION: u32 = 1024;
pub const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageIssue {
    #[error("Please upload a valid image file (JPEG, PNG, or WebP)")]
    UnsupportedFormat,
    #[error("Image file size must be less than 10MB")]
    TooLarge(usize),
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Invalid image: {}", join_issues(.0))]
    Invalid(Vec<ImageIssue>),
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

fn join_issues(issues: &[ImageIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Checks the sniffed format and the byte size, reporting every problem found.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, Vec<ImageIssue>> {
    let mut issues = Vec::new();

    let format = match image::guess_format(data) {
        Ok(f @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Some(f),
        _ => None,
    };
    if format.is_none() {
        issues.push(ImageIssue::UnsupportedFormat);
    }
    if data.len() > MAX_IMAGE_BYTES {
        issues.push(ImageIssue::TooLarge(data.len()));
    }

    match format {
        Some(f) if issues.is_empty() => Ok(f),
        _ => Err(issues),
    }
}

/// Fit inside `MAX_DIMENSION` square, keeping aspect ratio. Smaller images
/// are left at their size.
fn fit(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, image::imageops::FilterType::Triangle)
    } else {
        img
    }
}

/// Decode, downscale and re-encode as JPEG for upload.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = fit(image::load_from_memory(data)?);
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Validation followed by compression.
pub fn prepare_for_upload(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    validate_image(data).map_err(PreprocessError::Invalid)?;
    compress(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img: RgbaImage = ImageBuffer::from_fn(width, height, |x, _| Rgba([(x % 255) as u8, 40, 90, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn png_is_accepted() {
        assert_eq!(validate_image(&png(4, 4)), Ok(ImageFormat::Png));
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert_eq!(
            validate_image(b"%PDF-1.4 not an image"),
            Err(vec![ImageIssue::UnsupportedFormat])
        );
    }

    #[test]
    fn oversize_and_wrong_type_are_both_reported() {
        let data = vec![0u8; MAX_IMAGE_BYTES + 1];
        let issues = validate_image(&data).unwrap_err();
        assert_eq!(
            issues,
            vec![ImageIssue::UnsupportedFormat, ImageIssue::TooLarge(MAX_IMAGE_BYTES + 1)]
        );
    }

    #[test]
    fn compress_downscales_and_emits_jpeg() {
        let out = compress(&png(2048, 1024)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (1024, 512));
    }

    #[test]
    fn small_image_keeps_its_size() {
        let img = image::load_from_memory(&compress(&png(30, 20)).unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (30, 20));
    }

    #[test]
    fn prepare_rejects_before_decoding() {
        let err = prepare_for_upload(b"GIF89a....").unwrap_err();
        assert!(matches!(err, PreprocessError::Invalid(ref v) if v == &[ImageIssue::UnsupportedFormat]));
        assert!(err.to_string().contains("JPEG, PNG, or WebP"));
    }
}
