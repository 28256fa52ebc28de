//! Image preprocessing for classifier input.
//!
//! Upload bytes → RGB image → EXIF orientation fix → 224×224 resize →
//! NHWC `f32` tensor with VGG16-style "caffe" normalization (RGB→BGR swap,
//! per-channel mean subtraction). The resize is exact, not aspect-preserving:
//! the network was trained on squashed 224×224 inputs.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

use super::ClassifierError;

/// Square input dimension of the lesion classifier.
pub const INPUT_SIZE: u32 = 224;

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// ImageNet channel means in BGR order, as used by VGG16 "caffe" preprocessing.
const VGG_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// Decode, orient, resize, and normalize upload bytes into a model tensor.
pub fn tensor_from_bytes(bytes: &[u8]) -> Result<Array4<f32>, ClassifierError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| ClassifierError::ImageDecode(e.to_string()))?;

    // Phone photos carry rotation in EXIF; without correction the lesion
    // crop the model sees is sideways.
    let img = apply_orientation(img, read_exif_orientation(bytes));

    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    Ok(tensor_from_rgb(&resized))
}

/// Bounds check on raw upload bytes.
fn validate_image_bytes(bytes: &[u8]) -> Result<(), ClassifierError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ClassifierError::ImageTooSmall);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ClassifierError::ImageTooLarge(bytes.len()));
    }
    Ok(())
}

/// Build the `[1, 224, 224, 3]` NHWC tensor with caffe normalization.
fn tensor_from_rgb(img: &RgbImage) -> Array4<f32> {
    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        // Channel order after the swap is BGR.
        tensor[[0, y, x, 0]] = b as f32 - VGG_MEAN_BGR[0];
        tensor[[0, y, x, 1]] = g as f32 - VGG_MEAN_BGR[1];
        tensor[[0, y, x, 2]] = r as f32 - VGG_MEAN_BGR[2];
    }

    tensor
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// EXIF orientation values:
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Encode a solid-color RGB image as PNG bytes (shared test fixture).
#[cfg(test)]
pub(crate) fn test_png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb(color));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG encoding");
    buf
}
