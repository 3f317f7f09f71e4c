use anyhow::{Context, Result};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Colour layout of an image as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Grayscale,
    Indexed,
    Direct,
}

/// Single-channel grayscale as reported by the decoder.
/// Palette images are expanded before this point and need [`is_indexed`].
pub fn is_grayscale(color_type: ExtendedColorType) -> bool {
    matches!(
        color_type,
        ExtendedColorType::L1
            | ExtendedColorType::L2
            | ExtendedColorType::L4
            | ExtendedColorType::L8
            | ExtendedColorType::L16
    )
}

/// Palette storage, read from the PNG IHDR or the BMP bit count
pub fn is_indexed(path: &Path, format: ImageFormat) -> Result<bool> {
    match format {
        ImageFormat::Png => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open image: {}", path.display()))?;
            let reader = png::Decoder::new(BufReader::new(file))
                .read_info()
                .with_context(|| format!("Failed to read PNG header: {}", path.display()))?;
            Ok(reader.info().color_type == png::ColorType::Indexed)
        }
        ImageFormat::Bmp => Ok(bmp_bits_per_pixel(path)? <= 8),
        _ => Ok(false),
    }
}

/// Bits per pixel from the BMP info header (core header or later)
fn bmp_bits_per_pixel(path: &Path) -> Result<u16> {
    let mut header = [0u8; 30];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .with_context(|| format!("Failed to read BMP header: {}", path.display()))?;

    let dib_size = u32::from_le_bytes([header[14], header[15], header[16], header[17]]);
    let offset = if dib_size == 12 { 24 } else { 28 };
    Ok(u16::from_le_bytes([header[offset], header[offset + 1]]))
}

/// Classify an image file by the layout it is stored in
pub fn detect_color_mode(
    path: &Path,
    format: ImageFormat,
    color_type: ExtendedColorType,
) -> Result<ColorMode> {
    if is_grayscale(color_type) {
        return Ok(ColorMode::Grayscale);
    }
    if is_indexed(path, format)? {
        return Ok(ColorMode::Indexed);
    }
    Ok(ColorMode::Direct)
}

/// Rewrite a grayscale or palette image in place with an alpha-capable layout.
/// Returns whether the file was rewritten.
pub fn normalize_file(path: &Path) -> Result<bool> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    let format = reader
        .format()
        .ok_or_else(|| anyhow::anyhow!("Unknown image format: {}", path.display()))?;

    let decoder = reader
        .into_decoder()
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    if detect_color_mode(path, format, decoder.original_color_type())? == ColorMode::Direct {
        return Ok(false);
    }

    let img = DynamicImage::from_decoder(decoder)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;

    // JPEG has no alpha channel
    let converted = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        DynamicImage::ImageRgba8(img.to_rgba8())
    };
    converted
        .save_with_format(path, format)
        .with_context(|| format!("Failed to overwrite image: {}", path.display()))?;

    Ok(true)
}

/// Normalize every file in `files`, stopping at the first failure
pub fn normalize_alpha(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut rewritten = Vec::new();
    for path in files {
        if normalize_file(path)? {
            rewritten.push(path.clone());
        }
    }
    Ok(rewritten)
}
