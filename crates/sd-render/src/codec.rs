//! Image payload codec: bytes ⇄ bitmaps ⇄ `data:` URLs.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Image encode failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Not an inline image: {0}")]
    NotInline(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image has no pixels")]
    Empty,
}

/// Decode any supported format (PNG, JPEG) to RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RasterError> {
    let img = image::load_from_memory(bytes).map_err(RasterError::Decode)?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(RasterError::Empty);
    }
    Ok(rgba)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .map_err(RasterError::Encode)?;
    Ok(out.into_inner())
}

/// Wrap PNG bytes as `data:image/png;base64,…`.
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Wrap arbitrary image bytes with the MIME type sniffed from the content.
pub fn data_url_for(bytes: &[u8]) -> String {
    let mime = match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => "image/png",
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Extract the raw bytes of a base64 `data:` URL.
pub fn data_url_bytes(src: &str) -> Result<Vec<u8>, RasterError> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| RasterError::NotInline(truncate(src)))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RasterError::NotInline(truncate(src)))?;
    if !meta.ends_with(";base64") {
        return Err(RasterError::NotInline(truncate(src)));
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Decode an inline `src` into a bitmap.
pub fn decode_src(src: &str) -> Result<RgbaImage, RasterError> {
    decode_image(&data_url_bytes(src)?)
}

fn truncate(src: &str) -> String {
    src.chars().take(48).collect()
}
