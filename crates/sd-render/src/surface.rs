//! Canvas surface abstraction.
//!
//! Mask editing only needs to stamp circles with a compositing mode, read
//! the result back as an image and load a bitmap. `CanvasSurface` captures
//! exactly that, so the mask algorithm runs on any 2D backend; the raster
//! implementation below is backed by an `image::RgbaImage`.

use crate::codec::{RasterError, decode_image, encode_png};
use image::{Rgba, RgbaImage};
use sd_core::model::Color;

/// How a brush stamp combines with existing pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Composite {
    /// Paint `color` over the existing pixels (`source-over`).
    SourceOver(Color),
    /// Remove existing coverage under the stamp (`destination-out`).
    DestinationOut,
}

/// Serialized bitmap state of a surface, used for mask history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait CanvasSurface {
    fn dimensions(&self) -> (u32, u32);

    /// Stamp a filled circle. Coordinates are bitmap pixels.
    fn draw_circle(&mut self, center: (f32, f32), radius: f32, mode: Composite);

    /// Encode the current contents as PNG bytes.
    fn to_image(&self) -> Result<Vec<u8>, RasterError>;

    /// Replace the contents (and size) with a decoded image. On failure the
    /// surface is left unchanged.
    fn load_image(&mut self, bytes: &[u8]) -> Result<(), RasterError>;

    fn snapshot(&self) -> Snapshot;

    fn restore(&mut self, snapshot: &Snapshot);
}

/// Software surface over an RGBA bitmap (straight alpha).
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl CanvasSurface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, mode: Composite) {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || radius <= 0.0 {
            return;
        }
        let (cx, cy) = center;
        let reach = radius + 1.0;
        let x0 = (cx - reach).floor().max(0.0) as u32;
        let y0 = (cy - reach).floor().max(0.0) as u32;
        let x1 = ((cx + reach).ceil().max(0.0) as u32).min(w);
        let y1 = ((cy + reach).ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                // one-pixel soft edge
                let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let px = self.image.get_pixel_mut(x, y);
                    *px = composite_pixel(*px, mode, coverage);
                }
            }
        }
    }

    fn to_image(&self) -> Result<Vec<u8>, RasterError> {
        encode_png(&self.image)
    }

    fn load_image(&mut self, bytes: &[u8]) -> Result<(), RasterError> {
        self.image = decode_image(bytes)?;
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.image.width(),
            height: self.image.height(),
            pixels: self.image.as_raw().clone(),
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        match RgbaImage::from_raw(snapshot.width, snapshot.height, snapshot.pixels.clone()) {
            Some(img) => self.image = img,
            None => log::warn!(
                "ignoring malformed snapshot {}x{} ({} bytes)",
                snapshot.width,
                snapshot.height,
                snapshot.pixels.len()
            ),
        }
    }
}

/// Combine one pixel with a brush stamp of the given coverage.
pub fn composite_pixel(dst: Rgba<u8>, mode: Composite, coverage: f32) -> Rgba<u8> {
    let [dr, dg, db, da] = dst.0.map(|c| c as f32 / 255.0);
    match mode {
        Composite::DestinationOut => {
            let a = da * (1.0 - coverage);
            Rgba([dst[0], dst[1], dst[2], to_u8(a)])
        }
        Composite::SourceOver(color) => {
            let sa = color.a * coverage;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                return Rgba([0, 0, 0, 0]);
            }
            let blend = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
            Rgba([
                to_u8(blend(color.r, dr)),
                to_u8(blend(color.g, dg)),
                to_u8(blend(color.b, db)),
                to_u8(out_a),
            ])
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
