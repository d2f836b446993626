//! Crop selection.
//!
//! The crop widget is a pan/zoom view over the source image with a fixed
//! selection frame. `CropView` holds that interactive state and resolves it
//! to a `CropRegion` in source pixels.

use image::RgbaImage;
use image::imageops;

pub const MIN_CROP_ZOOM: f32 = 1.0;
pub const MAX_CROP_ZOOM: f32 = 3.0;

/// Selected rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Non-empty and fully inside a `width × height` image.
    pub fn is_valid_for(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Interactive pan/zoom state of the crop widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropView {
    /// Offset of the selection centre from the image centre, source pixels.
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
    /// Width / height of the selection frame; `None` is free-form.
    pub aspect: Option<f32>,
}

impl Default for CropView {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: MIN_CROP_ZOOM,
            aspect: Some(1.0),
        }
    }
}

impl CropView {
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_CROP_ZOOM, MAX_CROP_ZOOM);
    }

    /// Resolve the selection against an image of the given size. The frame
    /// is kept inside the image; `None` if it would be empty.
    pub fn region(&self, image_width: u32, image_height: u32) -> Option<CropRegion> {
        let (iw, ih) = (image_width as f32, image_height as f32);
        let (mut w, mut h) = match self.aspect {
            Some(a) if a > 0.0 => {
                let w = iw.min(ih * a);
                (w, w / a)
            }
            _ => (iw, ih),
        };
        let zoom = self.zoom.clamp(MIN_CROP_ZOOM, MAX_CROP_ZOOM);
        w /= zoom;
        h /= zoom;

        let cx = (iw / 2.0 + self.pan_x).clamp(w / 2.0, iw - w / 2.0);
        let cy = (ih / 2.0 + self.pan_y).clamp(h / 2.0, ih - h / 2.0);

        let width = w.floor() as u32;
        let height = h.floor() as u32;
        if width == 0 || height == 0 {
            return None;
        }
        let x = ((cx - w / 2.0).round().max(0.0) as u32).min(image_width - width);
        let y = ((cy - h / 2.0).round().max(0.0) as u32).min(image_height - height);
        Some(CropRegion {
            x,
            y,
            width,
            height,
        })
    }
}

/// Copy `region` out of `source`. `None` for an empty or out-of-bounds
/// region.
pub fn crop_image(source: &RgbaImage, region: CropRegion) -> Option<RgbaImage> {
    if !region.is_valid_for(source.width(), source.height()) {
        return None;
    }
    Some(imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn default_view_selects_centered_square() {
        let view = CropView::default();
        assert_eq!(
            view.region(200, 100),
            Some(CropRegion {
                x: 50,
                y: 0,
                width: 100,
                height: 100
            })
        );
    }

    #[test]
    fn zoom_shrinks_and_pan_is_clamped() {
        let mut view = CropView::default();
        view.set_zoom(2.0);
        view.pan_by(10_000.0, -10_000.0);
        let r = view.region(200, 100).unwrap();
        assert_eq!((r.width, r.height), (50, 50));
        assert_eq!((r.x, r.y), (150, 0));
        assert!(r.is_valid_for(200, 100));
    }

    #[test]
    fn free_form_covers_whole_image() {
        let view = CropView {
            aspect: None,
            ..CropView::default()
        };
        let r = view.region(31, 17).unwrap();
        assert_eq!(r, CropRegion { x: 0, y: 0, width: 31, height: 17 });
    }

    #[test]
    fn invalid_regions_are_rejected() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]));
        let empty = CropRegion { x: 0, y: 0, width: 0, height: 5 };
        let outside = CropRegion { x: 8, y: 0, width: 5, height: 5 };
        assert!(crop_image(&img, empty).is_none());
        assert!(crop_image(&img, outside).is_none());
        let ok = crop_image(&img, CropRegion { x: 2, y: 3, width: 4, height: 5 }).unwrap();
        assert_eq!(ok.dimensions(), (4, 5));
    }

    #[test]
    fn degenerate_image_has_no_region() {
        assert_eq!(CropView::default().region(0, 10), None);
    }
}
