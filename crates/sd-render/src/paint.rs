//! Scene → raster composition.
//!
//! Paints the backdrop panels (floor, walls, stage), the lighting overlay
//! and the placed items into an RGBA bitmap the size of the composition
//! canvas. Panel polygons are kurbo paths; the camera is a kurbo affine
//! applied by resampling the flat composition.

use crate::codec::decode_src;
use crate::surface::{Composite, composite_pixel};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Point, Shape, Vec2};
use sd_core::camera::{CameraState, Lighting};
use sd_core::geometry::{Quad, Scale, StageGeometry, StageLayout};
use sd_core::id::Id;
use sd_core::model::{Color, PlacedItem, Rect};
use sd_core::scene;
use std::collections::HashMap;

const STAGE_FILL: Color = Color::WHITE;
const GRID_LINE: Color = Color::rgba(0.0, 0.0, 0.0, 0.08);
const WALL_SHADE: f32 = 0.85;
const PLACEHOLDER_FILL: Color = Color::rgba(0.86, 0.86, 0.88, 1.0);
const PLACEHOLDER_EDGE: Color = Color::rgba(0.6, 0.6, 0.64, 1.0);
const SPOTLIGHT: Color = Color::rgba(1.0, 0.97, 0.85, 0.35);
const SELECTION: Color = Color::rgba(0.23, 0.51, 0.96, 1.0);
const GROUP_SELECTION: Color = Color::rgba(0.23, 0.51, 0.96, 0.5);
/// Backdrop behind a camera-transformed composition.
pub const VIEW_BACKDROP: Color = Color::rgba(0.1, 0.1, 0.11, 1.0);

/// Everything needed to paint one frame of the design.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub geometry: &'a StageGeometry,
    pub scale: Scale,
    pub items: &'a [PlacedItem],
    pub show_spotlights: bool,
    pub lighting: Lighting,
}

impl SceneView<'_> {
    pub fn layout(&self) -> StageLayout {
        StageLayout::compute(self.geometry, self.scale)
    }
}

/// Paints scenes, caching decoded item images by `src`.
#[derive(Debug, Default)]
pub struct Compositor {
    decoded: HashMap<String, Option<RgbaImage>>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct sources seen (decoded or failed).
    pub fn cached(&self) -> usize {
        self.decoded.len()
    }

    pub fn clear_cache(&mut self) {
        self.decoded.clear();
    }

    /// Paint the untransformed 2D layout.
    pub fn render(&mut self, view: &SceneView<'_>) -> RgbaImage {
        let layout = view.layout();
        let (width, height) = canvas_size(&layout);
        let mut canvas = RgbaImage::new(width, height);

        paint_backdrop(&mut canvas, &layout, view.geometry);
        if let Some(tint) = view.lighting.overlay() {
            paint_lighting(&mut canvas, &layout.stage, tint);
        }
        if view.show_spotlights {
            paint_spotlights(&mut canvas, &layout.stage);
        }

        let (ox, oy) = layout.origin();
        for item in scene::paint_order(view.items) {
            let target = Rect::new(ox + item.x, oy + item.y, item.w, item.h);
            match self.image_for(&item.src) {
                Some(img) => draw_contained(&mut canvas, img, target),
                None => draw_placeholder(&mut canvas, target),
            }
        }
        // forget sources no longer on stage
        self.decoded
            .retain(|src, _| view.items.iter().any(|item| &item.src == src));
        log::trace!(
            "PAINT {}x{} with {} items",
            width,
            height,
            view.items.len()
        );
        canvas
    }

    /// Paint through the camera's presentation transform. An identity
    /// camera yields exactly the flat composition.
    pub fn render_with_camera(&mut self, view: &SceneView<'_>, camera: &CameraState) -> RgbaImage {
        apply_camera(self.render(view), camera)
    }

    fn image_for(&mut self, src: &str) -> Option<&RgbaImage> {
        if !self.decoded.contains_key(src) {
            let decoded = match decode_src(src) {
                Ok(img) => Some(img),
                Err(e) => {
                    log::warn!("drawing placeholder for undecodable item source: {e}");
                    None
                }
            };
            self.decoded.insert(src.to_string(), decoded);
        }
        self.decoded.get(src).and_then(Option::as_ref)
    }
}

/// Resample a flat composition through the camera. Identity cameras return
/// it unchanged.
pub fn apply_camera(flat: RgbaImage, camera: &CameraState) -> RgbaImage {
    if camera.is_identity() {
        return flat;
    }
    let (w, h) = flat.dimensions();
    let transform = presentation_transform(camera, w as f64, h as f64);
    if transform.determinant().abs() < 1e-6 {
        return flat;
    }
    resample(&flat, transform.inverse())
}

/// Map a point on the displayed (camera-transformed) canvas back to flat
/// composition pixels. `None` when the transform is degenerate.
pub fn unproject(camera: &CameraState, width: f32, height: f32, x: f32, y: f32) -> Option<(f32, f32)> {
    if camera.is_identity() {
        return Some((x, y));
    }
    let transform = presentation_transform(camera, width as f64, height as f64);
    if transform.determinant().abs() < 1e-6 {
        return None;
    }
    let p = transform.inverse() * Point::new(x as f64, y as f64);
    Some((p.x as f32, p.y as f32))
}

/// translate(center) · scale(zoom) · rotate(rotation_z) · squash-y(cos
/// rotation_x) · translate(-center)
pub fn presentation_transform(camera: &CameraState, width: f64, height: f64) -> Affine {
    let center = Vec2::new(width / 2.0, height / 2.0);
    Affine::translate(center)
        * Affine::scale(camera.zoom as f64)
        * Affine::rotate((camera.rotation_z as f64).to_radians())
        * Affine::scale_non_uniform(1.0, camera.tilt_factor() as f64)
        * Affine::translate(-center)
}

/// Outline the selected item (with handles unless locked) and every group
/// member, in composition pixels.
pub fn paint_selection(
    canvas: &mut RgbaImage,
    layout: &StageLayout,
    items: &[PlacedItem],
    selected: Option<Id>,
    group: &[Id],
) {
    let (ox, oy) = layout.origin();
    let shifted = |item: &PlacedItem| Rect::new(ox + item.x, oy + item.y, item.w, item.h);

    for item in items.iter().filter(|i| group.contains(&i.id)) {
        stroke_rect(canvas, shifted(item), 1.0, GROUP_SELECTION);
    }
    let Some(item) = selected.and_then(|id| scene::find(items, id)) else {
        return;
    };
    let bounds = shifted(item);
    stroke_rect(canvas, bounds, 2.0, SELECTION);
    if item.locked {
        return;
    }
    for handle in scene::Handle::ALL {
        let (hx, hy) = handle.anchor(&bounds);
        let knob = Rect::new(hx - 4.0, hy - 4.0, 8.0, 8.0);
        fill_rect(canvas, knob, Color::WHITE);
        stroke_rect(canvas, knob, 1.0, SELECTION);
    }
}

pub(crate) fn canvas_size(layout: &StageLayout) -> (u32, u32) {
    (
        layout.canvas_width.ceil().max(1.0) as u32,
        layout.canvas_height.ceil().max(1.0) as u32,
    )
}

// ─── Backdrop ────────────────────────────────────────────────────────────

fn paint_backdrop(canvas: &mut RgbaImage, layout: &StageLayout, geometry: &StageGeometry) {
    let texture = geometry.floor_texture;
    let cell = layout.px_per_foot;
    let floor = quad_path(&layout.floor);
    let (ox, _) = layout.origin();

    fill_path(canvas, &floor, texture.fill());
    if texture.has_grid() {
        grid_path(canvas, &floor, (ox, layout.stage.bottom()), cell);
    }

    let wall_fill = shade(texture.fill(), WALL_SHADE);
    fill_path(canvas, &quad_path(&layout.left_wall), wall_fill);
    fill_path(canvas, &quad_path(&layout.right_wall), wall_fill);

    let stage = rect_path(&layout.stage);
    fill_path(canvas, &stage, STAGE_FILL);
    grid_path(canvas, &stage, layout.origin(), cell);
}

/// Vertical gradient of the lighting tint, strongest at the top of the
/// stage.
fn paint_lighting(canvas: &mut RgbaImage, stage: &Rect, tint: Color) {
    let (x0, y0, x1, y1) = pixel_span(canvas, stage.x, stage.y, stage.right(), stage.bottom());
    for y in y0..y1 {
        let t = (y as f32 + 0.5 - stage.y) / stage.height.max(1.0);
        let row = tint.with_alpha(tint.a * (1.0 - 0.6 * t.clamp(0.0, 1.0)));
        for x in x0..x1 {
            blend(canvas, x, y, row, 1.0);
        }
    }
}

/// Three soft glows hanging from the top of the stage.
fn paint_spotlights(canvas: &mut RgbaImage, stage: &Rect) {
    let radius = stage.height * 0.45;
    if radius <= 0.0 {
        return;
    }
    let cy = stage.y + stage.height * 0.35;
    for frac in [0.2, 0.5, 0.8] {
        let cx = stage.x + stage.width * frac;
        let (x0, y0, x1, y1) = pixel_span(canvas, cx - radius, cy - radius, cx + radius, cy + radius);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                if d < radius {
                    blend(canvas, x, y, SPOTLIGHT, 1.0 - d / radius);
                }
            }
        }
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

/// Draw `img` scaled to fit inside `target`, centered, aspect preserved.
fn draw_contained(canvas: &mut RgbaImage, img: &RgbaImage, target: Rect) {
    let (iw, ih) = (img.width() as f32, img.height() as f32);
    if target.width < 1.0 || target.height < 1.0 || iw == 0.0 || ih == 0.0 {
        return;
    }
    let fit = (target.width / iw).min(target.height / ih);
    let dw = (iw * fit).round().max(1.0) as u32;
    let dh = (ih * fit).round().max(1.0) as u32;
    let left = (target.x + (target.width - dw as f32) / 2.0).round() as i64;
    let top = (target.y + (target.height - dh as f32) / 2.0).round() as i64;

    let scaled;
    let source = if (dw, dh) == img.dimensions() {
        img
    } else {
        scaled = imageops::resize(img, dw, dh, FilterType::Triangle);
        &scaled
    };

    let (cw, ch) = canvas.dimensions();
    for (sx, sy, px) in source.enumerate_pixels() {
        let (x, y) = (left + sx as i64, top + sy as i64);
        if px[3] == 0 || x < 0 || y < 0 || x >= cw as i64 || y >= ch as i64 {
            continue;
        }
        let color = Color::rgba(
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
            f32::from(px[3]) / 255.0,
        );
        blend(canvas, x as u32, y as u32, color, 1.0);
    }
}

fn draw_placeholder(canvas: &mut RgbaImage, target: Rect) {
    fill_rect(canvas, target, PLACEHOLDER_FILL);
    stroke_rect(canvas, target, 2.0, PLACEHOLDER_EDGE);
}

// ─── Primitives ──────────────────────────────────────────────────────────

fn quad_path(quad: &Quad) -> BezPath {
    let mut path = BezPath::new();
    for (i, &(x, y)) in quad.points.iter().enumerate() {
        let p = Point::new(x as f64, y as f64);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn rect_path(r: &Rect) -> BezPath {
    kurbo::Rect::new(r.x as f64, r.y as f64, r.right() as f64, r.bottom() as f64).to_path(0.1)
}

/// Clamp a float box to the canvas as a half-open pixel range.
fn pixel_span(canvas: &RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32) -> (u32, u32, u32, u32) {
    let (w, h) = canvas.dimensions();
    let lo = |v: f32, max: u32| (v.floor().max(0.0) as u32).min(max);
    let hi = |v: f32, max: u32| (v.ceil().max(0.0) as u32).min(max);
    (lo(x0, w), lo(y0, h), hi(x1, w), hi(y1, h))
}

fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: Color, coverage: f32) {
    let px = canvas.get_pixel_mut(x, y);
    *px = composite_pixel(*px, Composite::SourceOver(color), coverage);
}

/// Fill every pixel whose center lies inside `path`.
fn fill_path(canvas: &mut RgbaImage, path: &BezPath, color: Color) {
    let bbox = path.bounding_box();
    let (x0, y0, x1, y1) = pixel_span(
        canvas,
        bbox.x0 as f32,
        bbox.y0 as f32,
        bbox.x1 as f32,
        bbox.y1 as f32,
    );
    for y in y0..y1 {
        for x in x0..x1 {
            if path.contains(Point::new(x as f64 + 0.5, y as f64 + 0.5)) {
                blend(canvas, x, y, color, 1.0);
            }
        }
    }
}

/// One-pixel grid lines every `cell` pixels from `origin`, clipped to
/// `path`.
fn grid_path(canvas: &mut RgbaImage, path: &BezPath, origin: (f32, f32), cell: f32) {
    if cell < 2.0 {
        return;
    }
    let bbox = path.bounding_box();
    let (x0, y0, x1, y1) = pixel_span(
        canvas,
        bbox.x0 as f32,
        bbox.y0 as f32,
        bbox.x1 as f32,
        bbox.y1 as f32,
    );
    for y in y0..y1 {
        let fy = (y as f32 + 0.5 - origin.1).rem_euclid(cell);
        for x in x0..x1 {
            let fx = (x as f32 + 0.5 - origin.0).rem_euclid(cell);
            if (fx < 1.0 || fy < 1.0) && path.contains(Point::new(x as f64 + 0.5, y as f64 + 0.5)) {
                blend(canvas, x, y, GRID_LINE, 1.0);
            }
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, r: Rect, color: Color) {
    let (x0, y0, x1, y1) = pixel_span(canvas, r.x, r.y, r.right(), r.bottom());
    for y in y0..y1 {
        for x in x0..x1 {
            blend(canvas, x, y, color, 1.0);
        }
    }
}

fn stroke_rect(canvas: &mut RgbaImage, r: Rect, width: f32, color: Color) {
    fill_rect(canvas, Rect::new(r.x, r.y, r.width, width), color);
    fill_rect(canvas, Rect::new(r.x, r.bottom() - width, r.width, width), color);
    fill_rect(canvas, Rect::new(r.x, r.y + width, width, r.height - 2.0 * width), color);
    fill_rect(
        canvas,
        Rect::new(r.right() - width, r.y + width, width, r.height - 2.0 * width),
        color,
    );
}

fn shade(c: Color, factor: f32) -> Color {
    Color::rgba(c.r * factor, c.g * factor, c.b * factor, c.a)
}

/// Nearest-neighbour resample of `flat` through `inverse` (output → source)
/// over the view backdrop.
fn resample(flat: &RgbaImage, inverse: Affine) -> RgbaImage {
    let (w, h) = flat.dimensions();
    let backdrop = Rgba(VIEW_BACKDROP.to_rgba8());
    let mut out = RgbaImage::from_pixel(w, h, backdrop);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
        let (sx, sy) = (p.x.floor(), p.y.floor());
        if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
            continue;
        }
        let src = flat.get_pixel(sx as u32, sy as u32);
        let color = Color::rgba(
            f32::from(src[0]) / 255.0,
            f32::from(src[1]) / 255.0,
            f32::from(src[2]) / 255.0,
            f32::from(src[3]) / 255.0,
        );
        *px = composite_pixel(backdrop, Composite::SourceOver(color), 1.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_png, png_data_url};
    use sd_core::camera::{CameraPreset, LightingPreset};

    fn solid_src(w: u32, h: u32, rgba: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(w, h, Rgba(rgba));
        png_data_url(&encode_png(&img).unwrap())
    }

    fn item(name: &str, src: String, x: f32, y: f32, w: f32, h: f32, z: i64) -> PlacedItem {
        PlacedItem {
            id: Id::intern(name),
            src,
            x,
            y,
            w,
            h,
            z,
            locked: false,
        }
    }

    fn view<'a>(geometry: &'a StageGeometry, items: &'a [PlacedItem]) -> SceneView<'a> {
        SceneView {
            geometry,
            scale: Scale::default(),
            items,
            show_spotlights: false,
            lighting: Lighting::default(),
        }
    }

    #[test]
    fn empty_scene_paints_backdrop_panels() {
        let geometry = StageGeometry::default();
        let img = Compositor::new().render(&view(&geometry, &[]));
        assert_eq!(img.dimensions(), (1500, 625));
        // stage interior, off the grid lines
        assert_eq!(img.get_pixel(762, 190).0, [255, 255, 255, 255]);
        // floor panel in the grid texture color
        assert_eq!(img.get_pixel(762, 590).0, [245, 245, 245, 255]);
        // walls are shaded darker than the floor
        assert!(img.get_pixel(10, 200)[0] < 245);
    }

    #[test]
    fn items_draw_object_contain_at_stage_offset() {
        let geometry = StageGeometry::default();
        let items = vec![item("wide", solid_src(20, 10, [255, 0, 0, 255]), 100.0, 50.0, 40.0, 40.0, 1)];
        let img = Compositor::new().render(&view(&geometry, &items));
        // box spans y 50..90; a 2:1 image fills rows 60..80
        assert_eq!(img.get_pixel(250 + 105, 70).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(250 + 105, 55).0, [255, 255, 255, 255]);
    }

    #[test]
    fn higher_z_paints_last() {
        let geometry = StageGeometry::default();
        let items = vec![
            item("top", solid_src(4, 4, [0, 0, 255, 255]), 0.0, 0.0, 50.0, 50.0, 5),
            item("bottom", solid_src(4, 4, [0, 255, 0, 255]), 0.0, 0.0, 50.0, 50.0, 2),
        ];
        let img = Compositor::new().render(&view(&geometry, &items));
        assert_eq!(img.get_pixel(270, 20).0, [0, 0, 255, 255]);
    }

    #[test]
    fn undecodable_source_gets_placeholder_and_is_cached() {
        let geometry = StageGeometry::default();
        let items = vec![
            item("a", "https://example.com/x.jpg".into(), 0.0, 0.0, 60.0, 60.0, 1),
            item("b", "https://example.com/x.jpg".into(), 100.0, 0.0, 60.0, 60.0, 2),
        ];
        let mut compositor = Compositor::new();
        let img = compositor.render(&view(&geometry, &items));
        assert_eq!(compositor.cached(), 1);
        assert_eq!(Rgba(img.get_pixel(280, 30).0), Rgba(PLACEHOLDER_FILL.to_rgba8()));
    }

    #[test]
    fn cache_drops_sources_that_leave_the_scene() {
        let geometry = StageGeometry::default();
        let items: Vec<_> = (0..5)
            .map(|i| item(&format!("c{i}"), solid_src(2, 2, [i as u8, 0, 0, 255]), 0.0, 0.0, 10.0, 10.0, i))
            .collect();
        let mut compositor = Compositor::new();
        compositor.render(&view(&geometry, &items));
        assert_eq!(compositor.cached(), 5);
        compositor.render(&view(&geometry, &items[..2]));
        assert_eq!(compositor.cached(), 2);
        compositor.render(&view(&geometry, &[]));
        assert_eq!(compositor.cached(), 0);
    }

    #[test]
    fn lighting_tints_stage_without_touching_floor() {
        let geometry = StageGeometry::default();
        let plain = Compositor::new().render(&view(&geometry, &[]));
        let mut lit_view = view(&geometry, &[]);
        lit_view.lighting = Lighting {
            preset: LightingPreset::Cool,
            intensity: 100,
        };
        let lit = Compositor::new().render(&lit_view);
        assert_ne!(lit.get_pixel(762, 10), plain.get_pixel(762, 10));
        assert_eq!(lit.get_pixel(762, 590), plain.get_pixel(762, 590));
    }

    #[test]
    fn camera_transform_is_presentation_only() {
        let geometry = StageGeometry::default();
        let items = vec![item("a", solid_src(2, 2, [9, 9, 9, 255]), 0.0, 0.0, 20.0, 20.0, 1)];
        let v = view(&geometry, &items);
        let mut compositor = Compositor::new();
        let flat = compositor.render(&v);

        assert_eq!(compositor.render_with_camera(&v, &CameraState::default()), flat);

        let mut camera = CameraState::default();
        camera.apply_preset(CameraPreset::Perspective);
        let tilted = compositor.render_with_camera(&v, &camera);
        assert_eq!(tilted.dimensions(), flat.dimensions());
        assert_ne!(tilted, flat);
        // corners fall outside the squashed, rotated plane
        assert_eq!(tilted.get_pixel(0, 0).0, VIEW_BACKDROP.to_rgba8());
    }

    #[test]
    fn unproject_inverts_presentation() {
        let mut camera = CameraState::default();
        camera.apply_preset(CameraPreset::Side);
        let t = presentation_transform(&camera, 1500.0, 625.0);
        let shown = t * Point::new(400.0, 200.0);
        let (x, y) = unproject(&camera, 1500.0, 625.0, shown.x as f32, shown.y as f32).unwrap();
        assert!((x - 400.0).abs() < 1e-2 && (y - 200.0).abs() < 1e-2);
        assert_eq!(unproject(&CameraState::default(), 10.0, 10.0, 3.0, 4.0), Some((3.0, 4.0)));
    }

    #[test]
    fn presentation_transform_keeps_center_fixed() {
        let mut camera = CameraState::default();
        camera.apply_preset(CameraPreset::Isometric);
        let t = presentation_transform(&camera, 200.0, 100.0);
        let c = t * Point::new(100.0, 50.0);
        assert!((c.x - 100.0).abs() < 1e-9 && (c.y - 50.0).abs() < 1e-9);
    }
}
