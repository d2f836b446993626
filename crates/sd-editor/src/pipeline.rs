//! Asset pipeline: upload → crop → mask → library.
//!
//! `Idle → Uploaded → Masking → Idle`. Upload decodes the chosen file,
//! crop cuts the selected region and opens a mask session on a scratch
//! `CanvasSurface`, and finalize encodes the surface into a new
//! `LibraryAsset`. Cancel returns to `Idle` from anywhere and never touches
//! the library.

use crate::history::{EditMode, MaskHistory};
use image::RgbaImage;
use sd_core::model::{Color, LibraryAsset};
use sd_render::codec::{RasterError, decode_image, encode_png, png_data_url};
use sd_render::crop::{CropRegion, CropView, crop_image};
use sd_render::surface::{CanvasSurface, Composite, RasterSurface};

pub const MIN_BRUSH_RADIUS: f32 = 2.0;
pub const MAX_BRUSH_RADIUS: f32 = 150.0;
pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Erase,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub mode: BrushMode,
    pub radius: f32,
    /// Paint color in restore mode.
    pub color: Color,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            mode: BrushMode::Erase,
            radius: DEFAULT_BRUSH_RADIUS,
            color: Color::BLACK,
        }
    }
}

impl Brush {
    pub fn composite(&self) -> Composite {
        match self.mode {
            BrushMode::Erase => Composite::DestinationOut,
            BrushMode::Restore => Composite::SourceOver(self.color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Uploaded,
    Masking,
}

/// An open mask-editing session on a cropped image.
#[derive(Debug, Clone)]
pub struct MaskSession<S> {
    surface: S,
    history: MaskHistory,
    /// Last stamped point while a stroke is in progress.
    stroke: Option<(f32, f32)>,
}

#[derive(Debug, Clone)]
enum PipelineState<S> {
    Idle,
    Uploaded {
        source: RgbaImage,
        view: CropView,
    },
    Masking(MaskSession<S>),
}

/// Pin a pointer position to the bitmap plus one brush radius so stroke
/// interpolation stays bounded. Non-finite positions are dropped.
fn clamp_to_surface<S: CanvasSurface>(surface: &S, x: f32, y: f32, radius: f32) -> Option<(f32, f32)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let (w, h) = surface.dimensions();
    Some((
        x.clamp(-radius, w as f32 + radius),
        y.clamp(-radius, h as f32 + radius),
    ))
}

pub struct AssetPipeline<S: CanvasSurface + Default = RasterSurface> {
    state: PipelineState<S>,
    brush: Brush,
    history_depth: usize,
}

impl<S: CanvasSurface + Default> AssetPipeline<S> {
    pub fn new(history_depth: usize) -> Self {
        Self {
            state: PipelineState::Idle,
            brush: Brush::default(),
            history_depth,
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        match self.state {
            PipelineState::Idle => PipelinePhase::Idle,
            PipelineState::Uploaded { .. } => PipelinePhase::Uploaded,
            PipelineState::Masking(_) => PipelinePhase::Masking,
        }
    }

    pub fn edit_mode(&self) -> EditMode {
        match self.state {
            PipelineState::Masking(_) => EditMode::MaskEditing,
            _ => EditMode::SceneEditing,
        }
    }

    // ─── Upload ──────────────────────────────────────────────────────────

    /// Load a chosen file. `None` (nothing chosen) is a no-op returning
    /// `Ok(false)`. A decode failure leaves the pipeline as it was.
    pub fn upload(&mut self, bytes: Option<&[u8]>) -> Result<bool, RasterError> {
        let Some(bytes) = bytes else {
            return Ok(false);
        };
        let source = decode_image(bytes)?;
        log::debug!("uploaded {}x{} image", source.width(), source.height());
        self.state = PipelineState::Uploaded {
            source,
            view: CropView::default(),
        };
        Ok(true)
    }

    // ─── Crop ────────────────────────────────────────────────────────────

    pub fn source_dimensions(&self) -> Option<(u32, u32)> {
        match &self.state {
            PipelineState::Uploaded { source, .. } => Some(source.dimensions()),
            _ => None,
        }
    }

    pub fn crop_view(&self) -> Option<&CropView> {
        match &self.state {
            PipelineState::Uploaded { view, .. } => Some(view),
            _ => None,
        }
    }

    pub fn crop_view_mut(&mut self) -> Option<&mut CropView> {
        match &mut self.state {
            PipelineState::Uploaded { view, .. } => Some(view),
            _ => None,
        }
    }

    /// Region selected by the current crop view.
    pub fn current_region(&self) -> Option<CropRegion> {
        match &self.state {
            PipelineState::Uploaded { source, view } => view.region(source.width(), source.height()),
            _ => None,
        }
    }

    /// Whether "proceed" is enabled for the current selection.
    pub fn can_crop(&self) -> bool {
        self.current_region().is_some()
    }

    /// Cut `region` out of the upload and open a mask session on it.
    /// `Ok(false)` when nothing is uploaded or the region is empty or out of
    /// bounds.
    pub fn crop(&mut self, region: CropRegion) -> Result<bool, RasterError> {
        let PipelineState::Uploaded { source, .. } = &self.state else {
            return Ok(false);
        };
        let Some(cropped) = crop_image(source, region) else {
            return Ok(false);
        };
        let mut surface = S::default();
        surface.load_image(&encode_png(&cropped)?)?;
        let mut history = MaskHistory::new(self.history_depth);
        history.start(surface.snapshot());
        log::debug!("mask session opened on {}x{} crop", region.width, region.height);
        self.state = PipelineState::Masking(MaskSession {
            surface,
            history,
            stroke: None,
        });
        Ok(true)
    }

    /// Crop with the region of the current crop view.
    pub fn crop_current(&mut self) -> Result<bool, RasterError> {
        match self.current_region() {
            Some(region) => self.crop(region),
            None => Ok(false),
        }
    }

    // ─── Brush ───────────────────────────────────────────────────────────

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush.mode = mode;
    }

    pub fn set_brush_radius(&mut self, radius: f32) {
        self.brush.radius = radius.clamp(MIN_BRUSH_RADIUS, MAX_BRUSH_RADIUS);
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
    }

    // ─── Mask painting ───────────────────────────────────────────────────

    pub fn surface(&self) -> Option<&S> {
        match &self.state {
            PipelineState::Masking(session) => Some(&session.surface),
            _ => None,
        }
    }

    pub fn mask_history_len(&self) -> usize {
        match &self.state {
            PipelineState::Masking(session) => session.history.len(),
            _ => 0,
        }
    }

    pub fn can_undo_mask(&self) -> bool {
        matches!(&self.state, PipelineState::Masking(session) if session.history.can_undo())
    }

    pub fn can_redo_mask(&self) -> bool {
        matches!(&self.state, PipelineState::Masking(session) if session.history.can_redo())
    }

    /// Start a stroke at bitmap position `(x, y)`.
    pub fn stroke_begin(&mut self, x: f32, y: f32) -> bool {
        let brush = self.brush;
        let PipelineState::Masking(session) = &mut self.state else {
            return false;
        };
        let Some((x, y)) = clamp_to_surface(&session.surface, x, y, brush.radius) else {
            return false;
        };
        session.surface.draw_circle((x, y), brush.radius, brush.composite());
        session.stroke = Some((x, y));
        true
    }

    /// Continue the stroke, stamping along the segment from the previous
    /// point so fast moves leave no gaps.
    pub fn stroke_move(&mut self, x: f32, y: f32) -> bool {
        let brush = self.brush;
        let PipelineState::Masking(session) = &mut self.state else {
            return false;
        };
        let Some((lx, ly)) = session.stroke else {
            return false;
        };
        let Some((x, y)) = clamp_to_surface(&session.surface, x, y, brush.radius) else {
            return false;
        };
        let spacing = (brush.radius / 2.0).max(1.0);
        let distance = ((x - lx).powi(2) + (y - ly).powi(2)).sqrt();
        let steps = (distance / spacing).ceil().max(1.0) as u32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let p = (lx + (x - lx) * t, ly + (y - ly) * t);
            session.surface.draw_circle(p, brush.radius, brush.composite());
        }
        session.stroke = Some((x, y));
        true
    }

    /// Finish the stroke and commit the surface to the mask history.
    /// Returns whether a new history entry was recorded.
    pub fn stroke_end(&mut self) -> bool {
        let PipelineState::Masking(session) = &mut self.state else {
            return false;
        };
        if session.stroke.take().is_none() {
            return false;
        }
        session.history.commit(session.surface.snapshot())
    }

    pub fn undo_mask(&mut self) -> bool {
        let PipelineState::Masking(session) = &mut self.state else {
            return false;
        };
        match session.history.undo() {
            Some(snapshot) => {
                session.surface.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo_mask(&mut self) -> bool {
        let PipelineState::Masking(session) = &mut self.state else {
            return false;
        };
        match session.history.redo() {
            Some(snapshot) => {
                session.surface.restore(snapshot);
                true
            }
            None => false,
        }
    }

    // ─── Finish ──────────────────────────────────────────────────────────

    /// Encode the masked image as a new library asset and return to `Idle`.
    /// `Ok(None)` outside a mask session; on an encode error the session
    /// stays open.
    pub fn finalize(&mut self) -> Result<Option<LibraryAsset>, RasterError> {
        let PipelineState::Masking(session) = &self.state else {
            return Ok(None);
        };
        let png = session.surface.to_image()?;
        let asset = LibraryAsset::new(png_data_url(&png));
        log::info!("finalized asset {} ({} bytes)", asset.id, png.len());
        self.state = PipelineState::Idle;
        Ok(Some(asset))
    }

    /// Discard any transient upload, crop or mask state.
    pub fn cancel(&mut self) {
        if self.phase() != PipelinePhase::Idle {
            log::debug!("pipeline cancelled from {:?}", self.phase());
        }
        self.state = PipelineState::Idle;
    }
}

impl<S: CanvasSurface + Default> Default for AssetPipeline<S> {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use sd_render::codec::decode_src;

    fn png(w: u32, h: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]))).unwrap()
    }

    fn masking(w: u32, h: u32) -> AssetPipeline {
        let mut p = AssetPipeline::default();
        assert!(p.upload(Some(&png(w, h))).unwrap());
        assert!(p.crop(CropRegion { x: 0, y: 0, width: w, height: h }).unwrap());
        p
    }

    #[test]
    fn no_file_is_silent_noop() {
        let mut p: AssetPipeline = AssetPipeline::default();
        assert!(!p.upload(None).unwrap());
        assert_eq!(p.phase(), PipelinePhase::Idle);
    }

    #[test]
    fn bad_upload_keeps_prior_state() {
        let mut p: AssetPipeline = AssetPipeline::default();
        p.upload(Some(&png(8, 8))).unwrap();
        assert!(p.upload(Some(b"nope")).is_err());
        assert_eq!(p.phase(), PipelinePhase::Uploaded);
        assert_eq!(p.source_dimensions(), Some((8, 8)));
    }

    #[test]
    fn empty_or_outside_crop_is_rejected() {
        let mut p: AssetPipeline = AssetPipeline::default();
        p.upload(Some(&png(8, 8))).unwrap();
        assert!(!p.crop(CropRegion { x: 0, y: 0, width: 0, height: 4 }).unwrap());
        assert!(!p.crop(CropRegion { x: 6, y: 0, width: 4, height: 4 }).unwrap());
        assert_eq!(p.phase(), PipelinePhase::Uploaded);
        assert!(p.can_crop());
        assert!(p.crop_current().unwrap());
        assert_eq!(p.edit_mode(), EditMode::MaskEditing);
    }

    #[test]
    fn brush_radius_is_clamped() {
        let mut p: AssetPipeline = AssetPipeline::default();
        p.set_brush_radius(0.5);
        assert_eq!(p.brush().radius, MIN_BRUSH_RADIUS);
        p.set_brush_radius(900.0);
        assert_eq!(p.brush().radius, MAX_BRUSH_RADIUS);
    }

    #[test]
    fn stroke_commits_once_per_release() {
        let mut p = masking(40, 40);
        assert_eq!(p.mask_history_len(), 1);
        p.set_brush_radius(4.0);
        assert!(p.stroke_begin(5.0, 5.0));
        assert!(p.stroke_move(35.0, 5.0));
        assert!(p.stroke_end());
        assert_eq!(p.mask_history_len(), 2);
        // the whole segment was erased
        let img = p.surface().unwrap().image();
        assert_eq!(img.get_pixel(20, 5)[3], 0);
        assert_eq!(img.get_pixel(20, 30)[3], 255);
        // release without a stroke records nothing
        assert!(!p.stroke_end());
    }

    #[test]
    fn unchanged_stroke_is_deduplicated() {
        let mut p = masking(20, 20);
        // entirely off the bitmap: pixels are untouched
        p.stroke_begin(500.0, 500.0);
        assert!(!p.stroke_end());
        assert_eq!(p.mask_history_len(), 1);
    }

    #[test]
    fn far_or_non_finite_pointer_stays_bounded() {
        let mut p = masking(20, 20);
        p.set_brush_radius(4.0);
        assert!(p.stroke_begin(10.0, 10.0));
        assert!(p.stroke_move(f32::MAX, 10.0));
        assert!(!p.stroke_move(f32::NAN, 10.0));
        assert!(!p.stroke_move(10.0, f32::INFINITY));
        assert!(p.stroke_end());
        let img = p.surface().unwrap().image();
        assert_eq!(img.get_pixel(19, 10)[3], 0);
        assert_eq!(img.get_pixel(10, 2)[3], 255);
    }

    #[test]
    fn mask_undo_restores_and_stops_at_base() {
        let mut p = masking(20, 20);
        let base = p.surface().unwrap().snapshot();
        p.stroke_begin(10.0, 10.0);
        p.stroke_end();
        assert!(p.can_undo_mask());
        assert!(p.undo_mask());
        assert_eq!(p.surface().unwrap().snapshot(), base);
        assert!(!p.can_undo_mask());
        assert!(!p.undo_mask());
        assert!(p.can_redo_mask());
        assert!(p.redo_mask());
        assert!(!p.can_redo_mask());
        assert_ne!(p.surface().unwrap().snapshot(), base);
    }

    #[test]
    fn restore_paints_brush_color() {
        let mut p = masking(20, 20);
        p.stroke_begin(10.0, 10.0);
        p.stroke_end();
        p.set_brush_mode(BrushMode::Restore);
        p.set_brush_color(Color::WHITE);
        p.stroke_begin(10.0, 10.0);
        p.stroke_end();
        assert_eq!(p.surface().unwrap().image().get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn finalize_yields_data_url_asset_and_returns_idle() {
        let mut p = masking(12, 7);
        let asset = p.finalize().unwrap().unwrap();
        assert!(asset.src.starts_with("data:image/png;base64,"));
        assert_eq!(decode_src(&asset.src).unwrap().dimensions(), (12, 7));
        assert_eq!(p.phase(), PipelinePhase::Idle);
        assert!(p.finalize().unwrap().is_none());
    }

    #[test]
    fn cancel_discards_session() {
        let mut p = masking(10, 10);
        p.cancel();
        assert_eq!(p.phase(), PipelinePhase::Idle);
        assert_eq!(p.edit_mode(), EditMode::SceneEditing);
        assert!(!p.stroke_begin(1.0, 1.0));
    }
}
