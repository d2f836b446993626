//! WASM bridge for Stage Designer: exposes the designer to the browser shell.
//!
//! Compiled via `wasm-pack build --target web`. Queries that can fail return
//! JSON strings: `{"ok":true,...}` or `{"ok":false,"error":"..."}`.

mod storage;

pub use storage::{BrowserBackend, JsClock, LocalStorageBackend};

use sd_core::camera::{CameraPreset, LightingPreset};
use sd_core::geometry::FloorTexture;
use sd_core::id::Id;
use sd_core::project::Project;
use sd_core::scene::Layer;
use sd_core::DesignerConfig;
use sd_editor::{BrushMode, ClientRect, InputEvent, Modifiers, PipelinePhase, StageDesigner};
use sd_render::codec::png_data_url;
use sd_render::crop::CropRegion;
use sd_render::ExportOptions;
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

/// Row of the "open project" list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary {
    id: Option<String>,
    project_name: String,
    timestamp: i64,
    item_count: usize,
    asset_count: usize,
}

impl From<&Project> for ProjectSummary {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.map(|id| id.as_str().to_string()),
            project_name: p.project_name.clone(),
            timestamp: p.timestamp,
            item_count: p.items.len(),
            asset_count: p.library.len(),
        }
    }
}

fn ok_json(extra: serde_json::Value) -> String {
    let mut obj = json!({ "ok": true });
    if let (Some(target), serde_json::Value::Object(fields)) = (obj.as_object_mut(), extra) {
        target.extend(fields);
    }
    obj.to_string()
}

fn error_json(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn layer_from_name(name: &str) -> Option<Layer> {
    match name {
        "front" => Some(Layer::Front),
        "back" => Some(Layer::Back),
        _ => None,
    }
}

fn phase_name(phase: PipelinePhase) -> &'static str {
    match phase {
        PipelinePhase::Idle => "idle",
        PipelinePhase::Uploaded => "uploaded",
        PipelinePhase::Masking => "masking",
    }
}

fn paint(ctx: &CanvasRenderingContext2d, img: &image::RgbaImage) -> Result<(), JsValue> {
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(img.as_raw().as_slice()), img.width(), img.height())?;
    ctx.put_image_data(&data, 0.0, 0.0)
}

/// The main WASM-facing controller. All interaction from the page goes
/// through this struct.
#[wasm_bindgen]
pub struct StageCanvas {
    designer: StageDesigner<BrowserBackend>,
}

#[wasm_bindgen]
impl StageCanvas {
    /// Create a designer from a JSON config (`""` for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<StageCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = if config_json.trim().is_empty() {
            DesignerConfig::default()
        } else {
            DesignerConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let designer = StageDesigner::new(config, BrowserBackend::detect(), Box::new(JsClock))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { designer })
    }

    /// Whether saves survive a page reload.
    pub fn is_persistent(&self) -> bool {
        self.designer.store().backend().is_persistent()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn canvas_width(&self) -> u32 {
        self.designer.layout().canvas_width as u32
    }

    pub fn canvas_height(&self) -> u32 {
        self.designer.layout().canvas_height as u32
    }

    /// Draw the editing view (camera applied) into a 2D context sized
    /// `canvas_width × canvas_height`.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let img = self.designer.render();
        paint(ctx, &img)
    }

    /// Draw the mask-editing bitmap, if a mask session is open.
    pub fn render_mask(&self, ctx: &CanvasRenderingContext2d) -> Result<bool, JsValue> {
        match self.designer.pipeline().surface() {
            Some(surface) => paint(ctx, surface.image()).map(|()| true),
            None => Ok(false),
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Pointer/touch down in canvas pixels. Returns true if a re-render is
    /// needed.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.designer
            .handle_event(&InputEvent::from_pointer_down(x, y, modifiers))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.designer.handle_event(&InputEvent::from_pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.designer.handle_event(&InputEvent::from_pointer_up(x, y))
    }

    pub fn handle_wheel(&mut self, delta: f32) -> bool {
        self.designer.handle_event(&InputEvent::Zoom { delta })
    }

    /// Keyboard shortcut. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.designer.handle_event(&InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// Mask painting from client coordinates over the displayed mask
    /// element. `phase` is `"down"`, `"move"` or `"up"`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_mask_pointer(
        &mut self,
        phase: &str,
        client_x: f32,
        client_y: f32,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> bool {
        let Some((bw, bh)) = self
            .designer
            .pipeline()
            .surface()
            .map(|s| s.image().dimensions())
        else {
            return false;
        };
        let rect = ClientRect {
            left,
            top,
            width,
            height,
        };
        let (x, y) = rect.to_bitmap(client_x, client_y, bw, bh);
        let event = match phase {
            "down" => InputEvent::from_pointer_down(x, y, Modifiers::NONE),
            "move" => InputEvent::from_pointer_move(x, y),
            "up" => InputEvent::from_pointer_up(x, y),
            _ => return false,
        };
        self.designer.handle_event(&event)
    }

    // ─── Stage settings ──────────────────────────────────────────────────

    pub fn set_project_name(&mut self, name: &str) {
        self.designer.set_project_name(name);
    }

    pub fn set_dimensions(&mut self, width_ft: f32, height_ft: f32, wall_ft: f32) -> String {
        match self.designer.set_dimensions(width_ft, height_ft, wall_ft) {
            Ok(()) => ok_json(json!({})),
            Err(e) => error_json(e),
        }
    }

    pub fn set_floor_texture(&mut self, name: &str) -> bool {
        match FloorTexture::from_name(name) {
            Some(texture) => {
                self.designer.set_floor_texture(texture);
                true
            }
            None => false,
        }
    }

    pub fn set_show_spotlights(&mut self, on: bool) {
        self.designer.set_show_spotlights(on);
    }

    // ─── Camera & lighting ───────────────────────────────────────────────

    pub fn apply_camera_preset(&mut self, name: &str) -> bool {
        match CameraPreset::from_name(name) {
            Some(preset) => {
                self.designer.apply_camera_preset(preset);
                true
            }
            None => false,
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.designer.set_zoom(zoom);
    }

    pub fn set_lighting(&mut self, name: &str, intensity: u8) -> bool {
        match LightingPreset::from_name(name) {
            Some(preset) => {
                self.designer.set_lighting(preset, intensity);
                true
            }
            None => false,
        }
    }

    pub fn get_camera_json(&self) -> String {
        serde_json::to_string(self.designer.camera()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Place a library asset; returns the new item id or `""`.
    pub fn add_library_item(&mut self, asset_id: &str) -> String {
        self.designer
            .add_library_item(Id::intern(asset_id))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn select(&mut self, item_id: &str) {
        let id = (!item_id.is_empty()).then(|| Id::intern(item_id));
        self.designer.select(id);
    }

    /// `{"selected":"<id>"|null,"group":[...]}`
    pub fn get_selection_json(&self) -> String {
        let group: Vec<&str> = self.designer.selected_group().iter().map(|id| id.as_str()).collect();
        json!({
            "selected": self.designer.selected().map(|id| id.as_str().to_string()),
            "group": group,
        })
        .to_string()
    }

    pub fn delete_item(&mut self, item_id: &str) -> bool {
        self.designer.delete_item(Id::intern(item_id))
    }

    pub fn duplicate_item(&mut self, item_id: &str) -> String {
        self.designer
            .duplicate_item(Id::intern(item_id))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// `layer` is `"front"` or `"back"`.
    pub fn relayer(&mut self, item_id: &str, layer: &str) -> bool {
        match layer_from_name(layer) {
            Some(layer) => self.designer.relayer(Id::intern(item_id), layer),
            None => false,
        }
    }

    pub fn toggle_lock(&mut self, item_id: &str) -> bool {
        self.designer.toggle_lock(Id::intern(item_id))
    }

    /// `{"width":"W: 4.8ft","height":"H: 3.6ft"}` or `{}`.
    pub fn get_item_labels(&self, item_id: &str) -> String {
        match self.designer.item_labels(Id::intern(item_id)) {
            Some((width, height)) => json!({ "width": width, "height": height }).to_string(),
            None => "{}".to_string(),
        }
    }

    pub fn undo(&mut self) -> bool {
        self.designer.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.designer.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.designer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.designer.can_redo()
    }

    // ─── Asset pipeline ──────────────────────────────────────────────────

    pub fn pipeline_phase(&self) -> String {
        phase_name(self.designer.pipeline().phase()).to_string()
    }

    /// Load chosen file bytes. An empty array means nothing was chosen.
    pub fn upload(&mut self, bytes: &[u8]) -> String {
        let bytes = (!bytes.is_empty()).then_some(bytes);
        match self.designer.pipeline_mut().upload(bytes) {
            Ok(loaded) => ok_json(json!({ "loaded": loaded })),
            Err(e) => error_json(e),
        }
    }

    pub fn crop_pan(&mut self, dx: f32, dy: f32) {
        if let Some(view) = self.designer.pipeline_mut().crop_view_mut() {
            view.pan_by(dx, dy);
        }
    }

    pub fn crop_zoom(&mut self, zoom: f32) {
        if let Some(view) = self.designer.pipeline_mut().crop_view_mut() {
            view.set_zoom(zoom);
        }
    }

    /// `aspect <= 0` selects free-form.
    pub fn crop_aspect(&mut self, aspect: f32) {
        if let Some(view) = self.designer.pipeline_mut().crop_view_mut() {
            view.aspect = (aspect > 0.0).then_some(aspect);
        }
    }

    /// `{"x":..,"y":..,"width":..,"height":..}` of the current crop frame,
    /// or `null` when proceeding is disabled.
    pub fn get_crop_region_json(&self) -> String {
        match self.designer.pipeline().current_region() {
            Some(r) => json!({ "x": r.x, "y": r.y, "width": r.width, "height": r.height }).to_string(),
            None => "null".to_string(),
        }
    }

    /// Crop with the current frame, or an explicit region when `width > 0`.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> String {
        let pipeline = self.designer.pipeline_mut();
        let result = if width > 0 {
            pipeline.crop(CropRegion { x, y, width, height })
        } else {
            pipeline.crop_current()
        };
        match result {
            Ok(opened) => ok_json(json!({ "opened": opened })),
            Err(e) => error_json(e),
        }
    }

    /// `mode` is `"erase"` or `"restore"`; `color` a hex string.
    pub fn set_brush(&mut self, mode: &str, radius: f32, color: &str) {
        let pipeline = self.designer.pipeline_mut();
        pipeline.set_brush_mode(match mode {
            "restore" => BrushMode::Restore,
            _ => BrushMode::Erase,
        });
        pipeline.set_brush_radius(radius);
        if let Some(color) = sd_core::model::Color::from_hex(color) {
            pipeline.set_brush_color(color);
        }
    }

    pub fn finalize_asset(&mut self) -> String {
        match self.designer.finalize_asset() {
            Ok(Some(id)) => ok_json(json!({ "assetId": id.as_str() })),
            Ok(None) => ok_json(json!({ "assetId": null })),
            Err(e) => error_json(e),
        }
    }

    pub fn cancel_pipeline(&mut self) {
        self.designer.cancel_pipeline();
    }

    // ─── Library ─────────────────────────────────────────────────────────

    /// `[{"id":..,"src":..},...]`
    pub fn get_library_json(&self) -> String {
        serde_json::to_string(self.designer.library()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn delete_library_asset(&mut self, asset_id: &str) -> bool {
        self.designer.delete_library_asset(Id::intern(asset_id))
    }

    /// Add a handed-off URL. `bytes` is what the page managed to fetch;
    /// `None` keeps the raw URL.
    pub fn import_handoff(&mut self, src: &str, bytes: Option<Vec<u8>>) -> String {
        self.designer
            .import_handoff_bytes(src, bytes.as_deref())
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Projects ────────────────────────────────────────────────────────

    pub fn get_project_json(&self) -> String {
        match self.designer.project().to_json() {
            Ok(json) => json,
            Err(e) => error_json(e),
        }
    }

    /// Replace the session with a project JSON document.
    pub fn load_project_json(&mut self, json: &str) -> String {
        match Project::from_json(json) {
            Ok(project) => {
                self.designer.load_project(project);
                ok_json(json!({}))
            }
            Err(e) => error_json(e),
        }
    }

    pub fn new_project(&mut self) {
        self.designer.new_project();
    }

    pub fn save(&mut self) -> String {
        match self.designer.save() {
            Ok(r) => ok_json(json!({ "id": r.id.as_str(), "timestamp": r.timestamp, "label": r.label })),
            Err(e) => error_json(e),
        }
    }

    pub fn list_projects(&self) -> String {
        match self.designer.list_projects() {
            Ok(projects) => {
                let rows: Vec<ProjectSummary> = projects.iter().map(ProjectSummary::from).collect();
                ok_json(json!({ "projects": rows }))
            }
            Err(e) => error_json(e),
        }
    }

    pub fn open_project(&mut self, id: &str) -> String {
        match self.designer.open_project(Id::intern(id)) {
            Ok(()) => ok_json(json!({})),
            Err(e) => error_json(e),
        }
    }

    pub fn delete_project(&mut self, id: &str) -> String {
        match self.designer.delete_project(Id::intern(id)) {
            Ok(()) => ok_json(json!({})),
            Err(e) => error_json(e),
        }
    }

    pub fn duplicate_project(&mut self, id: &str) -> String {
        match self.designer.duplicate_project(Id::intern(id)) {
            Ok(copy) => ok_json(json!({ "project": ProjectSummary::from(&copy) })),
            Err(e) => error_json(e),
        }
    }

    pub fn quick_save(&mut self) -> String {
        match self.designer.quick_save() {
            Ok(()) => ok_json(json!({})),
            Err(e) => error_json(e),
        }
    }

    pub fn quick_load(&mut self) -> String {
        match self.designer.quick_load() {
            Ok(found) => ok_json(json!({ "found": found })),
            Err(e) => error_json(e),
        }
    }

    /// Autosave poll, called from a page timer.
    pub fn tick(&mut self, now_ms: f64) -> String {
        match self.designer.tick(now_ms as i64) {
            Ok(Some(r)) => ok_json(json!({ "saved": true, "id": r.id.as_str() })),
            Ok(None) => ok_json(json!({ "saved": false })),
            Err(e) => error_json(e),
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// `{"ok":true,"fileName":"...","dataUrl":"data:image/png;base64,..."}`
    pub fn export_png(&mut self, apply_camera: bool) -> String {
        match self.designer.export(ExportOptions { apply_camera }) {
            Ok(artifact) => ok_json(json!({
                "fileName": artifact.file_name,
                "dataUrl": png_data_url(&artifact.bytes),
            })),
            Err(e) => error_json(e),
        }
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Stage Designer panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no designer needed) ───────────────────────────

/// Validate a project JSON document. Returns `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_project(json: &str) -> String {
    match Project::from_json(json) {
        Ok(project) => match project.geometry.validate() {
            Ok(()) => ok_json(json!({})),
            Err(e) => error_json(e),
        },
        Err(e) => error_json(e),
    }
}
