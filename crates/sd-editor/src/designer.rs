//! The stage designer controller.
//!
//! `StageDesigner` owns one editing session: the active project (geometry,
//! library, placed items), the scene history, selection, the asset
//! pipeline, the camera and the project store. Every structural change to
//! the placed items goes through `SceneHistory::push`; camera and
//! selection changes are presentation state and are never recorded.

use crate::history::{EditMode, SceneHistory};
use crate::input::InputEvent;
use crate::pipeline::AssetPipeline;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{BrushTool, SelectTool, Tool, ToolAction, ToolContext};
use image::RgbaImage;
use sd_core::camera::{CameraPreset, CameraState, LightingPreset};
use sd_core::config::{ConfigError, DesignerConfig};
use sd_core::geometry::{FloorTexture, GeometryError, Scale, StageGeometry, StageLayout};
use sd_core::id::Id;
use sd_core::model::{LibraryAsset, PlacedItem, Rect};
use sd_core::project::Project;
use sd_core::scene::{self, Handle, Layer};
use sd_core::store::{
    Autosave, Clock, KeyValueBackend, MemoryBackend, ProjectStore, SaveReceipt, StoreError,
};
use sd_render::codec::{RasterError, data_url_for, decode_image};
use sd_render::export::{self, ExportArtifact, ExportOptions};
use sd_render::paint::{self, Compositor, SceneView};
use smallvec::SmallVec;
use thiserror::Error;

const ZOOM_STEP: f32 = 0.1;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("could not fetch {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

/// Retrieves the bytes of a handed-off image URL.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct StageDesigner<B: KeyValueBackend = MemoryBackend> {
    config: DesignerConfig,
    project: Project,
    history: SceneHistory,
    selected: Option<Id>,
    selected_group: SmallVec<[Id; 4]>,
    /// Live bounds of an item mid-gesture; not part of the scene yet.
    preview: Option<(Id, Rect)>,
    pipeline: AssetPipeline,
    camera: CameraState,
    select_tool: SelectTool,
    brush_tool: BrushTool,
    store: ProjectStore<B>,
    autosave: Autosave,
    compositor: Compositor,
    last_saved: Option<SaveReceipt>,
}

impl StageDesigner<MemoryBackend> {
    /// A session whose store lives only in memory.
    pub fn in_memory(config: DesignerConfig, clock: Box<dyn Clock>) -> Result<Self, EditorError> {
        Self::new(config, MemoryBackend::new(), clock)
    }
}

impl<B: KeyValueBackend> StageDesigner<B> {
    pub fn new(config: DesignerConfig, backend: B, clock: Box<dyn Clock>) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self {
            history: SceneHistory::new(config.history_depth),
            pipeline: AssetPipeline::new(config.history_depth),
            store: ProjectStore::new(backend, config.store.clone(), clock),
            autosave: Autosave::new(config.autosave_interval_ms),
            config,
            project: Project::default(),
            selected: None,
            selected_group: SmallVec::new(),
            preview: None,
            camera: CameraState::default(),
            select_tool: SelectTool::new(),
            brush_tool: BrushTool::default(),
            compositor: Compositor::new(),
            last_saved: None,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.project.items
    }

    pub fn item(&self, id: Id) -> Option<&PlacedItem> {
        scene::find(&self.project.items, id)
    }

    pub fn library(&self) -> &[LibraryAsset] {
        &self.project.library
    }

    pub fn geometry(&self) -> &StageGeometry {
        &self.project.geometry
    }

    pub fn scale(&self) -> Scale {
        self.config.scale()
    }

    pub fn layout(&self) -> StageLayout {
        StageLayout::compute(&self.project.geometry, self.scale())
    }

    pub fn selected(&self) -> Option<Id> {
        self.selected
    }

    pub fn selected_group(&self) -> &[Id] {
        &self.selected_group
    }

    pub fn preview(&self) -> Option<(Id, Rect)> {
        self.preview
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn pipeline(&self) -> &AssetPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut AssetPipeline {
        &mut self.pipeline
    }

    pub fn store(&self) -> &ProjectStore<B> {
        &self.store
    }

    pub fn edit_mode(&self) -> EditMode {
        self.pipeline.edit_mode()
    }

    pub fn can_undo(&self) -> bool {
        match self.edit_mode() {
            EditMode::SceneEditing => self.history.can_undo(),
            EditMode::MaskEditing => self.pipeline.can_undo_mask(),
        }
    }

    pub fn can_redo(&self) -> bool {
        match self.edit_mode() {
            EditMode::SceneEditing => self.history.can_redo(),
            EditMode::MaskEditing => self.pipeline.can_redo_mask(),
        }
    }

    /// "Last saved" label of the most recent manual save.
    pub fn last_saved_label(&self) -> Option<&str> {
        self.last_saved.as_ref().map(|r| r.label.as_str())
    }

    /// Width and height of an item in feet, e.g. `("W: 4.8ft", "H: 3.6ft")`.
    pub fn item_labels(&self, id: Id) -> Option<(String, String)> {
        let item = self.item(id)?;
        let scale = self.scale();
        Some((
            format!("W: {}", scale.feet_label(item.w)),
            format!("H: {}", scale.feet_label(item.h)),
        ))
    }

    // ─── Project settings ────────────────────────────────────────────────

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project.project_name = name.into();
    }

    /// Resize the stage. Placed items keep their pixel positions and sizes.
    pub fn set_dimensions(&mut self, width_ft: f32, height_ft: f32, wall_ft: f32) -> Result<(), EditorError> {
        let mut geometry = StageGeometry::new(width_ft, height_ft, wall_ft)?;
        geometry.floor_texture = self.project.geometry.floor_texture;
        self.project.geometry = geometry;
        Ok(())
    }

    pub fn set_floor_texture(&mut self, texture: FloorTexture) {
        self.project.geometry.floor_texture = texture;
    }

    pub fn set_show_spotlights(&mut self, on: bool) {
        self.project.show_spotlights = on;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select one item, or clear the selection and group with `None`.
    pub fn select(&mut self, id: Option<Id>) {
        match id {
            Some(id) if self.item(id).is_some() => self.selected = Some(id),
            Some(_) => {}
            None => {
                self.selected = None;
                self.selected_group.clear();
            }
        }
    }

    /// Add `id` to the multi-select group, or remove it if present.
    pub fn toggle_group(&mut self, id: Id) {
        if let Some(pos) = self.selected_group.iter().position(|g| *g == id) {
            self.selected_group.remove(pos);
        } else if self.item(id).is_some() {
            self.selected_group.push(id);
        }
    }

    fn prune_selection(&mut self) {
        let items = &self.project.items;
        if let Some(id) = self.selected
            && scene::find(items, id).is_none()
        {
            self.selected = None;
        }
        self.selected_group
            .retain(|id| scene::find(items, *id).is_some());
    }

    // ─── Scene operations ────────────────────────────────────────────────

    /// Record `next` as the new scene.
    fn apply(&mut self, next: Vec<PlacedItem>) {
        let current = std::mem::take(&mut self.project.items);
        self.project.items = self.history.push(current, next);
        self.preview = None;
        self.prune_selection();
    }

    /// Place a new item at the configured origin and size, and select it.
    pub fn add_item(&mut self, src: &str) -> Id {
        let (x, y) = self.config.default_item_origin;
        let (w, h) = self.config.default_item_size;
        let (next, id) = scene::add(&self.project.items, src, x, y, w, h);
        self.apply(next);
        self.selected = Some(id);
        log::debug!("added item {id}");
        id
    }

    /// Place a library asset on the stage.
    pub fn add_library_item(&mut self, asset: Id) -> Option<Id> {
        let src = self
            .project
            .library
            .iter()
            .find(|a| a.id == asset)?
            .src
            .clone();
        Some(self.add_item(&src))
    }

    /// Move an item's origin, kept inside the padded placement bounds.
    pub fn move_item(&mut self, id: Id, x: f32, y: f32) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        let (x, y) = self.layout().clamp_origin(x, y, item.w, item.h);
        match scene::move_to(&self.project.items, id, x, y) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    /// Drag one resize handle by `(dx, dy)`.
    pub fn resize_item(&mut self, id: Id, handle: Handle, dx: f32, dy: f32) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        let bounds = scene::resized_bounds(item.bounds(), handle, dx, dy);
        self.set_item_bounds(id, bounds)
    }

    fn set_item_bounds(&mut self, id: Id, bounds: Rect) -> bool {
        match scene::set_bounds(&self.project.items, id, bounds) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    pub fn delete_item(&mut self, id: Id) -> bool {
        match scene::remove(&self.project.items, id) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    /// Copy an item by the configured offset on top of everything, and
    /// select the copy.
    pub fn duplicate_item(&mut self, id: Id) -> Option<Id> {
        let (dx, dy) = self.config.duplicate_offset;
        let (next, copy) = scene::duplicate(&self.project.items, id, dx, dy)?;
        self.apply(next);
        self.selected = Some(copy);
        Some(copy)
    }

    pub fn relayer(&mut self, id: Id, layer: Layer) -> bool {
        match scene::relayer(&self.project.items, id, layer) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    pub fn toggle_lock(&mut self, id: Id) -> bool {
        match scene::toggle_lock(&self.project.items, id) {
            Some(next) => {
                self.apply(next);
                true
            }
            None => false,
        }
    }

    /// Renumber stacking order to `1..=n`. Only ever runs on request.
    pub fn compact_layers(&mut self) -> bool {
        let next = scene::compact_z(&self.project.items);
        if next == self.project.items {
            return false;
        }
        self.apply(next);
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.edit_mode() {
            EditMode::MaskEditing => self.pipeline.undo_mask(),
            EditMode::SceneEditing => match self.history.undo(&self.project.items) {
                Some(previous) => {
                    self.project.items = previous;
                    self.preview = None;
                    self.prune_selection();
                    true
                }
                None => false,
            },
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.edit_mode() {
            EditMode::MaskEditing => self.pipeline.redo_mask(),
            EditMode::SceneEditing => match self.history.redo(&self.project.items) {
                Some(next) => {
                    self.project.items = next;
                    self.preview = None;
                    self.prune_selection();
                    true
                }
                None => false,
            },
        }
    }

    // ─── Camera ──────────────────────────────────────────────────────────

    pub fn apply_camera_preset(&mut self, preset: CameraPreset) {
        self.camera.apply_preset(preset);
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.camera.orbit(dx, dy);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.camera.set_zoom(zoom);
    }

    pub fn set_lighting(&mut self, preset: LightingPreset, intensity: u8) {
        self.camera.set_lighting(preset, intensity);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route an input event. Pointer positions are composition-canvas
    /// pixels as displayed (scene editing) or mask bitmap pixels (mask
    /// editing). Returns whether anything visible changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Key { key, modifiers } = event {
            return match ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta) {
                Some(action) => self.run_shortcut(action),
                None => false,
            };
        }

        let layout = self.layout();
        let screen = event.position().unwrap_or_default();
        let actions = match self.edit_mode() {
            EditMode::MaskEditing => {
                let ctx = ToolContext {
                    items: &[],
                    selected: None,
                    layout: &layout,
                    snap: None,
                    screen,
                };
                self.brush_tool.handle(event, &ctx)
            }
            EditMode::SceneEditing => {
                let stage_event = self.to_stage_event(event, &layout);
                let ctx = ToolContext {
                    items: &self.project.items,
                    selected: self.selected,
                    layout: &layout,
                    snap: self.config.grid_snap.then_some(self.config.snap_size),
                    screen,
                };
                self.select_tool.handle(&stage_event, &ctx)
            }
        };

        let mut changed = false;
        for action in actions {
            changed |= self.apply_action(action);
        }
        changed
    }

    fn to_stage_event(&self, event: &InputEvent, layout: &StageLayout) -> InputEvent {
        let to_stage = |x: f32, y: f32| {
            let (fx, fy) = paint::unproject(&self.camera, layout.canvas_width, layout.canvas_height, x, y)
                .unwrap_or((x, y));
            let (ox, oy) = layout.origin();
            (fx - ox, fy - oy)
        };
        match *event {
            InputEvent::PointerDown { x, y, modifiers } => {
                let (x, y) = to_stage(x, y);
                InputEvent::PointerDown { x, y, modifiers }
            }
            InputEvent::PointerMove { x, y } => {
                let (x, y) = to_stage(x, y);
                InputEvent::PointerMove { x, y }
            }
            InputEvent::PointerUp { x, y } => {
                let (x, y) = to_stage(x, y);
                InputEvent::PointerUp { x, y }
            }
            _ => event.clone(),
        }
    }

    fn apply_action(&mut self, action: ToolAction) -> bool {
        match action {
            ToolAction::Select(id) => {
                let before = (self.selected, self.selected_group.len());
                self.select(id);
                before != (self.selected, self.selected_group.len())
            }
            ToolAction::ToggleGroup(id) => {
                self.toggle_group(id);
                true
            }
            ToolAction::Preview { id, bounds } => {
                self.preview = Some((id, bounds));
                true
            }
            ToolAction::EndPreview => self.preview.take().is_some(),
            ToolAction::Commit { id, bounds } => self.set_item_bounds(id, bounds),
            ToolAction::Orbit { dx, dy } => {
                self.camera.orbit(dx, dy);
                true
            }
            ToolAction::Zoom { delta } => {
                self.camera.set_zoom(self.camera.zoom + delta);
                true
            }
            ToolAction::StrokeBegin { x, y } => self.pipeline.stroke_begin(x, y),
            ToolAction::StrokeMove { x, y } => self.pipeline.stroke_move(x, y),
            ToolAction::StrokeEnd => self.pipeline.stroke_end(),
        }
    }

    pub fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        if self.edit_mode() == EditMode::MaskEditing
            && !matches!(action, ShortcutAction::Undo | ShortcutAction::Redo)
        {
            return false;
        }
        let selected = self.selected;
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => selected.is_some_and(|id| self.delete_item(id)),
            ShortcutAction::Duplicate => selected.and_then(|id| self.duplicate_item(id)).is_some(),
            ShortcutAction::ToggleLock => selected.is_some_and(|id| self.toggle_lock(id)),
            ShortcutAction::BringToFront => selected.is_some_and(|id| self.relayer(id, Layer::Front)),
            ShortcutAction::SendToBack => selected.is_some_and(|id| self.relayer(id, Layer::Back)),
            ShortcutAction::Save => match self.quick_save() {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("quick save failed: {e}");
                    false
                }
            },
            ShortcutAction::ZoomIn => {
                self.camera.set_zoom(self.camera.zoom + ZOOM_STEP);
                true
            }
            ShortcutAction::ZoomOut => {
                self.camera.set_zoom(self.camera.zoom - ZOOM_STEP);
                true
            }
            ShortcutAction::ResetView => {
                self.camera.apply_preset(CameraPreset::Aerial);
                true
            }
            ShortcutAction::Deselect => {
                let had = self.selected.is_some() || !self.selected_group.is_empty();
                self.select(None);
                had
            }
        }
    }

    // ─── Asset pipeline & library ────────────────────────────────────────

    /// Finish the mask session and append the result to the library.
    pub fn finalize_asset(&mut self) -> Result<Option<Id>, EditorError> {
        let Some(asset) = self.pipeline.finalize()? else {
            return Ok(None);
        };
        self.brush_tool.reset();
        let id = asset.id;
        self.project.library.push(asset);
        Ok(Some(id))
    }

    /// Close the upload / crop / mask panel without touching the library.
    pub fn cancel_pipeline(&mut self) {
        self.pipeline.cancel();
        self.brush_tool.reset();
    }

    /// Remove a library entry. Items placed from it keep their own copy.
    pub fn delete_library_asset(&mut self, id: Id) -> bool {
        let before = self.project.library.len();
        self.project.library.retain(|a| a.id != id);
        before != self.project.library.len()
    }

    /// Add a handed-off image to the library. `bytes` is the fetched
    /// payload; when missing or undecodable the raw URL is kept instead.
    pub fn import_handoff_bytes(&mut self, src: &str, bytes: Option<&[u8]>) -> Option<Id> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        let inlined = if src.starts_with("data:") {
            src.to_string()
        } else {
            match bytes.map(|b| decode_image(b).map(|_| b)) {
                Some(Ok(b)) => data_url_for(b),
                Some(Err(e)) => {
                    log::warn!("keeping raw URL for {src}: {e}");
                    src.to_string()
                }
                None => src.to_string(),
            }
        };
        let asset = LibraryAsset::new(inlined);
        let id = asset.id;
        self.project.library.push(asset);
        Some(id)
    }

    /// Fetch and inline a handed-off image URL, falling back to the URL.
    pub fn import_handoff(&mut self, src: &str, fetcher: &dyn ImageFetcher) -> Option<Id> {
        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            return self.import_handoff_bytes(src, None);
        }
        match fetcher.fetch(src) {
            Ok(bytes) => self.import_handoff_bytes(src, Some(&bytes)),
            Err(e) => {
                log::warn!("{e}; keeping raw URL");
                self.import_handoff_bytes(src, None)
            }
        }
    }

    /// Import a queue of handed-off URLs in order.
    pub fn import_handoff_list<S: AsRef<str>>(&mut self, urls: &[S], fetcher: &dyn ImageFetcher) -> Vec<Id> {
        urls.iter()
            .filter_map(|url| self.import_handoff(url.as_ref(), fetcher))
            .collect()
    }

    // ─── Project lifecycle & store ───────────────────────────────────────

    /// Replace the session with `project`. Its items enter through the
    /// scene history, so the load itself can be undone.
    pub fn load_project(&mut self, project: Project) {
        self.pipeline.cancel();
        self.select_tool.reset();
        self.brush_tool.reset();
        self.select(None);
        let Project {
            id,
            project_name,
            geometry,
            show_spotlights,
            library,
            items,
            timestamp,
        } = project;
        self.project.id = id;
        self.project.project_name = project_name;
        self.project.geometry = geometry;
        self.project.show_spotlights = show_spotlights;
        self.project.library = library;
        self.project.timestamp = timestamp;
        self.compositor.clear_cache();
        self.apply(items);
    }

    /// Start over with an empty, unsaved project and fresh history.
    pub fn new_project(&mut self) {
        self.pipeline.cancel();
        self.select_tool.reset();
        self.brush_tool.reset();
        self.select(None);
        self.preview = None;
        self.project = Project::default();
        self.history.clear();
        self.compositor.clear_cache();
        self.last_saved = None;
    }

    /// Manual save (upsert).
    pub fn save(&mut self) -> Result<SaveReceipt, EditorError> {
        let receipt = self
            .store
            .save(&mut self.project)
            .inspect_err(|e| log::warn!("save failed: {e}"))?;
        log::info!("saved {} at {}", receipt.id, receipt.label);
        self.last_saved = Some(receipt.clone());
        Ok(receipt)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, EditorError> {
        Ok(self.store.load_all()?)
    }

    pub fn open_project(&mut self, id: Id) -> Result<(), EditorError> {
        let project = self
            .store
            .load(id)
            .inspect_err(|e| log::warn!("open failed: {e}"))?;
        self.load_project(project);
        Ok(())
    }

    /// Delete a stored project. If it is the open one, the session keeps
    /// its content but will save as a new record.
    pub fn delete_project(&mut self, id: Id) -> Result<(), EditorError> {
        self.store.delete(id)?;
        if self.project.id == Some(id) {
            self.project.id = None;
        }
        Ok(())
    }

    pub fn duplicate_project(&mut self, id: Id) -> Result<Project, EditorError> {
        let source = self.store.load(id)?;
        Ok(self.store.duplicate(&source)?)
    }

    /// Single-slot quick save of the current project.
    pub fn quick_save(&mut self) -> Result<(), EditorError> {
        self.store.save_slot(&self.project)?;
        Ok(())
    }

    /// Restore the quick-save slot. `Ok(false)` when the slot is empty.
    pub fn quick_load(&mut self) -> Result<bool, EditorError> {
        match self.store.load_slot()? {
            Some(project) => {
                self.load_project(project);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Autosave poll. Saves silently when the interval has elapsed and the
    /// project has items or library assets.
    pub fn tick(&mut self, now_ms: i64) -> Result<Option<SaveReceipt>, EditorError> {
        if !self.autosave.is_due(now_ms, self.project.is_empty()) {
            return Ok(None);
        }
        let receipt = self
            .store
            .save(&mut self.project)
            .inspect_err(|e| log::warn!("autosave failed: {e}"))?;
        log::debug!("autosaved {}", receipt.id);
        Ok(Some(receipt))
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Items as currently displayed: the live gesture preview applied.
    fn display_items(&self) -> Vec<PlacedItem> {
        let mut items = self.project.items.clone();
        if let Some((id, bounds)) = self.preview
            && let Some(item) = items.iter_mut().find(|i| i.id == id)
        {
            item.x = bounds.x;
            item.y = bounds.y;
            item.w = bounds.width;
            item.h = bounds.height;
        }
        items
    }

    /// The editing view: composition, selection chrome and camera.
    pub fn render(&mut self) -> RgbaImage {
        let items = self.display_items();
        let scale = self.scale();
        let view = SceneView {
            geometry: &self.project.geometry,
            scale,
            items: &items,
            show_spotlights: self.project.show_spotlights,
            lighting: self.camera.lighting,
        };
        let layout = view.layout();
        let mut flat = self.compositor.render(&view);
        paint::paint_selection(&mut flat, &layout, &items, self.selected, &self.selected_group);
        paint::apply_camera(flat, &self.camera)
    }

    /// Flatten the design to a PNG named after the project.
    pub fn export(&mut self, options: ExportOptions) -> Result<ExportArtifact, EditorError> {
        let scale = self.scale();
        let view = SceneView {
            geometry: &self.project.geometry,
            scale,
            items: &self.project.items,
            show_spotlights: self.project.show_spotlights,
            lighting: self.camera.lighting,
        };
        let artifact = export::export(
            &mut self.compositor,
            &view,
            &self.camera,
            &self.project.project_name,
            self.store.now_ms(),
            options,
        )
        .inspect_err(|e| log::warn!("export failed: {e}"))?;
        Ok(artifact)
    }
}
