//! Tool system for canvas interactions.
//!
//! Each tool translates input events into `ToolAction`s that the designer
//! applies. The select tool works in stage coordinates (the space item
//! `x`/`y` live in); the brush tool works in mask bitmap pixels.

use crate::input::InputEvent;
use sd_core::geometry::StageLayout;
use sd_core::id::Id;
use sd_core::model::{PlacedItem, Rect};
use sd_core::scene::{self, Handle};
use sd_render::hit;

/// What a tool asks the designer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Replace the selection; `None` clears it and the group.
    Select(Option<Id>),
    /// Add or remove an item from the multi-select group.
    ToggleGroup(Id),
    /// Live drag/resize bounds, not recorded in history.
    Preview { id: Id, bounds: Rect },
    /// Final bounds of a gesture, one history entry.
    Commit { id: Id, bounds: Rect },
    /// Cancel any live preview.
    EndPreview,
    Orbit { dx: f32, dy: f32 },
    Zoom { delta: f32 },
    StrokeBegin { x: f32, y: f32 },
    StrokeMove { x: f32, y: f32 },
    StrokeEnd,
}

/// Scene state a tool may consult.
pub struct ToolContext<'a> {
    pub items: &'a [PlacedItem],
    pub selected: Option<Id>,
    pub layout: &'a StageLayout,
    /// Grid step applied to drag results, when snapping is on.
    pub snap: Option<f32>,
    /// Event position on the displayed canvas, before the camera is
    /// undone. Orbit deltas are measured here.
    pub screen: (f32, f32),
}

/// Trait for tools that handle input and produce actions.
pub trait Tool {
    /// Handle an input event, returning zero or more actions.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<ToolAction>;

    /// Drop any in-flight gesture.
    fn reset(&mut self);
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Drag {
        id: Id,
        start: Rect,
        from: (f32, f32),
    },
    Resize {
        id: Id,
        handle: Handle,
        start: Rect,
        from: (f32, f32),
    },
    Orbit {
        last: (f32, f32),
    },
}

/// Select, drag, resize and background orbit.
pub struct SelectTool {
    gesture: Gesture,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Drag { .. } | Gesture::Resize { .. })
    }

    fn press(&mut self, x: f32, y: f32, toggle: bool, ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        // handles of the current selection take priority over items below
        if let Some(item) = ctx.selected.and_then(|id| scene::find(ctx.items, id))
            && let Some(handle) = hit::hit_handle(item, x, y)
        {
            self.gesture = Gesture::Resize {
                id: item.id,
                handle,
                start: item.bounds(),
                from: (x, y),
            };
            return vec![];
        }

        match hit::hit_test(ctx.items, x, y) {
            Some(id) if toggle => vec![ToolAction::ToggleGroup(id)],
            Some(id) => {
                if let Some(item) = scene::find(ctx.items, id)
                    && !item.locked
                {
                    self.gesture = Gesture::Drag {
                        id,
                        start: item.bounds(),
                        from: (x, y),
                    };
                }
                vec![ToolAction::Select(Some(id))]
            }
            None => {
                self.gesture = Gesture::Orbit { last: ctx.screen };
                vec![ToolAction::Select(None)]
            }
        }
    }

    fn dragged(&self, x: f32, y: f32, ctx: &ToolContext<'_>, release: bool) -> Option<(Id, Rect)> {
        match self.gesture {
            // a click without movement leaves the item where it is
            Gesture::Drag { from, .. } | Gesture::Resize { from, .. } if release && (x, y) == from => None,
            Gesture::Drag { id, start, from } => {
                let (mut nx, mut ny) = (start.x + x - from.0, start.y + y - from.1);
                if release && let Some(step) = ctx.snap {
                    nx = scene::snap(nx, step);
                    ny = scene::snap(ny, step);
                }
                let (nx, ny) = ctx.layout.clamp_origin(nx, ny, start.width, start.height);
                Some((id, Rect::new(nx, ny, start.width, start.height)))
            }
            Gesture::Resize {
                id,
                handle,
                start,
                from,
            } => Some((id, scene::resized_bounds(start, handle, x - from.0, y - from.1))),
            _ => None,
        }
    }
}

impl Tool for SelectTool {
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.press(*x, *y, modifiers.toggles_selection(), ctx)
            }
            InputEvent::PointerMove { x, y } => {
                if let Gesture::Orbit { last } = self.gesture {
                    let (sx, sy) = ctx.screen;
                    self.gesture = Gesture::Orbit { last: ctx.screen };
                    return vec![ToolAction::Orbit {
                        dx: sx - last.0,
                        dy: sy - last.1,
                    }];
                }
                match self.dragged(*x, *y, ctx, false) {
                    Some((id, bounds)) => vec![ToolAction::Preview { id, bounds }],
                    None => vec![],
                }
            }
            InputEvent::PointerUp { x, y } => {
                let result = self.dragged(*x, *y, ctx, true);
                let was_gesture = self.is_dragging();
                self.gesture = Gesture::Idle;
                match result {
                    Some((id, bounds)) => {
                        vec![ToolAction::EndPreview, ToolAction::Commit { id, bounds }]
                    }
                    None if was_gesture => vec![ToolAction::EndPreview],
                    None => vec![],
                }
            }
            InputEvent::Zoom { delta } => vec![ToolAction::Zoom { delta: *delta }],
            InputEvent::Key { .. } => vec![],
        }
    }

    fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

// ─── Brush Tool ──────────────────────────────────────────────────────────

/// Mask painting: one stroke per press/release.
#[derive(Debug, Default)]
pub struct BrushTool {
    down: bool,
}

impl Tool for BrushTool {
    fn handle(&mut self, event: &InputEvent, _ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                self.down = true;
                vec![ToolAction::StrokeBegin { x: *x, y: *y }]
            }
            InputEvent::PointerMove { x, y } if self.down => {
                vec![ToolAction::StrokeMove { x: *x, y: *y }]
            }
            InputEvent::PointerUp { .. } if self.down => {
                self.down = false;
                vec![ToolAction::StrokeEnd]
            }
            _ => vec![],
        }
    }

    fn reset(&mut self) {
        self.down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use sd_core::geometry::{Scale, StageGeometry};

    fn item(name: &str, x: f32, y: f32, z: i64, locked: bool) -> PlacedItem {
        PlacedItem {
            id: Id::intern(name),
            src: String::new(),
            x,
            y,
            w: 100.0,
            h: 80.0,
            z,
            locked,
        }
    }

    fn layout() -> StageLayout {
        StageLayout::compute(&StageGeometry::default(), Scale::default())
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::from_pointer_down(x, y, Modifiers::NONE)
    }

    #[test]
    fn drag_previews_then_commits_once() {
        let items = vec![item("a", 0.0, 0.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: None,
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        assert_eq!(
            tool.handle(&down(10.0, 10.0), &ctx),
            vec![ToolAction::Select(Some(Id::intern("a")))]
        );
        let moved = tool.handle(&InputEvent::from_pointer_move(30.0, 25.0), &ctx);
        assert_eq!(
            moved,
            vec![ToolAction::Preview {
                id: Id::intern("a"),
                bounds: Rect::new(20.0, 15.0, 100.0, 80.0)
            }]
        );
        let up = tool.handle(&InputEvent::from_pointer_up(40.0, 40.0), &ctx);
        assert_eq!(
            up,
            vec![
                ToolAction::EndPreview,
                ToolAction::Commit {
                    id: Id::intern("a"),
                    bounds: Rect::new(30.0, 30.0, 100.0, 80.0)
                }
            ]
        );
        assert!(!tool.is_dragging());
    }

    #[test]
    fn snap_applies_on_release() {
        let items = vec![item("a", 0.0, 0.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: None,
            layout: &layout,
            snap: Some(25.0),
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        tool.handle(&down(10.0, 10.0), &ctx);
        let up = tool.handle(&InputEvent::from_pointer_up(40.0, 21.0), &ctx);
        assert_eq!(
            up[1],
            ToolAction::Commit {
                id: Id::intern("a"),
                bounds: Rect::new(25.0, 0.0, 100.0, 80.0)
            }
        );
    }

    #[test]
    fn click_without_movement_does_not_snap() {
        let items = vec![item("a", 13.0, 7.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: None,
            layout: &layout,
            snap: Some(25.0),
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        tool.handle(&down(40.0, 40.0), &ctx);
        let up = tool.handle(&InputEvent::from_pointer_up(40.0, 40.0), &ctx);
        assert_eq!(up, vec![ToolAction::EndPreview]);
    }

    #[test]
    fn drag_is_clamped_to_padded_bounds() {
        let items = vec![item("a", 0.0, 0.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: None,
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        tool.handle(&down(10.0, 10.0), &ctx);
        let up = tool.handle(&InputEvent::from_pointer_up(-5000.0, -5000.0), &ctx);
        assert_eq!(
            up[1],
            ToolAction::Commit {
                id: Id::intern("a"),
                bounds: Rect::new(-250.0, 0.0, 100.0, 80.0)
            }
        );
    }

    #[test]
    fn locked_item_selects_but_does_not_drag() {
        let items = vec![item("l", 0.0, 0.0, 1, true)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: Some(Id::intern("l")),
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        // corner of a locked item is not a handle
        let acts = tool.handle(&down(100.0, 80.0), &ctx);
        assert_eq!(acts, vec![ToolAction::Select(Some(Id::intern("l")))]);
        assert!(tool.handle(&InputEvent::from_pointer_move(150.0, 150.0), &ctx).is_empty());
        assert!(tool.handle(&InputEvent::from_pointer_up(150.0, 150.0), &ctx).is_empty());
    }

    #[test]
    fn handle_press_resizes_selected() {
        let items = vec![item("r", 0.0, 0.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: Some(Id::intern("r")),
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        assert!(tool.handle(&down(0.0, 0.0), &ctx).is_empty());
        let up = tool.handle(&InputEvent::from_pointer_up(20.0, 30.0), &ctx);
        assert_eq!(
            up[1],
            ToolAction::Commit {
                id: Id::intern("r"),
                bounds: Rect::new(20.0, 30.0, 80.0, 50.0)
            }
        );
    }

    #[test]
    fn modifier_click_toggles_group() {
        let items = vec![item("g", 0.0, 0.0, 1, false)];
        let layout = layout();
        let ctx = ToolContext {
            items: &items,
            selected: None,
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut tool = SelectTool::new();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let acts = tool.handle(&InputEvent::from_pointer_down(5.0, 5.0, shift), &ctx);
        assert_eq!(acts, vec![ToolAction::ToggleGroup(Id::intern("g"))]);
        assert!(!tool.is_dragging());
    }

    fn background_ctx<'a>(
        items: &'a [PlacedItem],
        layout: &'a StageLayout,
        screen: (f32, f32),
    ) -> ToolContext<'a> {
        ToolContext {
            items,
            selected: None,
            layout,
            snap: None,
            screen,
        }
    }

    #[test]
    fn background_press_clears_and_orbits_in_screen_space() {
        let items: Vec<PlacedItem> = vec![];
        let layout = layout();
        let mut tool = SelectTool::new();
        assert_eq!(
            tool.handle(&down(500.0, 200.0), &background_ctx(&items, &layout, (700.0, 300.0))),
            vec![ToolAction::Select(None)]
        );
        // stage coordinates are ignored while orbiting
        assert_eq!(
            tool.handle(&InputEvent::from_pointer_move(0.0, 0.0), &background_ctx(&items, &layout, (710.0, 290.0))),
            vec![ToolAction::Orbit { dx: 10.0, dy: -10.0 }]
        );
        assert!(
            tool.handle(&InputEvent::from_pointer_up(0.0, 0.0), &background_ctx(&items, &layout, (710.0, 290.0)))
                .is_empty()
        );
    }

    #[test]
    fn brush_strokes_follow_press() {
        let layout = layout();
        let ctx = ToolContext {
            items: &[],
            selected: None,
            layout: &layout,
            snap: None,
            screen: (0.0, 0.0),
        };
        let mut brush = BrushTool::default();
        assert!(brush.handle(&InputEvent::from_pointer_move(1.0, 1.0), &ctx).is_empty());
        assert_eq!(
            brush.handle(&InputEvent::from_touch_start(2.0, 3.0), &ctx),
            vec![ToolAction::StrokeBegin { x: 2.0, y: 3.0 }]
        );
        assert_eq!(
            brush.handle(&InputEvent::from_pointer_up(2.0, 3.0), &ctx),
            vec![ToolAction::StrokeEnd]
        );
        assert!(brush.handle(&InputEvent::from_pointer_up(2.0, 3.0), &ctx).is_empty());
    }
}
