//! Scene graph operations.
//!
//! The scene is an ordered `Vec<PlacedItem>`; insertion order breaks `z`
//! ties. Every operation here is pure: it takes the current items and
//! returns the next snapshot, or `None` when the operation does not apply
//! (unknown id, locked item, no actual change). The editor feeds the
//! returned snapshot to its history stack, so nothing mutates items in
//! place.

use crate::id::Id;
use crate::model::{PlacedItem, Rect};

/// Which way a re-layer moves an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Front,
    Back,
}

/// Resize handle positions around an item's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Self::NW,
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
    ];

    /// Anchor point of this handle on `r`.
    pub fn anchor(&self, r: &Rect) -> (f32, f32) {
        let (cx, cy) = r.center();
        match self {
            Self::N => (cx, r.y),
            Self::S => (cx, r.bottom()),
            Self::E => (r.right(), cy),
            Self::W => (r.x, cy),
            Self::NE => (r.right(), r.y),
            Self::NW => (r.x, r.y),
            Self::SE => (r.right(), r.bottom()),
            Self::SW => (r.x, r.bottom()),
        }
    }

    fn moves_left(&self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    fn moves_right(&self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    fn moves_top(&self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }
}

/// Smallest width/height a resize can produce, in pixels.
pub const MIN_ITEM_SIZE: f32 = 10.0;

// ─── Queries ─────────────────────────────────────────────────────────────

pub fn find(items: &[PlacedItem], id: Id) -> Option<&PlacedItem> {
    items.iter().find(|i| i.id == id)
}

pub fn max_z(items: &[PlacedItem]) -> Option<i64> {
    items.iter().map(|i| i.z).max()
}

pub fn min_z(items: &[PlacedItem]) -> Option<i64> {
    items.iter().map(|i| i.z).min()
}

/// Items in paint order: ascending `z`, ties in insertion order.
pub fn paint_order(items: &[PlacedItem]) -> Vec<&PlacedItem> {
    let mut ordered: Vec<&PlacedItem> = items.iter().collect();
    // stable sort keeps insertion order for equal z
    ordered.sort_by_key(|i| i.z);
    ordered
}

// ─── Operations ──────────────────────────────────────────────────────────

/// Append a new item. Its `z` is one above the current maximum, or
/// `count + 1` for an empty scene.
pub fn add(items: &[PlacedItem], src: &str, x: f32, y: f32, w: f32, h: f32) -> (Vec<PlacedItem>, Id) {
    let z = match max_z(items) {
        Some(top) => top.saturating_add(1),
        None => items.len() as i64 + 1,
    };
    let item = PlacedItem {
        id: Id::fresh("item"),
        src: src.to_string(),
        x,
        y,
        w,
        h,
        z,
        locked: false,
    };
    let id = item.id;
    let mut next = items.to_vec();
    next.push(item);
    (next, id)
}

/// Move an item to `(x, y)`. Locked items do not move.
pub fn move_to(items: &[PlacedItem], id: Id, x: f32, y: f32) -> Option<Vec<PlacedItem>> {
    let item = find(items, id)?;
    if item.locked || (item.x == x && item.y == y) {
        return None;
    }
    Some(patch(items, id, |i| {
        i.x = x;
        i.y = y;
    }))
}

/// Replace an item's bounds. Locked items are not resized.
pub fn set_bounds(items: &[PlacedItem], id: Id, bounds: Rect) -> Option<Vec<PlacedItem>> {
    let item = find(items, id)?;
    if item.locked || item.bounds() == bounds {
        return None;
    }
    Some(patch(items, id, |i| {
        i.x = bounds.x;
        i.y = bounds.y;
        i.w = bounds.width;
        i.h = bounds.height;
    }))
}

/// Bounds after dragging `handle` of `start` by `(dx, dy)`.
///
/// Handles on the left/top edges move the origin; the opposite edge stays
/// fixed. Size never drops below `MIN_ITEM_SIZE`.
pub fn resized_bounds(start: Rect, handle: Handle, dx: f32, dy: f32) -> Rect {
    let mut left = start.x;
    let mut top = start.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    if handle.moves_left() {
        left = (left + dx).min(right - MIN_ITEM_SIZE);
    }
    if handle.moves_right() {
        right = (right + dx).max(left + MIN_ITEM_SIZE);
    }
    if handle.moves_top() {
        top = (top + dy).min(bottom - MIN_ITEM_SIZE);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy).max(top + MIN_ITEM_SIZE);
    }

    Rect::new(left, top, right - left, bottom - top)
}

/// Bring an item to the front (`max(other z) + 1`) or send it to the back
/// (`min(other z) - 1`). Siblings are never renumbered.
pub fn relayer(items: &[PlacedItem], id: Id, layer: Layer) -> Option<Vec<PlacedItem>> {
    find(items, id)?;
    let others = items.iter().filter(|i| i.id != id).map(|i| i.z);
    let z = match layer {
        Layer::Front => others.max().unwrap_or(0).saturating_add(1),
        Layer::Back => others.min().unwrap_or(0).saturating_sub(1),
    };
    Some(patch(items, id, |i| i.z = z))
}

/// Clone an item under a new id, offset by `(dx, dy)`, on top of all others.
pub fn duplicate(items: &[PlacedItem], id: Id, dx: f32, dy: f32) -> Option<(Vec<PlacedItem>, Id)> {
    let source = find(items, id)?;
    let copy = PlacedItem {
        id: Id::fresh("item"),
        x: source.x + dx,
        y: source.y + dy,
        z: max_z(items).unwrap_or(0).max(0).saturating_add(1),
        ..source.clone()
    };
    let new_id = copy.id;
    let mut next = items.to_vec();
    next.push(copy);
    Some((next, new_id))
}

pub fn remove(items: &[PlacedItem], id: Id) -> Option<Vec<PlacedItem>> {
    find(items, id)?;
    Some(items.iter().filter(|i| i.id != id).cloned().collect())
}

/// Flip `locked`; nothing else changes.
pub fn toggle_lock(items: &[PlacedItem], id: Id) -> Option<Vec<PlacedItem>> {
    find(items, id)?;
    Some(patch(items, id, |i| i.locked = !i.locked))
}

/// Renumber `z` to `1..=n` preserving paint order.
///
/// Never applied implicitly; z-values may grow without bound during a
/// session.
pub fn compact_z(items: &[PlacedItem]) -> Vec<PlacedItem> {
    let order: Vec<Id> = paint_order(items).iter().map(|i| i.id).collect();
    let mut next = items.to_vec();
    for item in &mut next {
        if let Some(rank) = order.iter().position(|id| *id == item.id) {
            item.z = rank as i64 + 1;
        }
    }
    next
}

/// Round `value` to the nearest multiple of `step`.
pub fn snap(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

fn patch(items: &[PlacedItem], id: Id, f: impl Fn(&mut PlacedItem)) -> Vec<PlacedItem> {
    items
        .iter()
        .map(|i| {
            let mut i = i.clone();
            if i.id == id {
                f(&mut i);
            }
            i
        })
        .collect()
}
