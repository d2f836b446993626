//! Hit testing: point → item lookup.
//!
//! Coordinates are stage pixels (relative to the stage origin, the same
//! space `PlacedItem::x/y` live in). Items are walked in reverse paint
//! order so the topmost one wins.

use sd_core::id::Id;
use sd_core::model::PlacedItem;
use sd_core::scene::{self, Handle};

/// Half-size of the square grab area around a resize handle.
pub const HANDLE_RADIUS: f32 = 6.0;

/// Find the topmost item at `(px, py)`. `None` is the background.
pub fn hit_test(items: &[PlacedItem], px: f32, py: f32) -> Option<Id> {
    scene::paint_order(items)
        .into_iter()
        .rev()
        .find(|item| item.bounds().contains(px, py))
        .map(|item| item.id)
}

/// Which resize handle of `item` is under `(px, py)`. Locked items expose
/// no handles.
pub fn hit_handle(item: &PlacedItem, px: f32, py: f32) -> Option<Handle> {
    if item.locked {
        return None;
    }
    let bounds = item.bounds();
    Handle::ALL.into_iter().find(|handle| {
        let (hx, hy) = handle.anchor(&bounds);
        (px - hx).abs() <= HANDLE_RADIUS && (py - hy).abs() <= HANDLE_RADIUS
    })
}
