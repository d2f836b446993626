//! Core data model for stage designs.
//!
//! A design is a flat, z-ordered list of `PlacedItem`s layered over the
//! stage, plus a library of finalized `LibraryAsset`s they were placed from.
//! Items keep their own copy of the image payload, so the library and the
//! scene never reference each other.

use crate::id::Id;
use serde::{Deserialize, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channel = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Quantize to 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// ─── Library & placed items ──────────────────────────────────────────────

/// A finalized, mask-edited image ready to be placed on the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryAsset {
    pub id: Id,
    /// Image payload, normally a base64 `data:` URL. A raw URL is accepted
    /// when a handed-off image could not be inlined.
    pub src: String,
}

impl LibraryAsset {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            id: Id::fresh("asset"),
            src: src.into(),
        }
    }
}

/// An image instance positioned on the stage.
///
/// `x`/`y` are pixels relative to the stage origin. `z` is the stacking
/// order: ascending paint order, topmost wins pointer events. Values need
/// not be contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: Id,
    pub src: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub z: i64,
    #[serde(default)]
    pub locked: bool,
}

impl PlacedItem {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_opaque_and_translucent() {
        let c = Color::from_hex("#FF8000").unwrap();
        assert_eq!(c.to_rgba8(), [255, 128, 0, 255]);
        let c = Color::from_hex("00000080").unwrap();
        assert_eq!(c.to_rgba8(), [0, 0, 0, 128]);
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
    }

    #[test]
    fn rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(30.0, 15.0));
        assert!(!r.contains(30.1, 12.0));
        assert_eq!(r.center(), (20.0, 12.5));
    }

    #[test]
    fn placed_item_locked_defaults_to_false() {
        let json = r#"{"id":"item_a","src":"data:,","x":1,"y":2,"w":3,"h":4,"z":1}"#;
        let item: PlacedItem = serde_json::from_str(json).unwrap();
        assert!(!item.locked);
        assert_eq!(item.bounds(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }
}
