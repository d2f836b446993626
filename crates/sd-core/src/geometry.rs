//! Real-world stage dimensions and their pixel layout.
//!
//! Everything is measured in feet and mapped to pixels through a single
//! injected `Scale`. The layout frames the stage with two side walls and a
//! floor panel, like looking into an open box: the stage is the back wall,
//! the side walls widen toward the viewer and meet the floor's outer edge.
//!
//! The panels are purely visual. Items are not clipped or collided against
//! them; they only need to stay inside `placement_bounds`.

use crate::model::{Color, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixels per foot used by the current revision of the designer.
pub const DEFAULT_PX_PER_FOOT: f32 = 25.0;

/// Pixels per foot used by early saves.
pub const LEGACY_PX_PER_FOOT: f32 = 20.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{field} must be a positive number of feet, got {value}")]
    NonPositive { field: &'static str, value: f32 },
}

// ─── Scale ───────────────────────────────────────────────────────────────

/// Feet → pixel conversion, shared by a whole designer session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub px_per_foot: f32,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            px_per_foot: DEFAULT_PX_PER_FOOT,
        }
    }
}

impl Scale {
    pub const fn new(px_per_foot: f32) -> Self {
        Self { px_per_foot }
    }

    pub fn to_pixels(&self, feet: f32) -> f32 {
        feet * self.px_per_foot
    }

    pub fn to_feet(&self, pixels: f32) -> f32 {
        pixels / self.px_per_foot
    }

    /// Dimension label as shown next to a selected item, e.g. `4.8ft`.
    pub fn feet_label(&self, pixels: f32) -> String {
        format!("{:.1}ft", self.to_feet(pixels))
    }
}

// ─── Floor textures ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorTexture {
    #[default]
    Grid,
    Wood,
    Concrete,
    Dark,
}

impl FloorTexture {
    pub const ALL: [FloorTexture; 4] = [Self::Grid, Self::Wood, Self::Concrete, Self::Dark];

    pub fn fill(&self) -> Color {
        match self {
            Self::Grid => Color::rgba(0.961, 0.961, 0.961, 1.0),
            Self::Wood => Color::rgba(0.545, 0.353, 0.169, 1.0),
            Self::Concrete => Color::rgba(0.62, 0.62, 0.62, 1.0),
            Self::Dark => Color::rgba(0.133, 0.133, 0.145, 1.0),
        }
    }

    /// Whether a one-foot grid is repeated over the fill.
    pub fn has_grid(&self) -> bool {
        matches!(self, Self::Grid | Self::Dark)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Wood => "wood",
            Self::Concrete => "concrete",
            Self::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

// ─── Stage geometry ──────────────────────────────────────────────────────

/// Side-wall depth assumed for records saved before walls were sized.
pub const DEFAULT_WALL_FT: f32 = 10.0;

fn default_wall_ft() -> f32 {
    DEFAULT_WALL_FT
}

/// Stage size in feet. Serialized flat into the project record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageGeometry {
    pub width_ft: f32,
    pub height_ft: f32,
    #[serde(default = "default_wall_ft")]
    pub wall_ft: f32,
    #[serde(default)]
    pub floor_texture: FloorTexture,
}

impl Default for StageGeometry {
    fn default() -> Self {
        Self {
            width_ft: 40.0,
            height_ft: 15.0,
            wall_ft: DEFAULT_WALL_FT,
            floor_texture: FloorTexture::Grid,
        }
    }
}

impl StageGeometry {
    pub fn new(width_ft: f32, height_ft: f32, wall_ft: f32) -> Result<Self, GeometryError> {
        let geometry = Self {
            width_ft,
            height_ft,
            wall_ft,
            floor_texture: FloorTexture::default(),
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        for (field, value) in [
            ("widthFt", self.width_ft),
            ("heightFt", self.height_ft),
            ("wallFt", self.wall_ft),
        ] {
            // NaN fails this comparison too
            if !(value > 0.0) {
                return Err(GeometryError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Stage panel size in pixels.
    pub fn stage_pixels(&self, scale: Scale) -> (f32, f32) {
        (scale.to_pixels(self.width_ft), scale.to_pixels(self.height_ft))
    }
}

// ─── Layout ──────────────────────────────────────────────────────────────

/// Convex four-sided panel, corners in clockwise order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [(f32, f32); 4],
}

impl Quad {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        let mut sign = 0.0f32;
        for i in 0..4 {
            let (ax, ay) = self.points[i];
            let (bx, by) = self.points[(i + 1) % 4];
            let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
            if cross != 0.0 {
                if sign != 0.0 && cross.signum() != sign {
                    return false;
                }
                sign = cross.signum();
            }
        }
        true
    }

    pub fn bounding_rect(&self) -> Rect {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for (x, y) in self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Pixel layout of the framed stage, in composition coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageLayout {
    /// The stage (back wall) panel. Its top-left is the stage origin.
    pub stage: Rect,
    pub left_wall: Quad,
    pub right_wall: Quad,
    pub floor: Quad,
    /// Full composition size in pixels.
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub px_per_foot: f32,
}

impl StageLayout {
    pub fn compute(geometry: &StageGeometry, scale: Scale) -> Self {
        let (w, h) = geometry.stage_pixels(scale);
        let wall = scale.to_pixels(geometry.wall_ft);
        let canvas_width = w + 2.0 * wall;
        let canvas_height = h + wall;

        let stage = Rect::new(wall, 0.0, w, h);
        let left_wall = Quad {
            points: [(0.0, 0.0), (wall, 0.0), (wall, h), (0.0, canvas_height)],
        };
        let right_wall = Quad {
            points: [
                (wall + w, 0.0),
                (canvas_width, 0.0),
                (canvas_width, canvas_height),
                (wall + w, h),
            ],
        };
        let floor = Quad {
            points: [
                (wall, h),
                (wall + w, h),
                (canvas_width, canvas_height),
                (0.0, canvas_height),
            ],
        };

        Self {
            stage,
            left_wall,
            right_wall,
            floor,
            canvas_width,
            canvas_height,
            px_per_foot: scale.px_per_foot,
        }
    }

    /// Stage origin in composition coordinates.
    pub fn origin(&self) -> (f32, f32) {
        (self.stage.x, self.stage.y)
    }

    /// Rectangle items may occupy, in stage coordinates.
    pub fn placement_bounds(&self) -> Rect {
        let wall = self.stage.x;
        Rect::new(
            -wall,
            0.0,
            self.stage.width + 2.0 * wall,
            self.stage.height + wall,
        )
    }

    /// Keep an item's origin inside the placement bounds. Items larger than
    /// the bounds are pinned to the top-left edge.
    pub fn clamp_origin(&self, x: f32, y: f32, w: f32, h: f32) -> (f32, f32) {
        let b = self.placement_bounds();
        let max_x = (b.right() - w).max(b.x);
        let max_y = (b.bottom() - h).max(b.y);
        (x.clamp(b.x, max_x), y.clamp(b.y, max_y))
    }
}
