//! Camera and lighting presentation state.
//!
//! The pseudo-3D view is a 2D transform applied when drawing: a y-squash
//! for the tilt (`rotation_x`), a rotation about the view axis
//! (`rotation_z`) and a zoom. Stored item coordinates never pass through it.

use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Degrees of rotation per pixel of orbit drag.
pub const ORBIT_SENSITIVITY: f32 = 0.5;

pub const MAX_TILT: f32 = 80.0;
pub const MIN_ZOOM: f32 = 0.3;
pub const MAX_ZOOM: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPreset {
    Aerial,
    Frontal,
    Perspective,
    Isometric,
    Side,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 5] = [
        Self::Aerial,
        Self::Frontal,
        Self::Perspective,
        Self::Isometric,
        Self::Side,
    ];

    /// `(rotation_x, rotation_z, zoom)` for this preset.
    pub fn params(&self) -> (f32, f32, f32) {
        match self {
            Self::Aerial => (0.0, 0.0, 1.0),
            Self::Frontal => (20.0, 0.0, 1.0),
            Self::Perspective => (55.0, -20.0, 0.85),
            Self::Isometric => (60.0, -45.0, 0.75),
            Self::Side => (65.0, 35.0, 0.8),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "aerial" => Some(Self::Aerial),
            "frontal" => Some(Self::Frontal),
            "perspective" => Some(Self::Perspective),
            "isometric" => Some(Self::Isometric),
            "side" => Some(Self::Side),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingPreset {
    #[default]
    None,
    Warm,
    Cool,
    Party,
    Sunset,
}

impl LightingPreset {
    /// Overlay tint at full intensity. `None` has zero alpha.
    pub fn tint(&self) -> Color {
        match self {
            Self::None => Color::rgba(0.0, 0.0, 0.0, 0.0),
            Self::Warm => Color::rgba(1.0, 0.76, 0.4, 0.45),
            Self::Cool => Color::rgba(0.45, 0.65, 1.0, 0.45),
            Self::Party => Color::rgba(0.73, 0.2, 0.95, 0.5),
            Self::Sunset => Color::rgba(1.0, 0.42, 0.28, 0.5),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "warm" => Some(Self::Warm),
            "cool" => Some(Self::Cool),
            "party" => Some(Self::Party),
            "sunset" => Some(Self::Sunset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub preset: LightingPreset,
    /// Overlay strength in percent, 0–100.
    pub intensity: u8,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            preset: LightingPreset::None,
            intensity: 60,
        }
    }
}

impl Lighting {
    /// Tint with alpha scaled by intensity; `None` when nothing would show.
    pub fn overlay(&self) -> Option<Color> {
        let tint = self.preset.tint();
        let alpha = tint.a * f32::from(self.intensity.min(100)) / 100.0;
        (alpha > 0.0).then(|| tint.with_alpha(alpha))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Tilt in degrees; 0 looks straight at the stage.
    pub rotation_x: f32,
    /// Spin about the view axis in degrees.
    pub rotation_z: f32,
    pub zoom: f32,
    pub lighting: Lighting,
}

impl Default for CameraState {
    fn default() -> Self {
        let (rotation_x, rotation_z, zoom) = CameraPreset::Aerial.params();
        Self {
            rotation_x,
            rotation_z,
            zoom,
            lighting: Lighting::default(),
        }
    }
}

impl CameraState {
    pub fn apply_preset(&mut self, preset: CameraPreset) {
        let (rx, rz, zoom) = preset.params();
        self.rotation_x = rx;
        self.rotation_z = rz;
        self.zoom = zoom;
    }

    /// Continuous orbit from a background drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.rotation_z += dx * ORBIT_SENSITIVITY;
        self.rotation_x = (self.rotation_x - dy * ORBIT_SENSITIVITY).clamp(0.0, MAX_TILT);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_lighting(&mut self, preset: LightingPreset, intensity: u8) {
        self.lighting = Lighting {
            preset,
            intensity: intensity.min(100),
        };
    }

    /// Whether drawing through this camera differs from the flat layout.
    pub fn is_identity(&self) -> bool {
        self.rotation_x == 0.0 && self.rotation_z.rem_euclid(360.0) == 0.0 && self.zoom == 1.0
    }

    /// Vertical squash factor produced by the tilt.
    pub fn tilt_factor(&self) -> f32 {
        self.rotation_x.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_set_all_three_params() {
        let mut cam = CameraState::default();
        cam.apply_preset(CameraPreset::Isometric);
        assert_eq!((cam.rotation_x, cam.rotation_z, cam.zoom), (60.0, -45.0, 0.75));
        for p in CameraPreset::ALL {
            let name = serde_json::to_string(&p).unwrap();
            assert_eq!(CameraPreset::from_name(name.trim_matches('"')), Some(p));
        }
    }

    #[test]
    fn orbit_uses_fixed_sensitivity_and_clamps_tilt() {
        let mut cam = CameraState::default();
        cam.orbit(20.0, -10.0);
        assert_eq!(cam.rotation_z, 10.0);
        assert_eq!(cam.rotation_x, 5.0);
        cam.orbit(0.0, -1000.0);
        assert_eq!(cam.rotation_x, MAX_TILT);
        cam.orbit(0.0, 1000.0);
        assert_eq!(cam.rotation_x, 0.0);
    }

    #[test]
    fn lighting_overlay_scales_with_intensity() {
        let mut cam = CameraState::default();
        assert!(cam.lighting.overlay().is_none());
        cam.set_lighting(LightingPreset::Warm, 50);
        let tint = cam.lighting.overlay().unwrap();
        assert!((tint.a - 0.225).abs() < 1e-6);
        cam.set_lighting(LightingPreset::Warm, 0);
        assert!(cam.lighting.overlay().is_none());
        cam.set_lighting(LightingPreset::Cool, 255);
        assert_eq!(cam.lighting.intensity, 100);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = CameraState::default();
        cam.set_zoom(10.0);
        assert_eq!(cam.zoom, MAX_ZOOM);
        cam.set_zoom(0.0);
        assert_eq!(cam.zoom, MIN_ZOOM);
    }
}
