//! Flatten a design to a downloadable PNG.

use crate::codec::{RasterError, encode_png};
use crate::paint::{Compositor, SceneView};
use sd_core::camera::CameraState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Resample through the camera's presentation transform instead of
    /// exporting the flat 2D layout. Lighting is included either way.
    pub apply_camera: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    /// PNG-encoded image.
    pub bytes: Vec<u8>,
}

/// `"My Stage"` → `"My_Stage.png"`; a blank name falls back to
/// `StageDesign-<timestamp>.png`.
pub fn export_file_name(project_name: &str, timestamp_ms: i64) -> String {
    let trimmed = project_name.trim();
    if trimmed.is_empty() {
        return format!("StageDesign-{timestamp_ms}.png");
    }
    let mut name = String::with_capacity(trimmed.len() + 4);
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    name.push_str(".png");
    name
}

pub fn export(
    compositor: &mut Compositor,
    view: &SceneView<'_>,
    camera: &CameraState,
    project_name: &str,
    timestamp_ms: i64,
    options: ExportOptions,
) -> Result<ExportArtifact, RasterError> {
    let image = if options.apply_camera {
        compositor.render_with_camera(view, camera)
    } else {
        compositor.render(view)
    };
    let bytes = encode_png(&image)?;
    let file_name = export_file_name(project_name, timestamp_ms);
    log::info!(
        "exported {} ({}x{}, {} bytes)",
        file_name,
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(ExportArtifact { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_image;
    use sd_core::camera::{CameraPreset, Lighting};
    use sd_core::geometry::{Scale, StageGeometry};

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name("Sangeet  Night\tStage", 1), "Sangeet_Night_Stage.png");
        assert_eq!(export_file_name("  ", 1_700_000_000_000), "StageDesign-1700000000000.png");
        assert_eq!(export_file_name("", 42), "StageDesign-42.png");
    }

    #[test]
    fn empty_scene_exports_valid_background_png() {
        let geometry = StageGeometry::new(40.0, 15.0, 10.0).unwrap();
        let view = SceneView {
            geometry: &geometry,
            scale: Scale::default(),
            items: &[],
            show_spotlights: true,
            lighting: Lighting::default(),
        };
        let artifact = export(
            &mut Compositor::new(),
            &view,
            &CameraState::default(),
            "Empty",
            0,
            ExportOptions::default(),
        )
        .unwrap();
        assert_eq!(artifact.file_name, "Empty.png");
        let img = decode_image(&artifact.bytes).unwrap();
        assert_eq!(img.dimensions(), (1500, 625));
    }

    #[test]
    fn camera_only_applies_when_requested() {
        let geometry = StageGeometry::default();
        let view = SceneView {
            geometry: &geometry,
            scale: Scale::default(),
            items: &[],
            show_spotlights: false,
            lighting: Lighting::default(),
        };
        let mut camera = CameraState::default();
        camera.apply_preset(CameraPreset::Side);
        let mut compositor = Compositor::new();

        let flat = export(&mut compositor, &view, &camera, "x", 0, ExportOptions::default()).unwrap();
        let viewed = export(
            &mut compositor,
            &view,
            &camera,
            "x",
            0,
            ExportOptions { apply_camera: true },
        )
        .unwrap();
        assert_ne!(flat.bytes, viewed.bytes);
        assert_eq!(decode_image(&flat.bytes).unwrap(), compositor.render(&view));
    }
}
