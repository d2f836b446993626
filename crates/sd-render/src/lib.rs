pub mod codec;
pub mod crop;
pub mod export;
pub mod hit;
pub mod paint;
pub mod surface;

pub use codec::RasterError;
pub use crop::{CropRegion, CropView};
pub use export::{ExportArtifact, ExportOptions};
pub use paint::{Compositor, SceneView};
pub use surface::{CanvasSurface, Composite, RasterSurface, Snapshot};
