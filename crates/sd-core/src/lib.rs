pub mod camera;
pub mod config;
pub mod geometry;
pub mod id;
pub mod model;
pub mod project;
pub mod scene;
pub mod store;

pub use camera::{CameraPreset, CameraState, Lighting, LightingPreset};
pub use config::{ConfigError, DesignerConfig};
pub use geometry::{FloorTexture, GeometryError, Quad, Scale, StageGeometry, StageLayout};
pub use id::Id;
pub use model::*;
pub use project::Project;
pub use scene::{Handle, Layer};
pub use store::{
    Autosave, Clock, KeyValueBackend, ManualClock, MemoryBackend, ProjectStore, SaveReceipt,
    StoreConfig, StoreError,
};
#[cfg(not(target_arch = "wasm32"))]
pub use store::SystemClock;
