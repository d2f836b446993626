pub mod designer;
pub mod history;
pub mod input;
pub mod pipeline;
pub mod shortcuts;
pub mod tools;

pub use designer::{EditorError, FetchError, ImageFetcher, StageDesigner};
pub use history::{EditMode, MaskHistory, SceneHistory};
pub use input::{ClientRect, InputEvent, Modifiers};
pub use pipeline::{AssetPipeline, Brush, BrushMode, PipelinePhase};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{BrushTool, SelectTool, Tool, ToolAction, ToolContext};
