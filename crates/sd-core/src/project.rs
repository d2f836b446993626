//! The persisted project record.
//!
//! Serialized as a flat camelCase JSON object:
//! `{id, projectName, widthFt, heightFt, wallFt, floorTexture,
//! showSpotlights, library, items, timestamp}`. Image payloads are inlined,
//! so a record is portable on its own.

use crate::geometry::StageGeometry;
use crate::id::Id;
use crate::model::{LibraryAsset, PlacedItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// `None` until the first save mints an id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default)]
    pub project_name: String,
    #[serde(flatten)]
    pub geometry: StageGeometry,
    #[serde(default)]
    pub show_spotlights: bool,
    #[serde(default)]
    pub library: Vec<LibraryAsset>,
    #[serde(default)]
    pub items: Vec<PlacedItem>,
    /// Milliseconds since the Unix epoch of the last save.
    #[serde(default)]
    pub timestamp: i64,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("", StageGeometry::default())
    }
}

impl Project {
    pub fn new(name: impl Into<String>, geometry: StageGeometry) -> Self {
        Self {
            id: None,
            project_name: name.into(),
            geometry,
            show_spotlights: false,
            library: Vec::new(),
            items: Vec::new(),
            timestamp: 0,
        }
    }

    /// Nothing worth saving: no placed items and no library assets.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.library.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
