//! Undo/Redo stacks.
//!
//! The scene stack holds full snapshots of the placed items: every
//! structural change pushes the previous snapshot, so undo/redo swaps whole
//! item lists in a single step. The mask stack holds bitmap snapshots of the
//! scratch surface while a mask session is open. Which stack `undo`/`redo`
//! act on is chosen by `EditMode`.

use sd_core::model::PlacedItem;
use sd_render::surface::Snapshot;

pub const DEFAULT_HISTORY_DEPTH: usize = 200;

/// Which history the editor's undo/redo currently drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    SceneEditing,
    MaskEditing,
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// Snapshot history of the placed items.
#[derive(Debug, Clone)]
pub struct SceneHistory {
    undo_stack: Vec<Vec<PlacedItem>>,
    redo_stack: Vec<Vec<PlacedItem>>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl SceneHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record a transition from `current` to `next` and return `next`.
    /// Clears the redo side.
    pub fn push(&mut self, current: Vec<PlacedItem>, next: Vec<PlacedItem>) -> Vec<PlacedItem> {
        self.undo_stack.push(current);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        next
    }

    /// Step back: `current` moves to the redo side and the previous
    /// snapshot is returned. `None` (and no change) when there is nothing
    /// to undo.
    pub fn undo(&mut self, current: &[PlacedItem]) -> Option<Vec<PlacedItem>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(previous)
    }

    pub fn redo(&mut self, current: &[PlacedItem]) -> Option<Vec<PlacedItem>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// ─── Mask ────────────────────────────────────────────────────────────────

/// Bitmap history of a mask session. The first entry is the freshly
/// cropped image and is never undone.
#[derive(Debug, Clone)]
pub struct MaskHistory {
    entries: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
}

impl Default for MaskHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl MaskHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(2),
        }
    }

    /// Reset to a single base entry.
    pub fn start(&mut self, base: Snapshot) {
        self.entries.clear();
        self.redo_stack.clear();
        self.entries.push(base);
    }

    /// Append a stroke result. Skipped (returns `false`) when identical to
    /// the latest entry.
    pub fn commit(&mut self, snapshot: Snapshot) -> bool {
        if self.entries.last() == Some(&snapshot) {
            return false;
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_depth {
            // keep the base crop
            self.entries.remove(1);
        }
        self.redo_stack.clear();
        true
    }

    /// Drop the latest stroke and return the snapshot to show. No-op at one
    /// entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.entries.len() <= 1 {
            return None;
        }
        let undone = self.entries.pop()?;
        self.redo_stack.push(undone);
        self.entries.last()
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.entries.push(snapshot);
        self.entries.last()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.redo_stack.clear();
    }
}
