//! Keyboard bindings for the stage designer.
//!
//! Key + modifier combos resolve to a `ShortcutAction`; the designer decides
//! what each action means in the current edit mode.

/// Designer commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    ToggleLock,
    /// Quick save to the single slot.
    Save,

    // ── Z-order ──
    BringToFront,
    SendToBack,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,

    // ── Selection ──
    Deselect,
}

/// Key binding table. `ctrl` and `meta` are interchangeable so ⌘ works on
/// macOS and Ctrl elsewhere.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the DOM `KeyboardEvent.key` string, e.g. `"z"` or
    /// `"Backspace"`. Unbound combos give `None`.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "l" | "L" => Some(ShortcutAction::ToggleLock),
                "s" | "S" => Some(ShortcutAction::Save),
                "]" => Some(ShortcutAction::BringToFront),
                "[" => Some(ShortcutAction::SendToBack),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_and_redo_bindings() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z → Redo
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn delete_and_escape_need_no_modifier() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn item_commands_need_cmd() {
        assert_eq!(
            ShortcutMap::resolve("d", false, false, false, true),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(
            ShortcutMap::resolve("l", true, false, false, false),
            Some(ShortcutAction::ToggleLock)
        );
        assert_eq!(
            ShortcutMap::resolve("]", true, false, false, false),
            Some(ShortcutAction::BringToFront)
        );
        assert_eq!(
            ShortcutMap::resolve("[", true, false, false, false),
            Some(ShortcutAction::SendToBack)
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, true),
            Some(ShortcutAction::Save)
        );
    }

    #[test]
    fn unbound_combos_resolve_to_none() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Delete", false, true, false, false), None);
    }
}
