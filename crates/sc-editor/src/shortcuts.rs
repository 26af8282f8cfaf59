//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Delete is the
//! only shortcut that mutates the card; undo/redo and everything else are
//! driven from toolbar buttons.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Delete the selected widget (locked or not).
    Delete,
    /// Clear the selection.
    Deselect,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Delete"`).
    /// Returns `None` if the key combo has no binding. Combos with the
    /// command key are left to the host (browser shortcuts).
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() || modifiers.alt {
            return None;
        }
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
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        // Shift does not change the meaning of Delete.
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Delete", shift), Some(ShortcutAction::Delete));
    }

    #[test]
    fn resolve_escape_deselects() {
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn command_combos_are_not_bound() {
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Backspace", cmd), None);
        assert_eq!(ShortcutMap::resolve("z", cmd), None);
        assert_eq!(ShortcutMap::resolve("a", Modifiers::NONE), None);
    }
}
