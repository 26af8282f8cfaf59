use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for widget and background ids. Fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($sigil, "{}"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a placed widget. Stable for the whole editing session,
    /// including across undo/redo.
    WidgetId,
    "#"
);

interned_id!(
    /// Identifier of a user-uploaded background image.
    BackgroundId,
    "bg:"
);

/// Hands out session-unique ids with a type prefix (`dial_0`, `chip_1`, ...).
///
/// The counter only moves forward, so an id freed by delete (or resurrected
/// by undo) is never handed out again.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(&mut self, prefix: &str) -> WidgetId {
        WidgetId::intern(&self.next_name(prefix))
    }

    pub fn background(&mut self, prefix: &str) -> BackgroundId {
        BackgroundId::intern(&self.next_name(prefix))
    }

    fn next_name(&mut self, prefix: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("{prefix}_{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = WidgetId::intern("dial_7");
        let b = WidgetId::intern("dial_7");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "dial_7");
        assert_eq!(format!("{a:?}"), "#dial_7");
    }

    #[test]
    fn allocated_ids_are_unique_and_prefixed() {
        let mut ids = IdAllocator::new();
        let a = ids.widget("chip");
        let b = ids.widget("chip");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("chip_"));
        let bg = ids.background("upload");
        assert_eq!(bg.as_str(), "upload_2");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = WidgetId::intern("nameplate_3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"nameplate_3\"");
        let back: WidgetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
