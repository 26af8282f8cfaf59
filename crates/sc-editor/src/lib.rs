//! Share Card Studio editor engine: canvas store, undo/redo, gestures,
//! sharing, and the editing session.

pub mod history;
pub mod input;
pub mod session;
pub mod share;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use history::{History, HistoryConfig};
pub use input::{InputEvent, Modifiers};
pub use session::{ExportTicket, ExportTrigger, ProfileError, ProfileLoadConfig, ProfileSource, Studio, StudioConfig};
pub use share::{DialogEffect, ShareAction, ShareDialog, ShareHost, ShareOutcome, SharePayload};
pub use store::{CanvasStore, Reorder, StoreConfig};
pub use tools::{DragResizeController, Gesture};
