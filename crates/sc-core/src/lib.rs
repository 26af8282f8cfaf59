pub mod background;
pub mod error;
pub mod id;
pub mod model;
pub mod profile;
pub mod registry;
pub mod scaling;

pub use background::{BackgroundManager, DEFAULT_GRADIENT, GradientDef, UploadLimits};
pub use error::{StudioError, UploadRejection};
pub use id::{BackgroundId, WidgetId};
pub use model::*;
pub use profile::ProfileRecord;
pub use registry::{ComponentRegistry, DrawOp, RenderedContent};
pub use scaling::{ContentTransform, fit_content};
