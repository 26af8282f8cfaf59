//! Error taxonomy for editor operations.
//!
//! Every error here is recovered at the operation boundary: the failing call
//! returns `Err`, canvas state is untouched, and `Display` gives the message
//! shown to the user.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StudioError {
    /// A widget was added before the profile/score data finished loading.
    #[error("profile data is not loaded yet; widgets can be added once it arrives")]
    NoData,

    /// A background upload was rejected. Nothing was stored.
    #[error("background upload rejected: {0}")]
    InvalidUpload(#[from] UploadRejection),

    /// A palette entry named a widget type the editor does not know.
    #[error("unknown component type `{0}`")]
    UnknownWidget(String),
}

/// Why an uploaded background was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("`{mime}` is not a supported image type (PNG, JPEG, WebP or GIF)")]
    NotAnImage { mime: String },

    #[error("file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("file is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, StudioError>;
