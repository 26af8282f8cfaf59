//! Background catalog and uploaded images.
//!
//! Built-in gradients are a fixed table. User uploads live for the session
//! only; each is validated (image MIME type, size limit), stored with its
//! bytes encoded as a `data:` URL, and assigned a fresh id.

use crate::error::{StudioError, UploadRejection};
use crate::id::{BackgroundId, IdAllocator};
use crate::model::{Background, Color};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use smallvec::{SmallVec, smallvec};
use std::sync::{Arc, LazyLock};

/// Gradient applied when nothing else is chosen, and after the active upload
/// is deleted.
pub const DEFAULT_GRADIENT: &str = "midnight";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Direction in degrees, CSS convention (180 = top → bottom).
    pub angle_deg: f32,
    pub stops: SmallVec<[GradientStop; 4]>,
}

fn stop(offset: f32, hex: &str) -> GradientStop {
    GradientStop {
        offset,
        color: Color::from_hex(hex).unwrap_or(Color::BLACK),
    }
}

static CATALOG: LazyLock<Vec<GradientDef>> = LazyLock::new(|| {
    vec![
        GradientDef {
            id: "midnight",
            name: "Midnight",
            angle_deg: 180.0,
            stops: smallvec![stop(0.0, "#0F172A"), stop(1.0, "#1E3A8A")],
        },
        GradientDef {
            id: "sunset",
            name: "Sunset",
            angle_deg: 160.0,
            stops: smallvec![stop(0.0, "#F97316"), stop(1.0, "#DB2777")],
        },
        GradientDef {
            id: "aurora",
            name: "Aurora",
            angle_deg: 180.0,
            stops: smallvec![
                stop(0.0, "#10B981"),
                stop(0.5, "#3B82F6"),
                stop(1.0, "#8B5CF6")
            ],
        },
        GradientDef {
            id: "ember",
            name: "Ember",
            angle_deg: 200.0,
            stops: smallvec![stop(0.0, "#7F1D1D"), stop(1.0, "#F59E0B")],
        },
        GradientDef {
            id: "steel",
            name: "Steel",
            angle_deg: 180.0,
            stops: smallvec![stop(0.0, "#111827"), stop(1.0, "#6B7280")],
        },
        GradientDef {
            id: "neon",
            name: "Neon",
            angle_deg: 135.0,
            stops: smallvec![
                stop(0.0, "#0EA5E9"),
                stop(0.55, "#A855F7"),
                stop(1.0, "#EC4899")
            ],
        },
    ]
});

/// The fixed gradient table.
pub fn gradient_catalog() -> &'static [GradientDef] {
    &CATALOG
}

/// Look up a gradient; unknown ids resolve to the default gradient.
pub fn resolve_gradient(id: &str) -> &'static GradientDef {
    let catalog = gradient_catalog();
    catalog
        .iter()
        .find(|g| g.id == id)
        .or_else(|| catalog.iter().find(|g| g.id == DEFAULT_GRADIENT))
        .unwrap_or(&catalog[0])
}

/// Raster formats the export rasterizer can decode inside the card.
pub const ACCEPTED_MIME_TYPES: [&str; 5] =
    ["image/png", "image/jpeg", "image/jpg", "image/webp", "image/gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedBackground {
    pub id: BackgroundId,
    /// Display name (usually the original file name).
    pub name: String,
    pub mime: String,
    pub byte_len: usize,
    pub data_url: Arc<str>,
}

impl UploadedBackground {
    pub fn as_background(&self) -> Background {
        Background::Image {
            id: self.id,
            name: self.name.clone(),
            data_url: Arc::clone(&self.data_url),
        }
    }
}

/// Session-scoped background store.
#[derive(Debug, Default)]
pub struct BackgroundManager {
    uploads: Vec<UploadedBackground>,
    ids: IdAllocator,
    limits: UploadLimits,
}

impl BackgroundManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: UploadLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn gradients(&self) -> &'static [GradientDef] {
        gradient_catalog()
    }

    pub fn uploads(&self) -> &[UploadedBackground] {
        &self.uploads
    }

    pub fn upload(&self, id: BackgroundId) -> Option<&UploadedBackground> {
        self.uploads.iter().find(|u| u.id == id)
    }

    /// Check an upload without storing it.
    pub fn validate(&self, mime: &str, byte_len: usize) -> Result<(), UploadRejection> {
        let mime = mime.trim().to_ascii_lowercase();
        if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UploadRejection::NotAnImage { mime });
        }
        if byte_len == 0 {
            return Err(UploadRejection::Empty);
        }
        if byte_len > self.limits.max_bytes {
            return Err(UploadRejection::TooLarge {
                size: byte_len,
                limit: self.limits.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate and store an uploaded image. Rejected files leave the
    /// manager untouched.
    pub fn add_upload(
        &mut self,
        name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<&UploadedBackground, StudioError> {
        if let Err(rejection) = self.validate(mime, bytes.len()) {
            log::warn!("rejected background upload {name:?}: {rejection}");
            return Err(rejection.into());
        }

        let mime = mime.trim().to_ascii_lowercase();
        let data_url: Arc<str> = format!("data:{mime};base64,{}", STANDARD.encode(bytes)).into();
        let upload = UploadedBackground {
            id: self.ids.background("upload"),
            name: name.to_string(),
            mime,
            byte_len: bytes.len(),
            data_url,
        };
        log::debug!("stored background upload {} ({} bytes)", upload.id, upload.byte_len);
        self.uploads.push(upload);
        Ok(&self.uploads[self.uploads.len() - 1])
    }

    pub fn remove_upload(&mut self, id: BackgroundId) -> Option<UploadedBackground> {
        let pos = self.uploads.iter().position(|u| u.id == id)?;
        Some(self.uploads.remove(pos))
    }
}
