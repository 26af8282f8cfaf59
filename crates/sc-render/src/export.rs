//! Fixed-resolution PNG export.
//!
//! Export builds the card SVG without editor overlays, parses it with usvg,
//! and rasterizes it with resvg onto a pixmap of the configured size. The
//! card is always drawn at the output resolution regardless of how large
//! the editor preview happens to be on screen.

use crate::card::Overlays;
use crate::svg::render_card_svg;
use chrono::{DateTime, Utc};
use resvg::{tiny_skia, usvg};
use sc_core::{CanvasConfig, CardView, ComponentRegistry, ProfileRecord};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Filename stem; a timestamp and `.png` are appended.
    pub file_prefix: String,
    /// Load the host's installed fonts for card text.
    pub load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            file_prefix: "hybrid-share-card".to_string(),
            load_system_fonts: true,
        }
    }
}

/// Rasterization or encoding failure. Canvas state is never touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportFailure {
    #[error("could not build the card image: {0}")]
    Svg(String),

    #[error("could not allocate a {width}x{height} image")]
    Raster { width: u32, height: u32 },

    #[error("could not encode PNG: {0}")]
    Encode(String),

    #[error("an export is already in progress")]
    InFlight,
}

/// A finished export, ready to download or share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub filename: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// `hybrid-share-card-20260314-091502.png`
pub fn export_filename(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}.png", at.format("%Y%m%d-%H%M%S"))
}

/// Rasterizes cards. Holds the font database, which is costly to build, so
/// keep one renderer per session.
#[derive(Clone)]
pub struct ExportRenderer {
    config: ExportConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for ExportRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRenderer")
            .field("config", &self.config)
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl Default for ExportRenderer {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl ExportRenderer {
    pub fn new(config: ExportConfig) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        log::debug!("export font database ready: {} faces", db.len());
        Self {
            config,
            fontdb: Arc::new(db),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Register an extra font (TTF/OTF bytes). Hosts without system fonts,
    /// such as the browser, feed their card font through here.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        Arc::make_mut(&mut self.fontdb).load_font_data(data);
    }

    /// Export SVG: the card exactly as it will be rasterized.
    pub fn render_svg(
        &self,
        view: CardView<'_>,
        registry: &ComponentRegistry,
        profile: &ProfileRecord,
        canvas: &CanvasConfig,
    ) -> String {
        render_card_svg(view, registry, profile, canvas, &Overlays::NONE)
    }

    /// Rasterize the card to an RGBA pixmap at the output resolution.
    pub fn render_pixmap(
        &self,
        view: CardView<'_>,
        registry: &ComponentRegistry,
        profile: &ProfileRecord,
        canvas: &CanvasConfig,
    ) -> Result<tiny_skia::Pixmap, ExportFailure> {
        let svg = self.render_svg(view, registry, profile, canvas);

        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|e| ExportFailure::Svg(e.to_string()))?;

        let (width, height) = (self.config.width, self.config.height);
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(ExportFailure::Raster { width, height })?;

        // Uniform fit, centered: an output with a different aspect than the
        // canvas letterboxes instead of stretching the card.
        let size = tree.size();
        let scale = (width as f32 / size.width()).min(height as f32 / size.height());
        let dx = (width as f32 - size.width() * scale) / 2.0;
        let dy = (height as f32 - size.height() * scale) / 2.0;
        let transform = tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        Ok(pixmap)
    }

    /// Rasterize and PNG-encode the card.
    pub fn render_png(
        &self,
        view: CardView<'_>,
        registry: &ComponentRegistry,
        profile: &ProfileRecord,
        canvas: &CanvasConfig,
    ) -> Result<Vec<u8>, ExportFailure> {
        let pixmap = self.render_pixmap(view, registry, profile, canvas)?;
        pixmap
            .encode_png()
            .map_err(|e| ExportFailure::Encode(e.to_string()))
    }

    /// Full export: PNG bytes plus a timestamped filename.
    pub fn export(
        &self,
        view: CardView<'_>,
        registry: &ComponentRegistry,
        profile: &ProfileRecord,
        canvas: &CanvasConfig,
        at: DateTime<Utc>,
    ) -> Result<ExportedImage, ExportFailure> {
        let png = self.render_png(view, registry, profile, canvas)?;
        let image = ExportedImage {
            filename: export_filename(&self.config.file_prefix, at),
            png,
            width: self.config.width,
            height: self.config.height,
        };
        log::info!(
            "exported {} ({}x{}, {} bytes, {} widgets)",
            image.filename,
            image.width,
            image.height,
            image.png.len(),
            view.widgets.len()
        );
        Ok(image)
    }
}
