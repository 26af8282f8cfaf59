pub mod card;
pub mod export;
pub mod hit;
pub mod paint;
pub mod svg;

pub use card::Overlays;
pub use export::{ExportConfig, ExportFailure, ExportRenderer, ExportedImage, export_filename};
pub use hit::{Hit, HitPart, ResizeAnchor, hit_test};
pub use paint::paint_card;
pub use svg::render_card_svg;
