//! # Rendering Module
//!
//! Turns value assignments into pixels.
//!
//! ## Modules
//!
//! - [`font`]: Font resolution with a fallback chain and per-run cache
//! - [`text`]: Text rasterization (TrueType via ab_glyph, bundled bitmap font)
//! - [`page`]: Template composition, ticket drawing and page assembly

pub mod font;
pub mod page;
pub mod text;

pub use font::{Face, FontBook, FontConfig, FontHandle};
pub use page::{PageRenderer, compose_template, ticket_texts};
