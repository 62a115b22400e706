//! # serial-stamp - Ticket Sheet Generator
//!
//! serial-stamp tiles numbered copies of a template image into printable
//! pages. Each copy gets its own text, drawn from parameter combinations or a
//! table, and the pages are ordered so that a print shop can cut the sheets
//! and stack them into sequentially numbered piles.
//!
//! - **Spec**: TOML description of grid, text elements and parameters
//! - **Enumeration**: lazy Cartesian product of parameter values
//! - **Stack planning**: strided cell assignment for cut-and-stack printing
//! - **Rendering**: template composition and text drawing
//! - **Output**: multi-page PDF at print resolution
//!
//! ## Quick Start
//!
//! ```no_run
//! use serial_stamp::{Project, output::PdfFile};
//! use std::path::Path;
//!
//! let project = Project::open(Path::new("tickets/"))?;
//! let engine = project.engine()?;
//!
//! let plan = engine.plan();
//! println!("{} tickets on {} pages", plan.ticket_count, plan.total_pages);
//!
//! engine.generate(Path::new("tickets.pdf"), |p| {
//!     println!("page {}/{}", p.page, p.total);
//! })?;
//! # Ok::<(), serial_stamp::StampError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`spec`] | Specification model and TOML loading |
//! | [`params`] | Parameter variants and value rendering |
//! | [`enumerate`] | Value-space enumeration |
//! | [`template`] | `$name` substitution |
//! | [`layout`] | Grid geometry |
//! | [`plan`] | Stack and page planning |
//! | [`render`] | Fonts, text and page rendering |
//! | [`output`] | PDF and in-memory page sinks |
//! | [`engine`] | Generation orchestration |
//! | [`worker`] | Background generation with progress events |
//! | [`project`] | Project directories and `.stamp` archives |
//! | [`server`] | HTTP preview server (feature `server`) |
//! | [`error`] | Error types |

pub mod engine;
pub mod enumerate;
pub mod error;
pub mod layout;
pub mod output;
pub mod params;
pub mod plan;
pub mod project;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod spec;
pub mod template;
pub mod worker;

// Re-exports for convenience
pub use engine::{CancelToken, Engine, Progress, Summary};
pub use error::StampError;
pub use plan::StackPlan;
pub use project::Project;
pub use spec::Spec;
