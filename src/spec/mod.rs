//! # Generation Specification
//!
//! The declarative description of one generation run, usually read from a
//! `spec.toml` file:
//!
//! ```toml
//! stack-size = 10
//! source-image = "assets/ticket.png"
//!
//! [layout]
//! grid-size = [2, 5]
//! gap = [10, 5]
//! margin = 20
//!
//! [[texts]]
//! template = "No. $num"
//! position = [40, 12]
//! size = 24
//! color = "black"
//!
//! [[params]]
//! name = "num"
//! type = "integer"
//! min = 1
//! max = 500
//! leading-zeros = 3
//! ```
//!
//! Either `params` or `table` provides the ticket values; `params` win when
//! both are present. Values from a `table` are looked up by column name.

mod color;

pub use color::Color;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::enumerate::ValueSpace;
use crate::error::StampError;
use crate::params::Parameter;

fn default_stack_size() -> usize {
    1
}

fn default_text_size() -> u32 {
    16
}

fn default_text_color() -> Color {
    Color::BLACK
}

fn default_background() -> Color {
    Color::WHITE
}

/// Top-level specification for one generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Spec {
    /// Number of pages printed per stack (default: 1).
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,
    /// Template image path, relative to the project.
    #[serde(default)]
    pub source_image: String,
    pub layout: Layout,
    #[serde(default)]
    pub texts: Vec<Text>,
    #[serde(default)]
    pub params: Option<Vec<Parameter>>,
    #[serde(default)]
    pub table: Option<Vec<Row>>,
    #[serde(default)]
    pub output: Output,
    /// Page background behind and between tickets.
    #[serde(default = "default_background")]
    pub background: Color,
}

impl Spec {
    /// Parse and validate a TOML specification.
    pub fn from_toml_str(text: &str) -> Result<Self, StampError> {
        let spec: Spec = toml::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Read, parse and validate a TOML specification file.
    pub fn load(path: &Path) -> Result<Self, StampError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), StampError> {
        if self.stack_size == 0 {
            return Err(StampError::Config("stack-size must be at least 1".into()));
        }
        let (cols, rows) = self.layout.grid_size;
        if cols
            .checked_mul(rows)
            .and_then(|area| area.checked_mul(self.stack_size))
            .is_none()
        {
            return Err(StampError::Config(format!(
                "grid-size [{}, {}] with stack-size {} is too large",
                cols, rows, self.stack_size
            )));
        }
        if self.params.is_some() && self.table.is_some() {
            log::warn!("Both `params` and `table` are set; `table` is ignored");
        }
        if let Some(params) = &self.params {
            for (i, p) in params.iter().enumerate() {
                if p.name.is_empty() {
                    return Err(StampError::Config(format!("parameter {} has no name", i)));
                }
                if params[..i].iter().any(|q| q.name == p.name) {
                    return Err(StampError::Config(format!(
                        "parameter '{}' is declared twice",
                        p.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// The ordered ticket value space described by this spec.
    pub fn value_space(&self) -> ValueSpace<'_> {
        ValueSpace::from_spec(self)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Grid, gap and margin of a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Layout {
    /// Grid dimensions as `(columns, rows)`.
    pub grid_size: (usize, usize),
    #[serde(default)]
    pub gap: Gap,
    #[serde(default)]
    pub margin: Margin,
}

impl Layout {
    pub fn grid_area(&self) -> usize {
        self.grid_size.0.saturating_mul(self.grid_size.1)
    }
}

/// Space between adjacent tickets.
///
/// Written as a single number or an `[x, y]` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "RawGap")]
pub struct Gap {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGap {
    Uniform(f64),
    Pair([f64; 2]),
}

impl From<RawGap> for Gap {
    fn from(raw: RawGap) -> Self {
        match raw {
            RawGap::Uniform(g) => Gap { x: g, y: g },
            RawGap::Pair([x, y]) => Gap { x, y },
        }
    }
}

/// Page margin, normalized to four edges.
///
/// Written as a single number, a `[vertical, horizontal]` pair, or
/// `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawMargin")]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(m: f64) -> Self {
        Margin {
            top: m,
            right: m,
            bottom: m,
            left: m,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMargin {
    Uniform(f64),
    Edges(Vec<f64>),
}

impl TryFrom<RawMargin> for Margin {
    type Error = String;

    fn try_from(raw: RawMargin) -> Result<Self, String> {
        match raw {
            RawMargin::Uniform(m) => Ok(Margin::uniform(m)),
            RawMargin::Edges(edges) => match edges.as_slice() {
                [v, h] => Ok(Margin {
                    top: *v,
                    right: *h,
                    bottom: *v,
                    left: *h,
                }),
                [top, right, bottom, left] => Ok(Margin {
                    top: *top,
                    right: *right,
                    bottom: *bottom,
                    left: *left,
                }),
                _ => Err(format!(
                    "margin needs 1, 2 or 4 values, got {}",
                    edges.len()
                )),
            },
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// A text element drawn on every ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct Text {
    /// Template with `$name` placeholders.
    pub template: String,
    /// Top-left corner of the text, in ticket pixels.
    pub position: (f32, f32),
    /// Font file; the platform default font is used when absent.
    #[serde(default)]
    pub ttf: Option<String>,
    /// Em size in pixels.
    #[serde(default = "default_text_size")]
    pub size: u32,
    #[serde(default = "default_text_color")]
    pub color: Color,
}

/// Output options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Output {
    /// Fill behind the source image in each ticket.
    #[serde(default = "default_background")]
    pub background_color: Color,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            background_color: default_background(),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// One table row: column name → cell.
pub type Row = BTreeMap<String, Cell>;

/// A table cell as written in the spec file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Float(x) => f.write_str(&format_float(*x)),
            Cell::Boolean(true) => f.write_str("True"),
            Cell::Boolean(false) => f.write_str("False"),
        }
    }
}

/// Shortest round-trip form, switching to an exponent outside `1e-4..1e16`
/// and keeping a trailing `.0` on whole numbers.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let magnitude = x.abs();
    if x != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", x);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }
    if x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}
