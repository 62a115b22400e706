//! # Parameter Model
//!
//! A [`Parameter`] is a named variable whose values are produced by one of
//! four sources:
//!
//! | `type` | Shape | Rendered as |
//! |--------|-------|-------------|
//! | `integer` / `int` | `values = [1, 5, 9]` | decimal, optionally zero-padded |
//! | `integer` / `int` | `min = 1`, `max = 500` | decimal, optionally zero-padded |
//! | `string` / `text` | `values = ["a", "b"]` | as written |
//! | `string[]` / `text[]` | `length = 2`, `values = [["a", "b"], ...]` | one tuple per value |
//!
//! Every source has a fixed [`Parameter::value_count`] and renders its values
//! in declaration order. Rendering is lazy and can be restarted any number of
//! times by calling [`Parameter::render`] again.
//!
//! ```
//! use serial_stamp::params::{Parameter, Value};
//!
//! let serial = Parameter::range("serial", 8, 11, Some(3));
//! assert_eq!(serial.value_count(), 4);
//! let rendered: Vec<Value> = serial.render().collect();
//! assert_eq!(rendered[0], Value::Scalar("008".into()));
//! assert_eq!(rendered[3], Value::Scalar("011".into()));
//! ```

use serde::Deserialize;

/// One rendered parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Integer or string parameters render to a single string.
    Scalar(String),
    /// String-array parameters render to a fixed-length tuple.
    Record(Vec<String>),
}

/// The value source of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Explicit list of integers.
    IntegerList {
        values: Vec<i64>,
        leading_zeros: Option<usize>,
    },
    /// Inclusive integer range. `min > max` is empty.
    IntegerRange {
        min: i64,
        max: i64,
        leading_zeros: Option<usize>,
    },
    /// Explicit list of strings.
    StringList { values: Vec<String> },
    /// Explicit list of fixed-length string tuples.
    StringArrayList {
        length: usize,
        values: Vec<Vec<String>>,
    },
}

/// A named ticket variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawParameter")]
pub struct Parameter {
    pub name: String,
    pub source: ValueSource,
}

impl Parameter {
    pub fn integers(name: &str, values: Vec<i64>, leading_zeros: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            source: ValueSource::IntegerList {
                values,
                leading_zeros,
            },
        }
    }

    pub fn range(name: &str, min: i64, max: i64, leading_zeros: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            source: ValueSource::IntegerRange {
                min,
                max,
                leading_zeros,
            },
        }
    }

    pub fn strings<S: Into<String>>(name: &str, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.to_string(),
            source: ValueSource::StringList {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn records(name: &str, length: usize, values: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            source: ValueSource::StringArrayList { length, values },
        }
    }

    /// Number of values this parameter produces.
    pub fn value_count(&self) -> usize {
        match &self.source {
            ValueSource::IntegerList { values, .. } => values.len(),
            ValueSource::IntegerRange { min, max, .. } => {
                let span = *max as i128 - *min as i128 + 1;
                usize::try_from(span.max(0)).unwrap_or(usize::MAX)
            }
            ValueSource::StringList { values } => values.len(),
            ValueSource::StringArrayList { values, .. } => values.len(),
        }
    }

    /// Rendered value at `index`, or `None` past the end.
    pub fn value_at(&self, index: usize) -> Option<Value> {
        if index >= self.value_count() {
            return None;
        }
        let value = match &self.source {
            ValueSource::IntegerList {
                values,
                leading_zeros,
            } => Value::Scalar(format_integer(values[index], *leading_zeros)),
            ValueSource::IntegerRange {
                min, leading_zeros, ..
            } => {
                let n = *min as i128 + index as i128;
                Value::Scalar(format_integer(n, *leading_zeros))
            }
            ValueSource::StringList { values } => Value::Scalar(values[index].clone()),
            ValueSource::StringArrayList { values, .. } => Value::Record(values[index].clone()),
        };
        Some(value)
    }

    /// Start a fresh pass over the rendered values.
    pub fn render(&self) -> Values<'_> {
        Values {
            param: self,
            next: 0,
            count: self.value_count(),
        }
    }
}

fn format_integer<N: std::fmt::Display>(n: N, leading_zeros: Option<usize>) -> String {
    match leading_zeros {
        Some(width) if width > 0 => format!("{:0width$}", n, width = width),
        _ => n.to_string(),
    }
}

/// Lazy iterator over a parameter's rendered values.
#[derive(Debug, Clone)]
pub struct Values<'a> {
    param: &'a Parameter,
    next: usize,
    count: usize,
}

impl Iterator for Values<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.next >= self.count {
            return None;
        }
        let value = self.param.value_at(self.next);
        self.next += 1;
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Values<'_> {}

// ============================================================================
// DESERIALIZATION
// ============================================================================

/// Parameter as written in the spec file, before its variant is decided.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawParameter {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    values: Option<RawValues>,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default, alias = "leading_zeros")]
    leading_zeros: Option<usize>,
    #[serde(default)]
    length: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValues {
    Integers(Vec<i64>),
    Strings(Vec<String>),
    Rows(Vec<Vec<String>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Integer,
    String,
    StringArray,
}

impl TryFrom<RawParameter> for Parameter {
    type Error = String;

    fn try_from(raw: RawParameter) -> Result<Self, String> {
        let name = raw.name.clone();
        let kind = match raw.kind.as_deref() {
            Some("int") | Some("integer") => Kind::Integer,
            Some("string") | Some("text") => Kind::String,
            Some("string[]") | Some("text[]") => Kind::StringArray,
            Some(other) => {
                return Err(format!("parameter '{}': unknown type '{}'", name, other));
            }
            None => infer_kind(&raw),
        };

        let source = match kind {
            Kind::Integer => integer_source(&name, raw)?,
            Kind::String => string_source(&name, raw)?,
            Kind::StringArray => array_source(&name, raw)?,
        };

        Ok(Parameter { name, source })
    }
}

fn infer_kind(raw: &RawParameter) -> Kind {
    if raw.min.is_some() || raw.max.is_some() {
        return Kind::Integer;
    }
    if raw.length.is_some() {
        return Kind::StringArray;
    }
    match raw.values {
        Some(RawValues::Strings(_)) => Kind::String,
        Some(RawValues::Rows(_)) => Kind::StringArray,
        _ => Kind::Integer,
    }
}

fn integer_source(name: &str, raw: RawParameter) -> Result<ValueSource, String> {
    match (raw.values, raw.min, raw.max) {
        (Some(RawValues::Integers(values)), _, _) => Ok(ValueSource::IntegerList {
            values,
            leading_zeros: raw.leading_zeros,
        }),
        (Some(_), _, _) => Err(format!("parameter '{}': integer values expected", name)),
        (None, Some(min), Some(max)) => Ok(ValueSource::IntegerRange {
            min,
            max,
            leading_zeros: raw.leading_zeros,
        }),
        (None, _, _) => Err(format!(
            "parameter '{}': integer parameters need `values` or both `min` and `max`",
            name
        )),
    }
}

fn string_source(name: &str, raw: RawParameter) -> Result<ValueSource, String> {
    let values = match raw.values {
        Some(RawValues::Strings(values)) => values,
        Some(RawValues::Integers(v)) if v.is_empty() => Vec::new(),
        Some(RawValues::Integers(_)) => {
            return Err(format!(
                "parameter '{}': string values expected, found integers",
                name
            ));
        }
        Some(RawValues::Rows(_)) => {
            return Err(format!(
                "parameter '{}': string values expected, found arrays (use type \"string[]\")",
                name
            ));
        }
        None => return Err(format!("parameter '{}': missing `values`", name)),
    };
    Ok(ValueSource::StringList { values })
}

fn array_source(name: &str, raw: RawParameter) -> Result<ValueSource, String> {
    let values = match raw.values {
        Some(RawValues::Rows(rows)) => rows,
        // `values = []` parses as an empty integer list
        Some(RawValues::Integers(v)) if v.is_empty() => Vec::new(),
        Some(_) => {
            return Err(format!(
                "parameter '{}': string[] values must be arrays of strings",
                name
            ));
        }
        None => return Err(format!("parameter '{}': missing `values`", name)),
    };

    let length = match raw.length {
        Some(length) => length,
        None => values.first().map(Vec::len).unwrap_or(0),
    };

    if let Some((i, row)) = values.iter().enumerate().find(|(_, row)| row.len() != length) {
        return Err(format!(
            "parameter '{}': value {} has {} entries, expected {}",
            name,
            i,
            row.len(),
            length
        ));
    }

    Ok(ValueSource::StringArrayList { length, values })
}
