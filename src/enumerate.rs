//! # Value-Space Enumerator
//!
//! Composes the spec's parameters (or its literal table) into one ordered
//! stream of per-ticket [`Assignment`]s.
//!
//! Parameters combine as a Cartesian product with the **last** parameter
//! varying fastest:
//!
//! ```text
//! A = [1, 2], B = [x, y]  →  (1, x), (1, y), (2, x), (2, y)
//! ```
//!
//! A table contributes its rows in file order. The stream is lazy and
//! restartable: every call to [`ValueSpace::iter`] starts a fresh pass, and a
//! pass can hand out bounded blocks with [`Tickets::next_block`] so a whole
//! run never has to be held in memory.

use std::iter::FusedIterator;

use crate::params::{Parameter, Value};
use crate::spec::{Row, Spec};
use crate::template::Variables;

/// The values for one ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment<'a> {
    /// One rendered value per parameter, in declaration order.
    Tuple(Vec<Value>),
    /// A table row.
    Row(&'a Row),
}

impl Assignment<'_> {
    /// Template bindings for this ticket.
    ///
    /// Tuple values bind to their parameter's name. A string-array value
    /// binds `name[i]` to its `i`-th entry and `name` to all entries joined
    /// by a space.
    pub fn variables(&self, params: &[Parameter]) -> Variables {
        let mut vars = Variables::new();
        match self {
            Assignment::Tuple(values) => {
                for (param, value) in params.iter().zip(values) {
                    match value {
                        Value::Scalar(s) => {
                            vars.insert(param.name.clone(), s.clone());
                        }
                        Value::Record(entries) => {
                            for (i, entry) in entries.iter().enumerate() {
                                vars.insert(format!("{}[{}]", param.name, i), entry.clone());
                            }
                            vars.insert(param.name.clone(), entries.join(" "));
                        }
                    }
                }
            }
            Assignment::Row(row) => {
                for (column, cell) in row.iter() {
                    vars.insert(column.clone(), cell.to_string());
                }
            }
        }
        vars
    }
}

/// The active ticket source of a spec.
#[derive(Debug, Clone, Copy)]
pub enum ValueSpace<'a> {
    Params(&'a [Parameter]),
    Table(&'a [Row]),
    Empty,
}

impl<'a> ValueSpace<'a> {
    /// Parameters take precedence over a table; neither yields no tickets.
    pub fn from_spec(spec: &'a Spec) -> Self {
        match (&spec.params, &spec.table) {
            (Some(params), _) => ValueSpace::Params(params),
            (None, Some(rows)) => ValueSpace::Table(rows),
            (None, None) => ValueSpace::Empty,
        }
    }

    /// Total number of tickets.
    ///
    /// Saturates at `usize::MAX` for absurdly large products.
    pub fn count(&self) -> usize {
        match self {
            ValueSpace::Params([]) => 0,
            ValueSpace::Params(params) => params
                .iter()
                .map(Parameter::value_count)
                .fold(1usize, |acc, n| acc.saturating_mul(n)),
            ValueSpace::Table(rows) => rows.len(),
            ValueSpace::Empty => 0,
        }
    }

    /// Start a fresh pass over all tickets.
    pub fn iter(&self) -> Tickets<'a> {
        match *self {
            ValueSpace::Params(params) => Tickets::Product(Product::new(params)),
            ValueSpace::Table(rows) => Tickets::Table(rows.iter()),
            ValueSpace::Empty => Tickets::Empty,
        }
    }
}

/// One pass over a value space.
#[derive(Debug, Clone)]
pub enum Tickets<'a> {
    Product(Product<'a>),
    Table(std::slice::Iter<'a, Row>),
    Empty,
}

impl<'a> Tickets<'a> {
    /// Take up to `len` further tickets as one contiguous block.
    pub fn next_block(&mut self, len: usize) -> Vec<Assignment<'a>> {
        self.by_ref().take(len).collect()
    }
}

impl<'a> Iterator for Tickets<'a> {
    type Item = Assignment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Tickets::Product(product) => product.next().map(Assignment::Tuple),
            Tickets::Table(rows) => rows.next().map(Assignment::Row),
            Tickets::Empty => None,
        }
    }
}

impl FusedIterator for Tickets<'_> {}

/// Cartesian product of parameter values, last parameter fastest.
///
/// Walks an odometer of per-parameter indices, so memory stays at one index
/// per parameter regardless of the product size.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    params: &'a [Parameter],
    counters: Vec<usize>,
    done: bool,
}

impl<'a> Product<'a> {
    pub fn new(params: &'a [Parameter]) -> Self {
        let done = params.is_empty() || params.iter().any(|p| p.value_count() == 0);
        Self {
            params,
            counters: vec![0; params.len()],
            done,
        }
    }

    fn advance(&mut self) {
        for (counter, param) in self.counters.iter_mut().zip(self.params).rev() {
            *counter += 1;
            if *counter < param.value_count() {
                return;
            }
            *counter = 0;
        }
        self.done = true;
    }
}

impl Iterator for Product<'_> {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        if self.done {
            return None;
        }
        let values = self
            .params
            .iter()
            .zip(&self.counters)
            .map(|(param, &i)| param.value_at(i))
            .collect::<Option<Vec<_>>>();
        self.advance();
        values
    }
}

impl FusedIterator for Product<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Cell;
    use pretty_assertions::assert_eq;

    fn flat(tickets: Tickets<'_>) -> Vec<Vec<String>> {
        tickets
            .map(|a| match a {
                Assignment::Tuple(values) => values
                    .into_iter()
                    .map(|v| match v {
                        Value::Scalar(s) => s,
                        Value::Record(r) => r.join("|"),
                    })
                    .collect(),
                Assignment::Row(row) => row.values().map(|c| c.to_string()).collect(),
            })
            .collect()
    }

    fn strs(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_last_parameter_varies_fastest() {
        let params = vec![
            Parameter::integers("a", vec![1, 2], None),
            Parameter::strings("b", ["x", "y"]),
        ];
        let space = ValueSpace::Params(&params);
        assert_eq!(space.count(), 4);
        assert_eq!(
            flat(space.iter()),
            strs(&[&["1", "x"], &["1", "y"], &["2", "x"], &["2", "y"]])
        );
    }

    #[test]
    fn test_three_parameters() {
        let params = vec![
            Parameter::integers("a", vec![1, 2], None),
            Parameter::strings("b", ["a"]),
            Parameter::strings("c", ["t", "f"]),
        ];
        let space = ValueSpace::Params(&params);
        assert_eq!(
            flat(space.iter()),
            strs(&[
                &["1", "a", "t"],
                &["1", "a", "f"],
                &["2", "a", "t"],
                &["2", "a", "f"],
            ])
        );
    }

    #[test]
    fn test_count_matches_product() {
        let params = vec![
            Parameter::range("a", 1, 3, None),
            Parameter::strings("b", ["x", "y"]),
            Parameter::integers("c", vec![7, 8, 9, 10], None),
        ];
        let space = ValueSpace::Params(&params);
        assert_eq!(space.count(), 24);
        assert_eq!(space.iter().count(), 24);
    }

    #[test]
    fn test_empty_parameter_short_circuits() {
        let params = vec![
            Parameter::integers("a", vec![1, 2], None),
            Parameter::range("b", 5, 1, None),
            Parameter::strings("c", ["a", "b"]),
        ];
        let space = ValueSpace::Params(&params);
        assert_eq!(space.count(), 0);
        assert_eq!(space.iter().next(), None);
    }

    #[test]
    fn test_no_parameters_is_empty() {
        let space = ValueSpace::Params(&[]);
        assert_eq!(space.count(), 0);
        assert_eq!(space.iter().count(), 0);
        assert_eq!(ValueSpace::Empty.iter().count(), 0);
    }

    #[test]
    fn test_restartable() {
        let params = vec![Parameter::range("n", 1, 5, None)];
        let space = ValueSpace::Params(&params);
        let mut pass = space.iter();
        pass.next();
        pass.next();
        assert_eq!(flat(space.iter()).len(), 5);
        assert_eq!(flat(pass).len(), 3);
    }

    #[test]
    fn test_next_block_is_bounded() {
        let params = vec![Parameter::range("n", 0, 9, None)];
        let space = ValueSpace::Params(&params);
        let mut pass = space.iter();
        assert_eq!(pass.next_block(4).len(), 4);
        assert_eq!(pass.next_block(4).len(), 4);
        assert_eq!(pass.next_block(4).len(), 2);
        assert!(pass.next_block(4).is_empty());
    }

    #[test]
    fn test_table_rows_in_order() {
        let rows: Vec<Row> = ["Ada", "Alan", "Grace"]
            .iter()
            .map(|n| Row::from([("name".to_string(), Cell::Text(n.to_string()))]))
            .collect();
        let space = ValueSpace::Table(&rows);
        assert_eq!(space.count(), 3);
        assert_eq!(flat(space.iter()), strs(&[&["Ada"], &["Alan"], &["Grace"]]));
    }

    #[test]
    fn test_variables_for_tuple() {
        let params = vec![
            Parameter::range("num", 1, 1, Some(3)),
            Parameter::records("seat", 2, vec![vec!["B".into(), "7".into()]]),
        ];
        let space = ValueSpace::Params(&params);
        let ticket = space.iter().next().unwrap();
        let vars = ticket.variables(&params);
        assert_eq!(vars["num"], "001");
        assert_eq!(vars["seat"], "B 7");
        assert_eq!(vars["seat[0]"], "B");
        assert_eq!(vars["seat[1]"], "7");
    }

    #[test]
    fn test_variables_for_row() {
        let row = Row::from([
            ("name".to_string(), Cell::Text("Ada".into())),
            ("seat".to_string(), Cell::Integer(12)),
        ]);
        let vars = Assignment::Row(&row).variables(&[]);
        assert_eq!(vars["name"], "Ada");
        assert_eq!(vars["seat"], "12");
    }
}
