//! # Template Substitution
//!
//! Replaces `$name` references in a text template with per-ticket values.
//!
//! ## Rules
//!
//! - `$` introduces a variable reference.
//! - The **longest** variable name that prefixes the text after `$` wins, so
//!   `$namespace` resolves to `namespace` even when `name` is also defined.
//! - `$$` always produces a single literal `$`.
//! - A `$` that matches no variable is kept literally and reported; scanning
//!   resumes at the next character.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use serial_stamp::template::substitute;
//!
//! let vars = HashMap::from([("item".to_string(), "book".to_string())]);
//! assert_eq!(substitute("$$50 for $item", &vars), "$50 for book");
//! ```

use std::collections::HashMap;

/// Name → value bindings for one ticket.
pub type Variables = HashMap<String, String>;

/// Result of a substitution together with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The substituted text.
    pub text: String,
    /// Remainder of the template after each `$` that matched no variable.
    pub unmatched: Vec<String>,
}

/// Substitute variables, logging a warning for each unmatched `$`.
pub fn substitute(template: &str, vars: &Variables) -> String {
    let result = substitute_report(template, vars);
    for rest in &result.unmatched {
        log::warn!("Unknown variable at ${}", rest);
    }
    result.text
}

/// Substitute variables and return the unmatched references instead of logging them.
pub fn substitute_report(template: &str, vars: &Variables) -> Substitution {
    let mut text = String::with_capacity(template.len());
    let mut unmatched = Vec::new();
    let mut rest = template;

    while let Some(index) = rest.find('$') {
        text.push_str(&rest[..index]);
        rest = &rest[index + 1..];

        match longest_match(rest, vars) {
            Some((key_len, value)) => {
                text.push_str(value);
                rest = &rest[key_len..];
            }
            None => {
                unmatched.push(rest.to_string());
                text.push('$');
            }
        }
    }
    text.push_str(rest);

    Substitution { text, unmatched }
}

/// Find the longest variable name prefixing `rest`.
///
/// `$` itself is always bound to a literal `$`, shadowing any user variable
/// of that name.
fn longest_match<'v>(rest: &str, vars: &'v Variables) -> Option<(usize, &'v str)> {
    let mut best: Option<(usize, &'v str)> = if rest.starts_with('$') {
        Some((1, "$"))
    } else {
        None
    };

    for (name, value) in vars {
        if name.is_empty() || name == "$" || !rest.starts_with(name.as_str()) {
            continue;
        }
        if best.is_none_or(|(len, _)| name.len() > len) {
            best = Some((name.len(), value.as_str()));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(substitute("No variables here", &vars(&[])), "No variables here");
        assert_eq!(substitute("", &vars(&[])), "");
    }

    #[test]
    fn test_single_variable() {
        let v = vars(&[("num", "042")]);
        assert_eq!(substitute("Ticket #$num", &v), "Ticket #042");
        assert_eq!(substitute("$num", &v), "042");
    }

    #[test]
    fn test_dollar_escape() {
        let v = vars(&[("item", "book")]);
        assert_eq!(substitute("$$50 for $item", &v), "$50 for book");
        assert_eq!(substitute("$$$$", &v), "$$");
    }

    #[test]
    fn test_longest_match_wins() {
        let v = vars(&[("var", "short"), ("variable", "long")]);
        assert_eq!(substitute("$variable and $var", &v), "long and short");
    }

    #[test]
    fn test_prefix_followed_by_text() {
        let v = vars(&[("n", "7")]);
        assert_eq!(substitute("$nth", &v), "7th");
    }

    #[test]
    fn test_unknown_variable_kept_and_reported() {
        let result = substitute_report("$x", &vars(&[]));
        assert_eq!(result.text, "$x");
        assert_eq!(result.unmatched, vec!["x".to_string()]);
    }

    #[test]
    fn test_unknown_variable_does_not_stop_scanning() {
        let v = vars(&[("a", "1")]);
        let result = substitute_report("$zz $a $", &v);
        assert_eq!(result.text, "$zz 1 $");
        assert_eq!(result.unmatched, vec!["zz $a $".to_string(), "".to_string()]);
    }

    #[test]
    fn test_dollar_variable_cannot_be_overridden() {
        let v = vars(&[("$", "X")]);
        assert_eq!(substitute("$$", &v), "$");
    }

    #[test]
    fn test_multibyte_text() {
        let v = vars(&[("名前", "太郎"), ("x", "€")]);
        assert_eq!(substitute("こんにちは $名前 $x!", &v), "こんにちは 太郎 €!");
    }
}
