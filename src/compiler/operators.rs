//! Operator registry
//!
//! Maps selector operator symbols to single-field predicate builders.
//!
//! | symbol | condition |
//! |--------|-----------|
//! | `=`    | equality, value as-is |
//! | `!=`   | inequality, value as-is |
//! | `>` `>=` | numeric, value parsed as float unless the field is the left bound |
//! | `<` `<=` | numeric, value parsed as float unless the field is the right bound |
//! | `^=`   | starts with |
//! | `$=`   | ends with |
//! | `~=`   | whole word, bounded by non-word characters |
//! | `\|=`  | starts with value followed by `-` |
//! | `*=`   | contains |
//!
//! String operators are case-insensitive and match the value literally.

use std::fmt;

use serde_json::{Number, Value};

use crate::config::SelectConfig;
use crate::selector::Term;

use super::predicate::{Condition, Pattern, Predicate};

/// Supported selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    StartsWith,
    EndsWith,
    Word,
    HyphenPrefix,
    Contains,
}

impl Operator {
    /// Every supported operator
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Word,
        Operator::HyphenPrefix,
        Operator::Contains,
    ];

    /// Looks up an operator by its selector symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Gte),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Lte),
            "^=" => Some(Operator::StartsWith),
            "$=" => Some(Operator::EndsWith),
            "~=" => Some(Operator::Word),
            "|=" => Some(Operator::HyphenPrefix),
            "*=" => Some(Operator::Contains),
            _ => None,
        }
    }

    /// Returns the selector symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::StartsWith => "^=",
            Operator::EndsWith => "$=",
            Operator::Word => "~=",
            Operator::HyphenPrefix => "|=",
            Operator::Contains => "*=",
        }
    }

    /// Returns true for the regex-backed string operators
    pub fn is_string_match(&self) -> bool {
        matches!(
            self,
            Operator::StartsWith
                | Operator::EndsWith
                | Operator::Word
                | Operator::HyphenPrefix
                | Operator::Contains
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Immutable operator table
///
/// Holds only the two reserved boundary field paths, so one registry can be
/// shared read-only between any number of concurrent selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorRegistry {
    left_field: String,
    right_field: String,
}

impl OperatorRegistry {
    /// Creates a registry using the boundary fields of `config`
    pub fn new(config: &SelectConfig) -> Self {
        Self {
            left_field: config.left_field(),
            right_field: config.right_field(),
        }
    }

    /// Returns the operator for a symbol, if registered
    pub fn lookup(&self, symbol: &str) -> Option<Operator> {
        Operator::from_symbol(symbol)
    }

    /// True when the term's operator is registered
    pub fn is_registered(&self, term: &Term) -> bool {
        self.lookup(&term.operator).is_some()
    }

    /// Builds the single-field predicate for a term. Returns None only for
    /// an unregistered operator.
    pub fn build(&self, term: &Term) -> Option<Predicate> {
        let operator = self.lookup(&term.operator)?;
        Some(Predicate::field(term.field.clone(), self.condition(operator, term)))
    }

    fn condition(&self, operator: Operator, term: &Term) -> Condition {
        match operator {
            Operator::Eq => Condition::Eq(term.value.to_json()),
            Operator::Ne => Condition::Ne(term.value.to_json()),
            Operator::Gt => Condition::Gt(self.lower_bound(term)),
            Operator::Gte => Condition::Gte(self.lower_bound(term)),
            Operator::Lt => Condition::Lt(self.upper_bound(term)),
            Operator::Lte => Condition::Lte(self.upper_bound(term)),
            Operator::StartsWith => regex_condition(format!("^{}", escaped(term))),
            Operator::EndsWith => regex_condition(format!("{}$", escaped(term))),
            Operator::Word => regex_condition(format!(r"\W{}\W", escaped(term))),
            Operator::HyphenPrefix => regex_condition(format!("^{}-", escaped(term))),
            Operator::Contains => regex_condition(escaped(term)),
        }
    }

    // The left bound is compared as stored; every other field numerically.
    fn lower_bound(&self, term: &Term) -> Value {
        if term.field == self.left_field {
            term.value.to_json()
        } else {
            numeric(term)
        }
    }

    fn upper_bound(&self, term: &Term) -> Value {
        if term.field == self.right_field {
            term.value.to_json()
        } else {
            numeric(term)
        }
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new(&SelectConfig::default())
    }
}

fn escaped(term: &Term) -> String {
    regex::escape(&term.value.to_string())
}

fn regex_condition(source: String) -> Condition {
    Condition::Regex(Pattern::case_insensitive(source))
}

/// Numeric form of a term value. Unparseable text becomes null, which no
/// stored number compares against. Infinities have no JSON form and are
/// clamped to the largest finite magnitude.
fn numeric(term: &Term) -> Value {
    parse_float(&term.value.to_string())
        .map(|value| value.clamp(f64::MIN, f64::MAX))
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Parses the longest leading decimal literal of `text`, after leading
/// whitespace: `"12.5kg"` is 12.5, `" -3e2"` is -300, `"abc"` is None.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let rest = &text[end..];
    if rest.starts_with("Infinity") {
        let infinity = if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some(infinity);
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}
