//! Symbolic unit algebra over free-text unit labels.
//!
//! A label such as `"kg m/s^2"` is parsed into a vector of `(term, exponent)`
//! pairs. Units multiply and divide by adding and subtracting exponents, and
//! terms whose exponent reaches zero cancel. No physical knowledge is
//! involved: `"N"` and `"kg m/s^2"` are different units here, and so are
//! `"mm"` and `"m"`.
//!
//! # Label grammar
//!
//! - Terms are separated by whitespace, `*`, `·` or `⋅`.
//! - A `/` moves every following term into the denominator.
//! - A term may carry an integer exponent: `s^2`, `s^-1`, `m²`, `s⁻¹`.
//! - Parentheses are grouping only; `1` and `dimensionless` contribute nothing.
//!
//! ```
//! use sanity_core::units::{UnitExpr, UnitOp};
//!
//! let torque = UnitExpr::parse("N m");
//! let length = UnitExpr::parse("m");
//! let force = UnitExpr::combine(&torque, &length, UnitOp::Divide).unwrap();
//! assert_eq!(force.label(), "N");
//! ```
//!
//! Exponents are `i32`. Operations that would overflow one return `None`
//! instead of wrapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used for display when a unit has no terms
pub const DIMENSIONLESS: &str = "dimensionless";

/// Binary operation on units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitOp {
    Multiply,
    Divide,
}

/// A unit as an exponent vector over symbolic terms.
///
/// Terms keep their order of first appearance so labels render the way the
/// user wrote them; equality ignores that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitExpr {
    terms: Vec<(String, i32)>,
}

impl UnitExpr {
    /// The dimensionless unit (no terms)
    pub const fn dimensionless() -> Self {
        Self { terms: Vec::new() }
    }

    /// Parse a free-text unit label. Parsing never fails; unrecognised
    /// fragments become opaque terms.
    pub fn parse(label: &str) -> Self {
        let mut unit = Self::dimensionless();
        let mut denominator = false;
        let mut token = String::new();

        for c in label.chars() {
            match c {
                '/' => {
                    unit.push_token(&token, denominator);
                    token.clear();
                    denominator = true;
                }
                c if c.is_whitespace() || matches!(c, '*' | '·' | '⋅' | '(' | ')') => {
                    unit.push_token(&token, denominator);
                    token.clear();
                }
                c => token.push(c),
            }
        }
        unit.push_token(&token, denominator);
        unit
    }

    fn push_token(&mut self, token: &str, denominator: bool) {
        let token = token.trim();
        if token.is_empty() || token == "1" || token.eq_ignore_ascii_case(DIMENSIONLESS) {
            return;
        }
        let (name, exponent) = split_exponent(token);
        if name.is_empty() || name.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return;
        }
        let signed = if denominator {
            exponent.checked_neg()
        } else {
            Some(exponent)
        };
        if signed.and_then(|e| self.add_term(name, e)).is_none() {
            // Out-of-range exponent: keep the whole fragment as an opaque term
            let _ = self.add_term(token, if denominator { -1 } else { 1 });
        }
    }

    /// Add `exponent` to `name`'s exponent. `None` (and no change) on overflow.
    fn add_term(&mut self, name: &str, exponent: i32) -> Option<()> {
        if let Some(pos) = self.terms.iter().position(|(t, _)| t == name) {
            let sum = self.terms[pos].1.checked_add(exponent)?;
            if sum == 0 {
                self.terms.remove(pos);
            } else {
                self.terms[pos].1 = sum;
            }
        } else if exponent != 0 {
            self.terms.push((name.to_string(), exponent));
        }
        Some(())
    }

    /// Multiply or divide two units, cancelling common terms.
    ///
    /// `None` when a resulting exponent does not fit in an `i32`.
    pub fn combine(a: &UnitExpr, b: &UnitExpr, op: UnitOp) -> Option<UnitExpr> {
        let mut out = a.clone();
        for (name, exponent) in &b.terms {
            let exponent = match op {
                UnitOp::Multiply => *exponent,
                UnitOp::Divide => exponent.checked_neg()?,
            };
            out.add_term(name, exponent)?;
        }
        Some(out)
    }

    /// Raise to an integer power, `None` on exponent overflow
    pub fn powi(&self, n: i32) -> Option<UnitExpr> {
        if n == 0 {
            return Some(Self::dimensionless());
        }
        let terms = self
            .terms
            .iter()
            .map(|(name, exponent)| Some((name.clone(), exponent.checked_mul(n)?)))
            .collect::<Option<Vec<_>>>()?;
        Some(UnitExpr { terms })
    }

    pub fn is_dimensionless(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms with their exponents, in order of first appearance
    pub fn terms(&self) -> impl Iterator<Item = (&str, i32)> {
        self.terms.iter().map(|(t, e)| (t.as_str(), *e))
    }

    /// Exponent-vector equality, independent of term order
    pub fn equals_structurally(&self, other: &UnitExpr) -> bool {
        self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .all(|(name, exponent)| other.exponent_of(name) == *exponent)
    }

    fn exponent_of(&self, name: &str) -> i32 {
        self.terms
            .iter()
            .find(|(t, _)| t == name)
            .map(|(_, e)| *e)
            .unwrap_or(0)
    }

    /// Simplified label: numerator terms, then `/` and denominator terms.
    /// Dimensionless renders as `""`.
    pub fn label(&self) -> String {
        let numerator: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, e)| *e > 0)
            .map(|(t, e)| render_term(t, e.unsigned_abs()))
            .collect();
        let denominator: Vec<String> = self
            .terms
            .iter()
            .filter(|(_, e)| *e < 0)
            .map(|(t, e)| render_term(t, e.unsigned_abs()))
            .collect();

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => String::new(),
            (false, true) => numerator.join(" "),
            (true, false) => format!("1/{}", denominator.join(" ")),
            (false, false) => format!("{}/{}", numerator.join(" "), denominator.join(" ")),
        }
    }

    /// Like [`label`](Self::label) but renders no terms as `dimensionless`
    pub fn display_label(&self) -> String {
        if self.is_dimensionless() {
            DIMENSIONLESS.to_string()
        } else {
            self.label()
        }
    }
}

impl PartialEq for UnitExpr {
    fn eq(&self, other: &Self) -> bool {
        self.equals_structurally(other)
    }
}

impl fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_label())
    }
}

/// Structural equality of two raw labels
pub fn equals_structurally(a: &str, b: &str) -> bool {
    UnitExpr::parse(a).equals_structurally(&UnitExpr::parse(b))
}

/// Combine two raw labels, returning the simplified label
pub fn combine_labels(a: &str, b: &str, op: UnitOp) -> Option<String> {
    UnitExpr::combine(&UnitExpr::parse(a), &UnitExpr::parse(b), op).map(|u| u.label())
}

/// Render `""` as `dimensionless`, anything else verbatim
pub fn display_label(label: &str) -> &str {
    if label.trim().is_empty() {
        DIMENSIONLESS
    } else {
        label
    }
}

fn render_term(name: &str, exponent: u32) -> String {
    if exponent == 1 {
        name.to_string()
    } else {
        format!("{name}^{exponent}")
    }
}

/// Split `s^2` / `s^-1` / `m²` / `s⁻¹` into name and exponent. Malformed
/// exponents leave the token intact as an opaque name.
fn split_exponent(token: &str) -> (&str, i32) {
    if let Some((name, exp)) = token.split_once('^') {
        return match exp.trim_start_matches('+').parse::<i32>() {
            Ok(exponent) => (name, exponent),
            Err(_) => (token, 1),
        };
    }

    let split = token
        .char_indices()
        .find(|(_, c)| superscript_digit(*c).is_some() || *c == '⁻')
        .map(|(i, _)| i);
    let Some(split) = split else {
        return (token, 1);
    };

    let (name, sup) = token.split_at(split);
    let mut negative = false;
    let mut exponent: i32 = 0;
    for (i, c) in sup.chars().enumerate() {
        match (i, c, superscript_digit(c)) {
            (0, '⁻', _) => negative = true,
            (_, _, Some(d)) => exponent = exponent.saturating_mul(10).saturating_add(d),
            _ => return (token, 1),
        }
    }
    if negative {
        exponent = -exponent;
    }
    (name, exponent)
}

fn superscript_digit(c: char) -> Option<i32> {
    match c {
        '⁰' => Some(0),
        '¹' => Some(1),
        '²' => Some(2),
        '³' => Some(3),
        '⁴' => Some(4),
        '⁵' => Some(5),
        '⁶' => Some(6),
        '⁷' => Some(7),
        '⁸' => Some(8),
        '⁹' => Some(9),
        _ => None,
    }
}
