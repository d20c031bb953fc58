//! FILENAME: engine/src/formula.rs
//! PURPOSE: The Formula façade -- an adapter around the `parser` crate's
//! AST that exposes evaluation, canonical reprint, and reference extraction.
//! CONTEXT: The parser crate knows nothing about `Position` or a sheet; this
//! module is where a raw cell-reference label becomes a validated `Position`
//! and where lookup-time coercion and arithmetic error classification live.

use parser::{ast::BinaryOperator, Expression};
use std::fmt::Write as _;

use crate::position::Position;
use crate::value::{FormulaError, Value};

pub use parser::ParseError as FormulaParseError;

/// A parsed formula, independent of any particular sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expression,
}

impl Formula {
    /// Parses the substring after the leading `=` sign.
    pub fn parse(src: &str) -> Result<Formula, FormulaParseError> {
        let expr = parser::parse(src)?;
        Ok(Formula { expr })
    }

    /// Canonical reprint: precedence-aware, no unnecessary parentheses,
    /// idempotent under repeated parse/reprint round trips.
    pub fn expression(&self) -> String {
        let mut out = String::new();
        print_expr(&self.expr, 0, &mut out);
        out
    }

    /// Every distinct, in-range cell reference the formula names, in the
    /// order first encountered. Labels that fail to resolve to a
    /// `Position`, or resolve to an out-of-range one, are dropped.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut seen = Vec::new();
        collect_refs(&self.expr, &mut seen);
        seen
    }

    /// Evaluates the formula against a cell-value lookup. Any
    /// `FormulaError` produced by the lookup or by arithmetic is returned
    /// as the formula's own result, never propagated as a Rust panic or
    /// further wrapped.
    pub fn evaluate(&self, lookup: &dyn Fn(Position) -> Value) -> Result<f64, FormulaError> {
        eval(&self.expr, lookup)
    }
}

fn collect_refs(expr: &Expression, out: &mut Vec<Position>) {
    match expr {
        Expression::Number(_) => {}
        Expression::CellRef(label) => {
            if let Ok(pos) = Position::parse(label) {
                if pos.is_valid() && !out.contains(&pos) {
                    out.push(pos);
                }
            }
        }
        Expression::Neg(inner) => collect_refs(inner, out),
        Expression::BinaryOp { left, right, .. } => {
            collect_refs(left, out);
            collect_refs(right, out);
        }
    }
}

fn eval(expr: &Expression, lookup: &dyn Fn(Position) -> Value) -> Result<f64, FormulaError> {
    match expr {
        Expression::Number(n) => Ok(*n),
        Expression::CellRef(label) => {
            let pos = Position::parse(label).ok().filter(Position::is_valid);
            let Some(pos) = pos else {
                return Err(FormulaError::Ref);
            };
            coerce(lookup(pos))
        }
        Expression::Neg(inner) => Ok(-eval(inner, lookup)?),
        Expression::BinaryOp { left, op, right } => {
            let l = eval(left, lookup)?;
            let r = eval(right, lookup)?;
            apply(*op, l, r)
        }
    }
}

/// Coerces a looked-up `Value` to the number (or error) an arithmetic
/// context needs: numbers pass through, empty text is zero, non-numeric
/// text is `FormulaError::Value`, and an error re-raises itself.
fn coerce(value: Value) -> Result<f64, FormulaError> {
    match value {
        Value::Number(n) => Ok(n),
        Value::Error(e) => Err(e),
        Value::Text(s) if s.is_empty() => Ok(0.0),
        Value::Text(s) => s.trim().parse::<f64>().map_err(|_| FormulaError::Value),
    }
}

fn apply(op: BinaryOperator, l: f64, r: f64) -> Result<f64, FormulaError> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::Div0);
            }
            l / r
        }
    };
    if result.is_finite() {
        Ok(result)
    } else {
        Err(FormulaError::Arithm)
    }
}

/// Precedence tiers: additive = 1, multiplicative = 2, unary/atom = 3.
fn precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Add | BinaryOperator::Subtract => 1,
        BinaryOperator::Multiply | BinaryOperator::Divide => 2,
    }
}

fn print_expr(expr: &Expression, parent_precedence: u8, out: &mut String) {
    match expr {
        Expression::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Expression::CellRef(label) => {
            let _ = write!(out, "{label}");
        }
        Expression::Neg(inner) => {
            out.push('-');
            let needs_parens = matches!(**inner, Expression::BinaryOp { .. });
            if needs_parens {
                out.push('(');
                print_expr(inner, 0, out);
                out.push(')');
            } else {
                print_expr(inner, 3, out);
            }
        }
        Expression::BinaryOp { left, op, right } => {
            let own = precedence(*op);
            let needs_parens = own < parent_precedence;
            if needs_parens {
                out.push('(');
            }
            print_expr(left, own, out);
            let _ = write!(out, "{op}");
            // Right operand at own+1 so "a-(b-c)" keeps its parens while
            // "a-b-c" (left-associative) doesn't grow spurious ones.
            print_expr(right, own + 1, out);
            if needs_parens {
                out.push(')');
            }
        }
    }
}
