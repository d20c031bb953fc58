//! FILENAME: engine/src/cell.rs
//! PURPOSE: The cell variant model, its value/text semantics, and the
//! dependency-edge fields a `Sheet` maintains on its behalf.
//! CONTEXT: `Cell::set`'s edge-rewrite algorithm lives on `Sheet`, not here
//! -- see the note on `Sheet::set_cell` for why. This type owns only the
//! operations that don't need to alias sibling cells: classification,
//! lazy evaluation, and the narrow cache/edge accessors `Sheet` composes.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::formula::{Formula, FormulaParseError};
use crate::position::Position;
use crate::value::{FormulaError, Value};

/// The cell's current variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    Text(String),
    Formula(Formula),
}

pub(crate) type FormulaOutcome = Result<f64, FormulaError>;

/// A single storage slot in a `Sheet`. `used`/`users` are maintained as
/// mirror images of each other across the whole sheet (edge symmetry);
/// `cache` is populated lazily on first read of a Formula cell and
/// invalidated whenever any transitively-referenced cell changes.
#[derive(Debug)]
pub struct Cell {
    content: CellContent,
    cache: RefCell<Option<FormulaOutcome>>,
    pub(crate) used: HashSet<Position>,
    pub(crate) users: HashSet<Position>,
}

impl Cell {
    pub(crate) fn empty() -> Self {
        Cell {
            content: CellContent::Empty,
            cache: RefCell::new(None),
            used: HashSet::new(),
            users: HashSet::new(),
        }
    }

    /// Classifies raw input text into a variant, per the `'`/`=` leading
    /// characters. Does not touch any sheet state; a Formula parse
    /// failure is returned to the caller with the cell left untouched.
    pub(crate) fn classify(text: &str) -> Result<CellContent, FormulaParseError> {
        if text.is_empty() {
            Ok(CellContent::Empty)
        } else if text.starts_with('=') && text.len() > 1 {
            Formula::parse(&text[1..]).map(CellContent::Formula)
        } else {
            Ok(CellContent::Text(text.to_string()))
        }
    }

    /// Installs a new variant and its forward-edge set. Called only by
    /// `Sheet::set_cell` once the cycle check has passed.
    pub(crate) fn install(&mut self, content: CellContent, used: HashSet<Position>) {
        self.content = content;
        self.used = used;
        *self.cache.borrow_mut() = None;
    }

    /// Clears the memoized result. Returns whether there was one to clear
    /// (used by the cache invalidator's pruning rule).
    pub(crate) fn invalidate_cache(&self) -> bool {
        self.cache.borrow_mut().take().is_some()
    }

    /// The cell's value, evaluating and memoizing a Formula cell's result
    /// against `lookup` if not already cached.
    pub fn value(&self, lookup: &dyn Fn(Position) -> Value) -> Value {
        match &self.content {
            CellContent::Empty => Value::Text(String::new()),
            CellContent::Text(s) => match s.strip_prefix('\'') {
                Some(rest) => Value::Text(rest.to_string()),
                None => Value::Text(s.clone()),
            },
            CellContent::Formula(formula) => {
                if self.cache.borrow().is_none() {
                    *self.cache.borrow_mut() = Some(formula.evaluate(lookup));
                }
                match self.cache.borrow().clone().expect("just populated above") {
                    Ok(n) => Value::Number(n),
                    Err(e) => Value::Error(e),
                }
            }
        }
    }

    /// The cell's text, verbatim (escape prefix retained).
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula(formula) => format!("={}", formula.expression()),
        }
    }

    /// Current forward references, in the formula's own stable order.
    pub fn referenced_cells(&self) -> Vec<Position> {
        match &self.content {
            CellContent::Formula(formula) => formula.referenced_cells(),
            _ => Vec::new(),
        }
    }

    pub fn is_referenced(&self) -> bool {
        !self.users.is_empty()
    }
}
