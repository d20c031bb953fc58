//! FILENAME: engine/src/sheet.rs
//! PURPOSE: The sparse cell container and the orchestrator of every
//! cross-cell operation: setting a cell's content, rewiring dependency
//! edges, detecting cycles before they're committed, and propagating
//! cache invalidation to dependents.
//! CONTEXT: `Cell::set`'s six-step algorithm lives here rather than on
//! `Cell` itself, because installing a new formula requires mutating the
//! `users` sets of every cell it references and every cell it used to
//! reference -- `Sheet` is the only thing that can hold all those `Cell`s
//! mutably at once without fighting the borrow checker.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::cell::{Cell, CellContent};
use crate::cycle;
use crate::error::EngineError;
use crate::position::Position;
use crate::value::Value;

/// A sparse spreadsheet: most positions are never materialized as a `Cell`
/// at all, keeping memory proportional to the number of non-empty cells
/// rather than to `MAX_ROWS * MAX_COLS`.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
}

impl Sheet {
    pub fn new() -> Self {
        Sheet {
            cells: HashMap::new(),
        }
    }

    /// Sets the raw text of a cell, reclassifying it, validating any
    /// formula it contains, rejecting the edit if it would close a
    /// circular reference, and propagating cache invalidation to every
    /// cell transitively downstream.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos));
        }

        let content = Cell::classify(text)?;
        let new_used: std::collections::HashSet<Position> = match &content {
            CellContent::Formula(formula) => formula.referenced_cells().into_iter().collect(),
            _ => std::collections::HashSet::new(),
        };

        if cycle::would_create_cycle(&self.cells, pos, &new_used) {
            warn!("rejected edit at {pos}: would create a circular reference");
            return Err(EngineError::CircularDependency(pos));
        }

        let old_used = self
            .cells
            .get(&pos)
            .map(|c| c.used.clone())
            .unwrap_or_default();

        for &stale in old_used.difference(&new_used) {
            if let Some(dep) = self.cells.get_mut(&stale) {
                dep.users.remove(&pos);
            }
        }
        for &fresh in new_used.difference(&old_used) {
            self.cells.entry(fresh).or_insert_with(Cell::empty).users.insert(pos);
        }

        self.cells
            .entry(pos)
            .or_insert_with(Cell::empty)
            .install(content, new_used);

        debug!("set {pos}: {text:?}");
        self.invalidate_from(pos);
        Ok(())
    }

    /// Clears a cell back to empty. A no-op if the position is valid but
    /// was never materialized; otherwise routed through `set_cell` so
    /// edge rewrites and cache invalidation happen identically to any
    /// other edit.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos));
        }
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }
        self.set_cell(pos, "")
    }

    /// The cell's value, or `None` if the position was never materialized
    /// or holds empty text (the two are treated identically at this
    /// public boundary). The only read operation that validates `pos`.
    pub fn get_cell(&self, pos: Position) -> Result<Option<Value>, EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos));
        }
        let Some(cell) = self.cells.get(&pos) else {
            return Ok(None);
        };
        if cell.text().is_empty() {
            return Ok(None);
        }
        Ok(Some(cell.value(&|p| self.lookup(p))))
    }

    /// The cell's value whether or not it's empty text, used internally
    /// by formula evaluation where "absent" and "empty text" both coerce
    /// to zero anyway.
    fn lookup(&self, pos: Position) -> Value {
        match self.cells.get(&pos) {
            Some(cell) => cell.value(&|p| self.lookup(p)),
            None => Value::Text(String::new()),
        }
    }

    /// The cell's raw text, or an empty string if never materialized.
    pub fn get_cell_text(&self, pos: Position) -> String {
        self.cells.get(&pos).map(Cell::text).unwrap_or_default()
    }

    /// The cell's current forward references, or an empty list if never
    /// materialized.
    pub fn referenced_cells(&self, pos: Position) -> Vec<Position> {
        self.cells
            .get(&pos)
            .map(Cell::referenced_cells)
            .unwrap_or_default()
    }

    /// Whether any other cell currently references `pos`. `false` if
    /// never materialized.
    pub fn is_referenced(&self, pos: Position) -> bool {
        self.cells.get(&pos).map(Cell::is_referenced).unwrap_or(false)
    }

    /// The smallest bounding box, measured from the origin, that contains
    /// every cell holding non-empty text. `None` if the sheet is entirely
    /// empty.
    pub fn printable_size(&self) -> Option<(u32, u32)> {
        let mut max_row = None;
        let mut max_col = None;
        for (pos, cell) in &self.cells {
            if cell.text().is_empty() {
                continue;
            }
            max_row = Some(max_row.map_or(pos.row, |m: u32| m.max(pos.row)));
            max_col = Some(max_col.map_or(pos.col, |m: u32| m.max(pos.col)));
        }
        match (max_row, max_col) {
            (Some(r), Some(c)) => Some((r + 1, c + 1)),
            _ => None,
        }
    }

    /// Renders the printable bounding box as tab-separated values, each
    /// cell shown by its computed `Value::display_form`.
    pub fn print_values(&self) -> String {
        self.render(|sheet, pos| {
            sheet
                .get_cell(pos)
                .expect("positions within the printable bounding box are always valid")
                .map(|v| v.display_form())
                .unwrap_or_default()
        })
    }

    /// Renders the printable bounding box as tab-separated raw cell text.
    pub fn print_texts(&self) -> String {
        self.render(|sheet, pos| sheet.get_cell_text(pos))
    }

    fn render(&self, cell_text: impl Fn(&Sheet, Position) -> String) -> String {
        let Some((rows, cols)) = self.printable_size() else {
            return String::new();
        };
        let mut out = String::new();
        for row in 0..rows {
            for col in 0..cols {
                if col > 0 {
                    out.push('\t');
                }
                out.push_str(&cell_text(self, Position::new(row, col)));
            }
            out.push('\n');
        }
        out
    }

    /// Invalidates the memoized cache of every cell transitively
    /// downstream of `origin`. `origin` itself always recurses into its
    /// `users` -- its content just changed, whether or not it happened to
    /// have a cache. Every cell reached after that prunes the walk once
    /// its own cache was already empty, since an empty cache means
    /// everything further downstream was invalidated by an earlier edit.
    fn invalidate_from(&self, origin: Position) {
        if let Some(cell) = self.cells.get(&origin) {
            for &dep in &cell.users {
                self.invalidate_dependent(dep);
            }
        }
    }

    fn invalidate_dependent(&self, pos: Position) {
        if let Some(cell) = self.cells.get(&pos) {
            if cell.invalidate_cache() {
                trace!("cache cleared at {pos}");
                for &dep in &cell.users {
                    self.invalidate_dependent(dep);
                }
            }
        }
    }
}
