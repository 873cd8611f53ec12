//! In-memory tabular result of an extraction query.

use rust_decimal::Decimal;

/// Declared type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Integer,
    Float,
    Decimal,
    Text,
}

/// A named, typed result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A single value in the table. `Null` is the only missing-value marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// True for values that stand for "missing": SQL NULL and floating NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Rows of cells under a fixed list of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with `Null`, long rows truncated,
    /// so every row has one cell per column.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Apply `f` to every cell of one column, stopping at the first error.
    /// An index past the last column leaves the table untouched.
    pub(crate) fn try_map_column<E>(
        &mut self,
        index: usize,
        mut f: impl FnMut(usize, Cell) -> Result<Cell, E>,
    ) -> Result<(), E> {
        if index >= self.columns.len() {
            return Ok(());
        }
        for (row_index, row) in self.rows.iter_mut().enumerate() {
            let cell = std::mem::replace(&mut row[index], Cell::Null);
            row[index] = f(row_index, cell)?;
        }
        Ok(())
    }

    /// Apply `f` to every cell in the table.
    pub fn map_cells(&mut self, mut f: impl FnMut(Cell) -> Cell) {
        for cell in self.rows.iter_mut().flatten() {
            let taken = std::mem::replace(cell, Cell::Null);
            *cell = f(taken);
        }
    }

    pub fn set_column_kind(&mut self, index: usize, kind: ColumnKind) {
        if let Some(column) = self.columns.get_mut(index) {
            column.kind = kind;
        }
    }

    /// Split into columns and rows.
    pub fn into_parts(self) -> (Vec<Column>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }
}
