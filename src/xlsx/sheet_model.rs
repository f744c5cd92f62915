use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCell {
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Empty,
}

// One tab of an input workbook, addressed by absolute zero-based (row, col).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSheet {
    pub name: String,
    pub rows: Vec<Vec<SourceCell>>,
}

impl SourceCell {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            SourceCell::Empty => true,
            SourceCell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SourceCell::Number(n) => Some(*n),
            SourceCell::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SourceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCell::Text(text) => f.write_str(text),
            SourceCell::Number(n) => f.write_str(&format_number(*n)),
            SourceCell::Bool(true) => f.write_str("TRUE"),
            SourceCell::Bool(false) => f.write_str("FALSE"),
            SourceCell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            SourceCell::Empty => Ok(()),
        }
    }
}

// Whole numbers render without a fractional part so they read the way a user typed them.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl SourceSheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            rows: Vec::new(),
        }
    }

    pub fn ensure_cell_mut(&mut self, row: usize, col: usize) -> &mut SourceCell {
        while self.rows.len() <= row {
            self.rows.push(Vec::new());
        }
        let row_cells = &mut self.rows[row];
        while row_cells.len() <= col {
            row_cells.push(SourceCell::Empty);
        }
        &mut row_cells[col]
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Option<&SourceCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.max_cols())
    }
}

// What lands in an output cell. Formulas are stored verbatim (leading `=`) and
// evaluated by the spreadsheet application, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Number(f64),
    Formula(String),
}

impl CellContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn formula(value: impl Into<String>) -> Self {
        Self::Formula(value.into())
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    pub fn from_source(cell: &SourceCell) -> Self {
        match cell {
            SourceCell::Number(n) => Self::Number(*n),
            SourceCell::Text(text) => Self::Text(text.clone()),
            SourceCell::DateTime(dt) => Self::Text(dt.format("%d %B %Y").to_string()),
            SourceCell::Bool(_) | SourceCell::Empty => Self::Text(cell.to_string()),
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContent::Text(text) | CellContent::Formula(text) => f.write_str(text),
            CellContent::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}
