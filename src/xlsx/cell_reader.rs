use crate::xlsx::sheet_model::{SourceCell, SourceSheet};
use tracing::{debug, warn};

// A read either hits a real value or falls back to the caller's default.
#[derive(Debug, Clone, PartialEq)]
pub enum CellRead<T> {
    Found(T),
    Defaulted(T),
}

impl<T> CellRead<T> {
    pub fn value(&self) -> &T {
        match self {
            CellRead::Found(v) | CellRead::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, CellRead::Defaulted(_))
    }
}

pub struct CellReader;

impl CellReader {
    // Out-of-range is expected for sparsely filled inputs, so it never errors.
    pub fn read(
        sheet: &SourceSheet,
        row: usize,
        col: usize,
        default: SourceCell,
    ) -> CellRead<SourceCell> {
        let (rows, cols) = sheet.shape();
        if row >= rows || col >= cols {
            warn!(
                sheet = %sheet.name,
                row,
                col,
                rows,
                cols,
                "index out of bounds, using default"
            );
            return CellRead::Defaulted(default);
        }
        match sheet.get_cell(row, col) {
            Some(cell) if !cell.is_blank() => CellRead::Found(cell.clone()),
            _ => {
                debug!(sheet = %sheet.name, row, col, "blank cell, using default");
                CellRead::Defaulted(default)
            }
        }
    }
}
