use crate::common::errors::AppError;
use crate::xlsx::sheet_model::{SourceCell, SourceSheet};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub struct SourceWorkbook {
    sheets: Sheets<BufReader<File>>,
}

impl SourceWorkbook {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let sheets = open_workbook_auto(path).map_err(|e| {
            AppError::InvalidWorkbook(format!("{}: {e}", path.display()))
        })?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn sheet(&mut self, name: &str) -> Result<SourceSheet, AppError> {
        if !self.sheet_names().iter().any(|n| n == name) {
            return Err(AppError::SheetNotFound(name.to_string()));
        }
        let range = self.sheets.worksheet_range(name)?;

        let mut sheet = SourceSheet::new(name.to_string());
        // calamine trims leading empty rows/cols; re-anchor everything at A1.
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let value = Self::convert(data);
            if value != SourceCell::Empty {
                *sheet.ensure_cell_mut(row + row_offset, col + col_offset) = value;
            }
        }
        debug!(sheet = name, shape = ?sheet.shape(), "loaded source sheet");
        Ok(sheet)
    }

    pub fn first_sheet(&mut self) -> Result<SourceSheet, AppError> {
        let name = self
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InvalidWorkbook("workbook has no sheets".to_string()))?;
        self.sheet(&name)
    }

    fn convert(data: &Data) -> SourceCell {
        match data {
            Data::Empty => SourceCell::Empty,
            Data::String(s) => SourceCell::Text(s.clone()),
            Data::Float(n) => SourceCell::Number(*n),
            Data::Int(n) => SourceCell::Number(*n as f64),
            Data::Bool(b) => SourceCell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(SourceCell::DateTime)
                .unwrap_or(SourceCell::Number(dt.as_f64())),
            Data::DateTimeIso(s) => Self::parse_iso(s)
                .map(SourceCell::DateTime)
                .unwrap_or_else(|| SourceCell::Text(s.clone())),
            Data::DurationIso(s) => SourceCell::Text(s.clone()),
            // Error cells (#N/A, #DIV/0!, ...) carry no usable value.
            Data::Error(_) => SourceCell::Empty,
        }
    }

    fn parse_iso(text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}
