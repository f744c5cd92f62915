use crate::common::errors::AppError;
use crate::common::fs::FsUtil;
use crate::xlsx::sheet_model::{CellContent, SourceCell, SourceSheet};
use crate::xlsx::source_workbook::SourceWorkbook;
use std::path::Path;
use tracing::{info, warn};

pub const NOT_FOUND: &str = "(ER not found)";

pub const ER_SHEET: &str = "ER Channels";
pub const CPRP_SHEET: &str = "CPRP Channels";
pub const CHANNELS: &str = "Channels";
pub const NET_RATE: &str = "Net Rate";
pub const MARKET_CPRP: &str = "Market CPRP";
pub const ALL_INDIA_CPRP: &str = "All India CPRP";

#[derive(Debug, Clone, PartialEq)]
pub enum RateValue {
    Found(SourceCell),
    NotFound,
}

impl RateValue {
    pub fn is_found(&self) -> bool {
        matches!(self, RateValue::Found(_))
    }

    pub fn to_content(&self) -> CellContent {
        match self {
            RateValue::Found(cell) => CellContent::from_source(cell),
            RateValue::NotFound => CellContent::text(NOT_FOUND),
        }
    }
}

// A reference sheet whose first row names the columns.
#[derive(Debug, Clone)]
pub struct RateTable {
    sheet: String,
    headers: Vec<String>,
    rows: Vec<Vec<SourceCell>>,
}

impl RateTable {
    pub fn from_sheet(sheet: &SourceSheet, required: &[&str]) -> Result<Self, AppError> {
        let headers: Vec<String> = sheet
            .rows
            .first()
            .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        for column in required {
            if !headers.iter().any(|h| h == column) {
                return Err(AppError::MissingColumn {
                    sheet: sheet.name.clone(),
                    column: (*column).to_string(),
                });
            }
        }
        Ok(Self {
            sheet: sheet.name.clone(),
            headers,
            rows: sheet.rows.iter().skip(1).cloned().collect(),
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }

    fn column(&self, name: &str) -> Result<usize, AppError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::MissingColumn {
                sheet: self.sheet.clone(),
                column: name.to_string(),
            })
    }

    fn cell(row: &[SourceCell], col: usize) -> SourceCell {
        row.get(col).cloned().unwrap_or(SourceCell::Empty)
    }

    // First row whose key matches after trimming and lowercasing both sides. A blank key matches nothing.
    pub fn lookup(&self, key_column: &str, key: &str, value_column: &str) -> Result<RateValue, AppError> {
        let key_col = self.column(key_column)?;
        let value_col = self.column(value_column)?;
        let wanted = normalize(key);
        if wanted.is_empty() {
            return Ok(RateValue::NotFound);
        }
        let hit = self.rows.iter().find(|row| match row.get(key_col) {
            Some(SourceCell::Text(text)) => normalize(text) == wanted,
            _ => false,
        });
        Ok(match hit {
            Some(row) => RateValue::Found(Self::cell(row, value_col)),
            None => RateValue::NotFound,
        })
    }

    pub fn first_value(&self, column: &str) -> Result<RateValue, AppError> {
        let col = self.column(column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| Self::cell(row, col))
            .find(|cell| !cell.is_blank())
            .map(RateValue::Found)
            .unwrap_or(RateValue::NotFound))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

// ER and CPRP tables from the rates reference workbook.
#[derive(Debug, Clone)]
pub struct ReferenceRates {
    er: RateTable,
    cprp: RateTable,
}

impl ReferenceRates {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        FsUtil::require_file("Reference rates", path)?;
        let mut workbook = SourceWorkbook::open(path)?;
        let er = workbook.sheet(ER_SHEET)?;
        let cprp = workbook.sheet(CPRP_SHEET)?;
        Self::from_sheets(&er, &cprp)
    }

    pub fn from_sheets(er: &SourceSheet, cprp: &SourceSheet) -> Result<Self, AppError> {
        Ok(Self {
            er: RateTable::from_sheet(er, &[CHANNELS, NET_RATE])?,
            cprp: RateTable::from_sheet(cprp, &[CHANNELS, MARKET_CPRP, ALL_INDIA_CPRP])?,
        })
    }

    pub fn net_rate(&self, channel: &str) -> Result<RateValue, AppError> {
        let value = self.er.lookup(CHANNELS, channel, NET_RATE)?;
        log_lookup(NET_RATE, channel, &value);
        Ok(value)
    }

    pub fn market_cprp(&self, channel: &str) -> Result<RateValue, AppError> {
        let value = self.cprp.lookup(CHANNELS, channel, MARKET_CPRP)?;
        log_lookup(MARKET_CPRP, channel, &value);
        Ok(value)
    }

    // The column carries one network-wide value; the first non-blank entry wins.
    pub fn all_india_cprp(&self) -> Result<RateValue, AppError> {
        let value = self.cprp.first_value(ALL_INDIA_CPRP)?;
        if !value.is_found() {
            warn!(sheet = self.cprp.sheet_name(), "no All India CPRP value in reference table");
        }
        Ok(value)
    }
}

fn log_lookup(column: &str, channel: &str, value: &RateValue) {
    match value {
        RateValue::Found(cell) => info!(column, channel, value = %cell, "reference rate found"),
        RateValue::NotFound => warn!(column, channel, "reference rate not found"),
    }
}
