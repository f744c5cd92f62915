use crate::common::errors::AppError;
use crate::xlsx::cell_reader::{CellRead, CellReader};
use crate::xlsx::sheet_model::{CellContent, SourceCell, SourceSheet};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;

pub const PROPERTY_DETAILS: &str = "Property Details";
pub const CHANNEL_PLATFORM: &str = "Channel & Platform Details";
pub const PROGRAM_PERFORMANCE: &str = "Program Performance";

pub const START_DATE_FORMAT: &str = "%d %B %Y";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const MONTH_LABEL_FORMAT: &str = "%b'%y";
pub const DEFAULT_WEEKS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSheet {
    PropertyDetails,
    ChannelPlatform,
    ProgramPerformance,
}

impl InputSheet {
    pub fn sheet_name(self) -> &'static str {
        match self {
            InputSheet::PropertyDetails => PROPERTY_DETAILS,
            InputSheet::ChannelPlatform => CHANNEL_PLATFORM,
            InputSheet::ProgramPerformance => PROGRAM_PERFORMANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    // Campaign start: a date cell or "%d %B %Y" text.
    Date,
    // Performance window bounds: a date cell or "%Y-%m-%d %H:%M:%S" text.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Number(f64),
}

impl FieldDefault {
    pub fn to_cell(self) -> SourceCell {
        match self {
            FieldDefault::Text(text) => SourceCell::text(text),
            FieldDefault::Number(n) => SourceCell::Number(n),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub sheet: InputSheet,
    pub row: usize,
    pub col: usize,
    pub default: FieldDefault,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(
    name: &'static str,
    sheet: InputSheet,
    row: usize,
    col: usize,
    default: FieldDefault,
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        name,
        sheet,
        row,
        col,
        default,
        kind,
        required: matches!(kind, FieldKind::Date | FieldKind::Timestamp),
    }
}

const fn text(name: &'static str, sheet: InputSheet, row: usize, col: usize) -> FieldSpec {
    field(name, sheet, row, col, FieldDefault::Text(""), FieldKind::Text)
}

const fn number(
    name: &'static str,
    sheet: InputSheet,
    row: usize,
    col: usize,
    default: f64,
) -> FieldSpec {
    field(name, sheet, row, col, FieldDefault::Number(default), FieldKind::Number)
}

use self::InputSheet::{ChannelPlatform as CP, ProgramPerformance as PP, PropertyDetails as PD};

// Every input cell the report reads. Names are "<sheet>_<A1 ref>"; rows and
// columns are zero-based.
pub static FIELDS: &[FieldSpec] = &[
    text("pd_b1", PD, 0, 1),
    text("pd_b3", PD, 2, 1),
    text("pd_b4", PD, 3, 1),
    text("pd_b7", PD, 6, 1),
    field("pd_b8", PD, 7, 1, FieldDefault::Text(""), FieldKind::Date),
    text("pd_b9", PD, 8, 1),
    text("pd_b10", PD, 9, 1),
    text("pd_b11", PD, 10, 1),
    number("pd_b12", PD, 11, 1, 2.0),
    number("pd_b13", PD, 12, 1, 1.0),
    number("pd_b14", PD, 13, 1, DEFAULT_WEEKS),
    text("pd_b20", PD, 19, 1),
    text("pd_b21", PD, 20, 1),
    text("pd_b22", PD, 21, 1),
    text("pd_b23", PD, 22, 1),
    text("pd_b26", PD, 25, 1),
    text("pd_b27", PD, 26, 1),
    text("pd_b28", PD, 27, 1),
    text("pd_a29", PD, 28, 0),
    text("pd_b29", PD, 28, 1),
    number("pd_b32", PD, 31, 1, 0.0),
    text("pd_b36", PD, 35, 1),
    text("pd_b37", PD, 36, 1),
    text("pd_b45", PD, 44, 1),
    text("cp_b5", CP, 4, 1),
    text("cp_c5", CP, 4, 2),
    text("cp_c6", CP, 5, 2),
    text("cp_c7", CP, 6, 2),
    text("cp_c8", CP, 7, 2),
    text("cp_c9", CP, 8, 2),
    number("cp_e9", CP, 8, 4, 0.0),
    number("cp_e10", CP, 9, 4, 0.0),
    number("cp_g5", CP, 4, 6, 0.0),
    number("cp_g6", CP, 5, 6, 0.0),
    number("cp_g7", CP, 6, 6, 0.0),
    number("cp_g8", CP, 7, 6, 0.0),
    number("cp_j9", CP, 8, 9, 0.0),
    number("cp_j10", CP, 9, 9, 0.0),
    number("cp_k9", CP, 8, 10, 0.0),
    number("cp_k10", CP, 9, 10, 0.0),
    number("cp_l9", CP, 8, 11, 0.0),
    number("cp_l10", CP, 9, 11, 0.0),
    number("cp_o5", CP, 4, 14, 0.0),
    number("cp_o6", CP, 5, 14, 0.0),
    number("cp_o7", CP, 6, 14, 0.0),
    number("cp_o8", CP, 7, 14, 0.0),
    number("pp_f11", PP, 10, 5, 0.0),
    number("pp_g11", PP, 10, 6, 0.0),
    number("pp_l11", PP, 10, 11, 0.0),
    field("pp_f12", PP, 11, 5, FieldDefault::Number(0.0), FieldKind::Timestamp),
    field("pp_g12", PP, 11, 6, FieldDefault::Number(0.0), FieldKind::Timestamp),
    number("pp_l12", PP, 11, 11, 0.0),
];

pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

// The three tabs of the campaign input workbook.
#[derive(Debug, Clone)]
pub struct InputSheets {
    pub property_details: SourceSheet,
    pub channel_platform: SourceSheet,
    pub program_performance: SourceSheet,
}

impl InputSheets {
    pub fn sheet(&self, which: InputSheet) -> &SourceSheet {
        match which {
            InputSheet::PropertyDetails => &self.property_details,
            InputSheet::ChannelPlatform => &self.channel_platform,
            InputSheet::ProgramPerformance => &self.program_performance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub weeks: f64,
}

impl CampaignPeriod {
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(MONTH_LABEL_FORMAT),
            self.end.format(MONTH_LABEL_FORMAT)
        )
    }
}

#[derive(Debug, Clone)]
pub struct FieldSet {
    values: BTreeMap<&'static str, CellRead<SourceCell>>,
}

impl FieldSet {
    pub fn extract(inputs: &InputSheets) -> Self {
        let values = FIELDS
            .iter()
            .map(|spec| {
                let read = CellReader::read(
                    inputs.sheet(spec.sheet),
                    spec.row,
                    spec.col,
                    spec.default.to_cell(),
                );
                (spec.name, read)
            })
            .collect();
        Self { values }
    }

    pub fn read(&self, name: &str) -> Option<&CellRead<SourceCell>> {
        self.values.get(name)
    }

    pub fn cell(&self, name: &str) -> SourceCell {
        match (self.values.get(name), field_spec(name)) {
            (Some(read), _) => read.value().clone(),
            (None, Some(spec)) => spec.default.to_cell(),
            (None, None) => SourceCell::Empty,
        }
    }

    pub fn is_defaulted(&self, name: &str) -> bool {
        self.values.get(name).map_or(true, CellRead::is_defaulted)
    }

    pub fn text(&self, name: &str) -> String {
        self.cell(name).to_string()
    }

    pub fn trimmed(&self, name: &str) -> String {
        self.text(name).trim().to_string()
    }

    // Non-numeric content falls back to the field's own numeric default.
    pub fn number(&self, name: &str) -> f64 {
        self.cell(name).as_number().unwrap_or_else(|| {
            match field_spec(name).map(|spec| spec.default) {
                Some(FieldDefault::Number(n)) => n,
                _ => 0.0,
            }
        })
    }

    pub fn content(&self, name: &str) -> CellContent {
        CellContent::from_source(&self.cell(name))
    }

    pub fn campaign_period(&self) -> Result<CampaignPeriod, AppError> {
        let start = self.start_date()?;
        let weeks = self.number("pd_b14");
        // Fractional weeks keep their partial day; the end date is the day that span lands in.
        let seconds = (weeks * 7.0 * 86_400.0).round() as i64;
        let end = Duration::try_seconds(seconds)
            .zip(start.and_hms_opt(0, 0, 0))
            .and_then(|(span, midnight)| midnight.checked_add_signed(span))
            .map(|end| end.date())
            .ok_or_else(|| AppError::InvalidDate {
                field: "campaign end".to_string(),
                value: format!("{start} + {weeks} weeks"),
                format: START_DATE_FORMAT.to_string(),
            })?;
        debug!(%start, %end, weeks, "derived campaign period");
        Ok(CampaignPeriod { start, end, weeks })
    }

    pub fn start_date(&self) -> Result<NaiveDate, AppError> {
        match self.cell("pd_b8") {
            SourceCell::DateTime(dt) => Ok(dt.date()),
            SourceCell::Text(text) if !text.trim().is_empty() => {
                NaiveDate::parse_from_str(text.trim(), START_DATE_FORMAT).map_err(|_| {
                    invalid_date("Property Details B8", &text, START_DATE_FORMAT)
                })
            }
            other => Err(invalid_date(
                "Property Details B8",
                &other.to_string(),
                START_DATE_FORMAT,
            )),
        }
    }

    pub fn performance_label(&self) -> Result<String, AppError> {
        let start = self.timestamp("pp_f12", "Program Performance F12")?;
        let end = self.timestamp("pp_g12", "Program Performance G12")?;
        Ok(format!(
            "{} - {}",
            start.format(MONTH_LABEL_FORMAT),
            end.format(MONTH_LABEL_FORMAT)
        ))
    }

    fn timestamp(&self, name: &str, label: &str) -> Result<NaiveDateTime, AppError> {
        match self.cell(name) {
            SourceCell::DateTime(dt) => Ok(dt),
            other => {
                let text = other.to_string();
                NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
                    .map_err(|_| invalid_date(label, &text, TIMESTAMP_FORMAT))
            }
        }
    }
}

fn invalid_date(field: &str, value: &str, format: &str) -> AppError {
    AppError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
        format: format.to_string(),
    }
}
