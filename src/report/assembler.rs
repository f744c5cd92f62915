use crate::common::config::ServiceConfig;
use crate::common::errors::AppError;
use crate::common::fs::FsUtil;
use crate::report::cell_write::{CellWrite, OutputSheet};
use crate::report::field_mapper::FieldMapper;
use crate::report::fields::{
    FieldSet, InputSheets, CHANNEL_PLATFORM, PROGRAM_PERFORMANCE, PROPERTY_DETAILS,
};
use crate::report::ratings::{RatingInputs, RatingLookup, RatingStore};
use crate::report::reference_rates::ReferenceRates;
use crate::xlsx::merged_writer::MergedCellWriter;
use crate::xlsx::source_workbook::SourceWorkbook;
use crate::xlsx::template::TemplateWorkbook;
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ROLE_INPUT_A: &str = "Non Cricket Input";
pub const ROLE_INPUT_B: &str = "TVR Output";
pub const ROLE_TEMPLATE: &str = "Skeleton";

pub struct ReportAssembler<'a> {
    reference_path: PathBuf,
    ratings: RatingLookup<'a>,
    year: Option<i32>,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(reference_path: impl Into<PathBuf>, ratings: RatingLookup<'a>) -> Self {
        Self {
            reference_path: reference_path.into(),
            ratings,
            year: None,
        }
    }

    pub fn from_config(config: &ServiceConfig, store: Option<&'a dyn RatingStore>) -> Self {
        let ratings = RatingLookup::new(store, config.ratings.attempts)
            .with_export_dir(config.ratings.export_dir.clone());
        Self::new(config.reference_path.clone(), ratings)
    }

    // Pins the year printed in the report titles; defaults to the current year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn assemble(&self, input_a: &Path, input_b: &Path, template: &Path) -> Result<Vec<u8>, AppError> {
        let mut workbook = self.fill(input_a, input_b, template)?;
        let bytes = workbook.to_bytes()?;
        if bytes.is_empty() {
            return Err(AppError::OutputMissing("generated workbook is empty".to_string()));
        }
        info!(bytes = bytes.len(), "process finished");
        Ok(bytes)
    }

    pub fn assemble_to(
        &self,
        input_a: &Path,
        input_b: &Path,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf, AppError> {
        let mut workbook = self.fill(input_a, input_b, template)?;
        workbook.save(output)?;
        let written = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(AppError::OutputMissing(output.display().to_string()));
        }
        info!(path = %output.display(), bytes = written, "process finished");
        Ok(output.to_path_buf())
    }

    fn fill(&self, input_a: &Path, input_b: &Path, template: &Path) -> Result<TemplateWorkbook, AppError> {
        info!(
            "process started on {}",
            Local::now().format("%A, %B %d, %Y at %H:%M:%S")
        );
        FsUtil::require_file(ROLE_INPUT_A, input_a)?;
        FsUtil::require_file(ROLE_INPUT_B, input_b)?;
        FsUtil::require_file(ROLE_TEMPLATE, template)?;

        let mut workbook = TemplateWorkbook::open(template)?;
        let detail_sheet = workbook.sheet(OutputSheet::Detail.index())?.name.clone();
        workbook.sheet(OutputSheet::Summary.index())?;

        let inputs = Self::read_inputs(input_a)?;
        // Only the shape of the ratings workbook is checked; its values are not mapped.
        let ratings_sheet = SourceWorkbook::open(input_b)?.first_sheet()?;
        info!(sheet = %ratings_sheet.name, shape = ?ratings_sheet.shape(), "loaded TVR output");

        let rates = ReferenceRates::load(&self.reference_path)?;
        let fields = FieldSet::extract(&inputs);
        let ratings = self.ratings.fetch_ratings(&RatingInputs::from_fields(&fields));

        let year = self.year.unwrap_or_else(|| Local::now().year());
        let writes = FieldMapper::map(&fields, &rates, ratings, year, &detail_sheet)?;
        Self::apply(&mut workbook, &writes)?;
        Ok(workbook)
    }

    fn read_inputs(path: &Path) -> Result<InputSheets, AppError> {
        let mut workbook = SourceWorkbook::open(path)?;
        Ok(InputSheets {
            property_details: workbook.sheet(PROPERTY_DETAILS)?,
            channel_platform: workbook.sheet(CHANNEL_PLATFORM)?,
            program_performance: workbook.sheet(PROGRAM_PERFORMANCE)?,
        })
    }

    pub fn apply(workbook: &mut TemplateWorkbook, writes: &[CellWrite]) -> Result<(), AppError> {
        for write in writes {
            let sheet = workbook.sheet_mut(write.sheet.index())?;
            MergedCellWriter::write(sheet, write.cell, write.content.clone())?;
        }
        Ok(())
    }
}
