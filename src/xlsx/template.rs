use crate::common::errors::AppError;
use crate::common::fs::FsUtil;
use crate::xlsx::merged_writer::TemplateSheet;
use crate::xlsx::package::XlsxPackage;
use std::path::Path;
use tracing::{debug, info};

pub struct TemplateWorkbook {
    package: XlsxPackage,
    sheets: Vec<TemplateSheet>,
}

impl TemplateWorkbook {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let package = XlsxPackage::open(path)?;
        Self::from_package(package)
    }

    pub fn from_package(package: XlsxPackage) -> Result<Self, AppError> {
        let mut sheets = Vec::new();
        for entry in package.sheet_entries()? {
            let xml = package.part(&entry.part).ok_or_else(|| {
                AppError::InvalidWorkbook(format!(
                    "sheet '{}' points at missing part {}",
                    entry.name, entry.part
                ))
            })?;
            let merges = XlsxPackage::merge_regions(xml)?;
            debug!(sheet = %entry.name, merges = merges.len(), "loaded template sheet");
            sheets.push(TemplateSheet::new(entry.name, entry.part, merges));
        }
        Ok(Self { package, sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, index: usize) -> Result<&TemplateSheet, AppError> {
        self.sheets
            .get(index)
            .ok_or_else(|| AppError::SheetNotFound(format!("template sheet #{index}")))
    }

    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut TemplateSheet, AppError> {
        self.sheets
            .get_mut(index)
            .ok_or_else(|| AppError::SheetNotFound(format!("template sheet #{index}")))
    }

    // Streams pending edits into their sheet parts. Everything else in the
    // package is carried over untouched.
    pub fn apply(&mut self) -> Result<(), AppError> {
        let mut wrote_formulas = false;
        for sheet in self.sheets.iter().filter(|s| s.is_dirty()) {
            let xml = self.package.part(&sheet.part).ok_or_else(|| {
                AppError::InvalidWorkbook(format!("missing part: {}", sheet.part))
            })?;
            let patched = XlsxPackage::patch_sheet_cells(xml, &sheet.edits)?;
            self.package.set_part(&sheet.part, patched);
            wrote_formulas |= sheet.has_formulas();
            debug!(sheet = %sheet.name, cells = sheet.edits.len(), "patched sheet");
        }

        if wrote_formulas {
            self.package.force_full_calc_on_load()?;
            self.package.drop_calc_chain()?;
        }
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<(), AppError> {
        self.apply()?;
        FsUtil::ensure_parent_dir(path)?;
        self.package.save(path)?;
        info!(path = %path.display(), "saved workbook");
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, AppError> {
        self.apply()?;
        self.package.to_bytes()
    }
}
