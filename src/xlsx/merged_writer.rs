use crate::common::errors::AppError;
use crate::xlsx::cell_address::{CellAddress, CellRange};
use crate::xlsx::package::XlsxPackage;
use crate::xlsx::sheet_model::CellContent;
use std::collections::BTreeMap;
use tracing::debug;

// One worksheet of the template: its merge layout plus the pending edits that
// will be streamed into its XML part on save.
#[derive(Debug, Clone)]
pub struct TemplateSheet {
    pub name: String,
    pub part: String,
    pub merges: Vec<CellRange>,
    pub edits: BTreeMap<CellAddress, CellContent>,
}

impl TemplateSheet {
    pub fn new(name: String, part: String, merges: Vec<CellRange>) -> Self {
        Self {
            name,
            part,
            merges,
            edits: BTreeMap::new(),
        }
    }

    pub fn resolve(&self, target: CellAddress) -> CellAddress {
        XlsxPackage::resolve_merged_anchor(&self.merges, target)
    }

    pub fn is_dirty(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn has_formulas(&self) -> bool {
        self.edits.values().any(CellContent::is_formula)
    }
}

pub struct MergedCellWriter;

impl MergedCellWriter {
    // Later writes to the same anchor replace earlier ones.
    pub fn write(
        sheet: &mut TemplateSheet,
        cell_ref: &str,
        content: CellContent,
    ) -> Result<CellAddress, AppError> {
        let target = CellAddress::parse(cell_ref)?;
        let anchor = sheet.resolve(target);
        if anchor != target {
            debug!(
                sheet = %sheet.name,
                cell = cell_ref,
                anchor = %anchor.to_a1(),
                "write redirected to merge anchor"
            );
        }
        sheet.edits.insert(anchor, content);
        Ok(anchor)
    }
}
