use crate::xlsx::sheet_model::CellContent;

// Output sheets are addressed by template position, not by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSheet {
    Summary,
    Detail,
}

impl OutputSheet {
    pub fn index(self) -> usize {
        match self {
            OutputSheet::Summary => 0,
            OutputSheet::Detail => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub sheet: OutputSheet,
    pub cell: &'static str,
    pub content: CellContent,
}

impl CellWrite {
    pub fn new(sheet: OutputSheet, cell: &'static str, content: CellContent) -> Self {
        Self {
            sheet,
            cell,
            content,
        }
    }
}
