use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("{role} file not found at path: {path}")]
    MissingFile { role: String, path: String },
    #[error("invalid workbook: {0}")]
    InvalidWorkbook(String),
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("invalid cell address: {0}")]
    InvalidCellAddress(String),
    #[error("missing required column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },
    #[error("invalid date in {field}: '{value}' does not match {format}")]
    InvalidDate {
        field: String,
        value: String,
        format: String,
    },
    #[error("xml parse error: {0}")]
    XmlParseError(String),
    #[error("zip error: {0}")]
    ZipError(String),
    #[error("io error: {0}")]
    IoError(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("output file not created: {0}")]
    OutputMissing(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("File '{file}': Invalid base64 content")]
    InvalidBase64 { file: String },
    #[error("Missing required files: {}", .0.join(", "))]
    MissingFileTypes(Vec<String>),
}

impl AppError {
    // Request-shaped problems are the caller's fault; everything else is a processing failure.
    pub fn status(&self) -> u16 {
        match self {
            AppError::InvalidInput(_)
            | AppError::InvalidBase64 { .. }
            | AppError::MissingFileTypes(_)
            | AppError::InvalidPath(_) => 400,
            AppError::MissingFile { .. }
            | AppError::InvalidWorkbook(_)
            | AppError::SheetNotFound(_)
            | AppError::InvalidCellAddress(_)
            | AppError::MissingColumn { .. }
            | AppError::InvalidDate { .. }
            | AppError::XmlParseError(_)
            | AppError::ZipError(_)
            | AppError::IoError(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::OutputMissing(_) => 500,
        }
    }

    pub fn missing_file(role: &str, path: &std::path::Path) -> Self {
        Self::MissingFile {
            role: role.to_string(),
            path: path.display().to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::ZipError(value.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(value: quick_xml::Error) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AppError {
    fn from(value: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParseError(value.to_string())
    }
}

impl From<calamine::Error> for AppError {
    fn from(value: calamine::Error) -> Self {
        Self::InvalidWorkbook(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Database(value.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::IoError(value.to_string())
    }
}
