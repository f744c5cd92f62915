use crate::common::config::ServiceConfig;
use crate::common::errors::AppError;
use crate::common::fs::FsUtil;
use crate::common::json::JsonUtil;
use crate::http::protocol::{
    uploads_from_body, FileUpload, HttpResponse, ProcessResponse, OUTPUT_FILENAME,
};
use crate::report::assembler::ReportAssembler;
use crate::report::ratings::RatingStore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const PING: &str = "/ping";
pub const PROCESS: &str = "/process_pager_excelfile";

const REQUIRED_TYPES: [&str; 2] = ["input_a", "input_b"];

pub struct Dispatcher<'a> {
    config: &'a ServiceConfig,
    store: Option<&'a dyn RatingStore>,
    year: Option<i32>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a ServiceConfig, store: Option<&'a dyn RatingStore>) -> Self {
        Self {
            config,
            store,
            year: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn handle(&self, method: &str, url: &str, body: &[u8]) -> HttpResponse {
        let path = url.split('?').next().unwrap_or(url);
        match (method, path) {
            ("GET", PING) => HttpResponse::ok(json!({ "status": "ok" })),
            ("POST", PROCESS) => match self.process(body) {
                Ok(response) => response,
                Err(err) => {
                    error!(status = err.status(), "request failed: {err}");
                    HttpResponse::error(err.status(), err.to_string())
                }
            },
            (_, PING) | (_, PROCESS) => {
                HttpResponse::error(405, format!("method {method} not allowed for {path}"))
            }
            _ => HttpResponse::error(404, format!("no route for {method} {path}")),
        }
    }

    fn process(&self, body: &[u8]) -> Result<HttpResponse, AppError> {
        let body: Value = JsonUtil::from_slice(body)?;
        debug!(bytes = body.to_string().len(), "request body received");
        let uploads = uploads_from_body(body)
            .map_err(|_| AppError::InvalidInput("request body must be a JSON object".to_string()))?;
        if uploads.is_empty() {
            return Err(AppError::InvalidInput("No files to process".to_string()));
        }

        std::fs::create_dir_all(&self.config.upload_dir)?;
        // Removed on drop, whatever the outcome.
        let scratch = tempfile::Builder::new()
            .prefix("request-")
            .tempdir_in(&self.config.upload_dir)?;

        let mut file_map: BTreeMap<String, PathBuf> = BTreeMap::new();
        for upload in uploads {
            let upload: FileUpload = JsonUtil::from_value(upload)?;
            let (file_type, path) = Self::save_upload(&upload, scratch.path())?;
            file_map.insert(file_type, path);
        }

        let missing: Vec<String> = REQUIRED_TYPES
            .iter()
            .filter(|t| !file_map.contains_key(**t))
            .map(|t| t.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFileTypes(missing));
        }

        let mut assembler = ReportAssembler::from_config(self.config, self.store);
        if let Some(year) = self.year {
            assembler = assembler.with_year(year);
        }
        let output = scratch.path().join(OUTPUT_FILENAME);
        assembler.assemble_to(
            &file_map["input_a"],
            &file_map["input_b"],
            &self.config.template_path,
            &output,
        )?;

        let bytes = std::fs::read(&output)?;
        info!(path = %output.display(), bytes = bytes.len(), "files processed successfully");
        let response = ProcessResponse::success(STANDARD.encode(bytes));
        Ok(HttpResponse::ok(JsonUtil::to_value(response)?))
    }

    fn save_upload(upload: &FileUpload, dir: &Path) -> Result<(String, PathBuf), AppError> {
        let name = upload.xlsx_name.as_deref().unwrap_or_default();
        let file_type = upload.file_type.as_deref().unwrap_or_default();
        info!(file = name, file_type, "processing file");

        let Some(attach_body) = upload.attach_body.as_ref() else {
            return Err(Self::missing_fields(name));
        };
        if name.is_empty() || file_type.is_empty() {
            return Err(Self::missing_fields(name));
        }
        let content = attach_body.content_bytes.as_deref().unwrap_or_default();
        if content.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "File '{name}': Missing 'contentBytes' in attach-body"
            )));
        }

        let bytes = STANDARD
            .decode(content.trim())
            .map_err(|_| AppError::InvalidBase64 {
                file: name.to_string(),
            })?;
        if !REQUIRED_TYPES.contains(&file_type) {
            warn!(file = name, file_type, "unexpected file type, upload kept but unused");
        }

        // Prefixed so two uploads sharing a name cannot overwrite each other.
        let path = dir.join(FsUtil::upload_file_name(&format!("{file_type}_{name}"))?);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), "file saved");
        Ok((file_type.to_string(), path))
    }

    fn missing_fields(name: &str) -> AppError {
        AppError::InvalidInput(format!(
            "File '{name}': Missing 'attach-body', 'xlsx-name', or 'file-type'"
        ))
    }
}
