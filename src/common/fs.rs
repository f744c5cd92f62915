use crate::common::errors::AppError;
use std::path::{Path, PathBuf};

pub struct FsUtil;

impl FsUtil {
    // Normalizes relative paths and enforces the .xlsx extension contract.
    pub fn resolve_xlsx_path(path: &str) -> Result<PathBuf, AppError> {
        if path.trim().is_empty() {
            return Err(AppError::InvalidPath("path is empty".to_string()));
        }
        let input = Path::new(path);
        let abs = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir()?.join(input)
        };
        let ext = abs
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext != "xlsx" {
            return Err(AppError::InvalidPath(format!(
                "expected .xlsx extension: {}",
                abs.display()
            )));
        }
        Ok(abs)
    }

    pub fn require_file(role: &str, path: &Path) -> Result<(), AppError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(AppError::missing_file(role, path))
        }
    }

    // Uploaded names come from the request body; only the final component is kept.
    pub fn upload_file_name(name: &str) -> Result<String, AppError> {
        let file_name = Path::new(name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if file_name.is_empty() || file_name == ".." {
            return Err(AppError::InvalidPath(format!(
                "invalid upload file name: '{name}'"
            )));
        }
        Ok(file_name.to_string())
    }

    pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
