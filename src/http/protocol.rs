use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const OUTPUT_FILENAME: &str = "Completed_Output.xlsx";

// One uploaded workbook. Every field is optional so that a missing one can be
// reported by name instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUpload {
    #[serde(rename = "xlsx-name")]
    pub xlsx_name: Option<String>,
    #[serde(rename = "file-type")]
    pub file_type: Option<String>,
    #[serde(rename = "attach-body")]
    pub attach_body: Option<AttachBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachBody {
    #[serde(rename = "contentBytes")]
    pub content_bytes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub data: String,
    pub output_filename: &'static str,
}

impl ProcessResponse {
    pub fn success(data: String) -> Self {
        Self {
            status: "success",
            data,
            output_filename: OUTPUT_FILENAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

// The body is either {"files": [...]} or a single upload object.
pub fn uploads_from_body(body: Value) -> Result<Vec<Value>, Value> {
    match body {
        Value::Object(mut map) => match map.remove("files") {
            Some(Value::Array(files)) => Ok(files),
            Some(other) => {
                map.insert("files".to_string(), other);
                Ok(vec![Value::Object(map)])
            }
            None => Ok(vec![Value::Object(map)]),
        },
        other => Err(other),
    }
}
