//! The request/response contract between the UI and whatever answers its
//! calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// A successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self { data, status: 200 }
    }

    pub fn created(data: Value) -> Self {
        Self { data, status: 201 }
    }
}

/// A rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult = std::result::Result<ApiResponse, ApiError>;

/// A file handed to the upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    /// The content type the caller declared, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Files(Vec<UploadedFile>),
}

impl RequestBody {
    /// The JSON payload, with an empty body reading as `{}`.
    pub fn json(&self) -> Value {
        match self {
            RequestBody::Json(v) => v.clone(),
            _ => Value::Object(Default::default()),
        }
    }
}

impl From<Value> for RequestBody {
    fn from(v: Value) -> Self {
        RequestBody::Json(v)
    }
}

impl From<Vec<UploadedFile>> for RequestBody {
    fn from(files: Vec<UploadedFile>) -> Self {
        RequestBody::Files(files)
    }
}
