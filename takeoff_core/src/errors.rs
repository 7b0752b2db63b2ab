//! # Error Types
//!
//! Structured error types for takeoff_core. Every variant falls into one of
//! three kinds (see [`ErrorKind`]):
//!
//! - **Validation** - bad caller input. Never retried, surfaced as a 400.
//! - **NotFound** - a report lookup missed.
//! - **Persistence** - the report store failed. The whole request may be retried.
//!
//! Messages are available in English (`Display`) and Arabic
//! ([`CalcError::message_ar`]) so callers can render a bilingual response.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::errors::{CalcError, CalcResult};
//!
//! fn validate_depth(depth_m: f64) -> CalcResult<()> {
//!     if depth_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "foundationDepth",
//!             depth_m.to_string(),
//!             "must be greater than zero",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_depth(-1.0).unwrap_err().is_validation());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for takeoff_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Coarse classification of a [`CalcError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
}

/// Structured error type for estimation and report operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is present but unusable (non-numeric, zero, negative)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Two report items share the same id
    #[error("Duplicate item id in report: {id}")]
    DuplicateItemId { id: String },

    /// Neither a canonical nor a legacy project identifier was given
    #[error("A project identifier (projectId or projectIdLegacy) is required")]
    MissingProjectReference,

    /// No report with the given id exists
    #[error("Cost report not found: {id}")]
    ReportNotFound { id: String },

    /// Report store I/O failure
    #[error("Store error: {operation} on '{path}' - {reason}")]
    StoreError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Report store file is locked by another process
    #[error("Store locked: '{path}' is locked by {locked_by} since {locked_at}")]
    StoreLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Store schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DuplicateItemId error
    pub fn duplicate_item_id(id: impl Into<String>) -> Self {
        CalcError::DuplicateItemId { id: id.into() }
    }

    /// Create a ReportNotFound error
    pub fn report_not_found(id: impl Into<String>) -> Self {
        CalcError::ReportNotFound { id: id.into() }
    }

    /// Create a StoreError
    pub fn store_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::StoreError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreLocked error
    pub fn store_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::StoreLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidInput { .. }
            | CalcError::MissingField { .. }
            | CalcError::DuplicateItemId { .. }
            | CalcError::MissingProjectReference => ErrorKind::Validation,
            CalcError::ReportNotFound { .. } => ErrorKind::NotFound,
            CalcError::StoreError { .. }
            | CalcError::StoreLocked { .. }
            | CalcError::SerializationError { .. }
            | CalcError::VersionMismatch { .. } => ErrorKind::Persistence,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a recoverable error (the caller may resend the request)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalcError::StoreLocked { .. } | CalcError::StoreError { .. }
        )
    }

    /// The input field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. } | CalcError::MissingField { field } => Some(field),
            CalcError::DuplicateItemId { .. } => Some("items"),
            CalcError::MissingProjectReference => Some("projectId"),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::DuplicateItemId { .. } => "DUPLICATE_ITEM_ID",
            CalcError::MissingProjectReference => "MISSING_PROJECT_REFERENCE",
            CalcError::ReportNotFound { .. } => "REPORT_NOT_FOUND",
            CalcError::StoreError { .. } => "STORE_ERROR",
            CalcError::StoreLocked { .. } => "STORE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }

    /// Arabic rendering of this error, shown next to the English `Display` text.
    pub fn message_ar(&self) -> String {
        match self {
            CalcError::InvalidInput { field, value, .. } => {
                format!("قيمة غير صالحة للحقل '{}': {} - يجب أن تكون رقماً أكبر من صفر", field, value)
            }
            CalcError::MissingField { field } => format!("الحقل المطلوب مفقود: {}", field),
            CalcError::DuplicateItemId { id } => format!("معرّف البند مكرر في التقرير: {}", id),
            CalcError::MissingProjectReference => "يجب تحديد معرّف المشروع".to_string(),
            CalcError::ReportNotFound { id } => format!("تقرير التكلفة غير موجود: {}", id),
            CalcError::StoreError { .. } | CalcError::SerializationError { .. } => {
                "تعذر حفظ البيانات أو قراءتها، يرجى المحاولة مرة أخرى".to_string()
            }
            CalcError::StoreLocked { locked_by, .. } => {
                format!("ملف التقارير قيد الاستخدام من قبل {}", locked_by)
            }
            CalcError::VersionMismatch { file_version, expected_version } => {
                format!("إصدار الملف {} غير متوافق مع الإصدار المتوقع {}", file_version, expected_version)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("floors", "-2", "must be at least 1");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("area").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::duplicate_item_id("a").error_code(), "DUPLICATE_ITEM_ID");
        assert_eq!(CalcError::MissingProjectReference.error_code(), "MISSING_PROJECT_REFERENCE");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CalcError::missing_field("area").kind(), ErrorKind::Validation);
        assert_eq!(CalcError::report_not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            CalcError::store_error("write", "/tmp/x", "disk full").kind(),
            ErrorKind::Persistence
        );
        assert!(CalcError::store_error("write", "/tmp/x", "disk full").is_recoverable());
        assert!(!CalcError::missing_field("area").is_recoverable());
    }

    #[test]
    fn test_bilingual_messages() {
        let error = CalcError::missing_field("slabThickness");
        assert!(error.to_string().contains("slabThickness"));
        assert!(error.message_ar().contains("slabThickness"));
        assert_ne!(error.to_string(), error.message_ar());
    }

    #[test]
    fn test_error_field() {
        assert_eq!(CalcError::missing_field("floors").field(), Some("floors"));
        assert_eq!(CalcError::report_not_found("x").field(), None);
    }
}
