pub mod document;
pub mod json;
pub mod transfer_code;

pub use document::{build_export, validate_export, ExportDocument, ValidationError};
pub use transfer_code::{build_report_card, CodeError, ReportCard};
