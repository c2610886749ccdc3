pub mod json;
pub mod text;
pub mod writer;

pub use json::{
    ExportRecord, JsonConfig, JsonFormatter, SavedResult, convert_results_to_json, convert_saved_results_to_json,
    export_records, result_to_json, saved_results,
};
pub use text::{TextReportConfig, TextReportFormatter};
pub use writer::ReportWriter;
