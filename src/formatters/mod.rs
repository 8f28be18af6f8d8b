pub mod dot;
pub mod json_report;

pub use dot::DotFormatter;
pub use json_report::JsonReportFormatter;
