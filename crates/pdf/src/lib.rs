pub mod report;

pub use report::{format_line, layout, render_report, LinePlacement, ReportError, REPORT_FILENAME};
