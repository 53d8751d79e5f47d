pub mod generator;
pub mod stats;

pub use generator::{generate_report, ReportOptions};
pub use stats::{subject_distribution, top_chapters_by_subject, total_duration, SessionFilter};
