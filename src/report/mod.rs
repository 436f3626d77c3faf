pub mod aggregate;
pub mod classroom;

pub use aggregate::{fair_mastery, top_difficulties, units_stats, FairMastery};
pub use classroom::{class_report_text, class_rows, csv_export, ingest, IngestOutcome, LearnerRow};
