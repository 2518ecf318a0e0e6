//! CSV codec - denormalized export and tolerant import

pub mod export;
pub mod import;

pub use export::{export_filename, to_csv, EXPORT_HEADER};
pub use import::{parse_csv, CsvError, ImportRecord};
