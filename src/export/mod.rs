//! Export module
//!
//! - CSV: the same four-column layout `import` reads, so exports re-import
//! - JSON: every stored expense with export metadata

pub mod csv;
pub mod json;

pub use self::csv::{export_expenses_csv, CSV_HEADER};
pub use self::json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
