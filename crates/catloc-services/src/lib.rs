//! High-level orchestration layer over the capability crates.
//! Intentionally thin: exposes stable functions used by the CLI and the
//! admin GUI without those importing the store or domain internals.

pub use catloc_core::Result;

mod import;
mod template;
mod writer;

pub use import::{
    plan_file_import, run_file_import, run_file_import_with_progress, BulkImport, ImportOptions,
    RowOutcome, StructuralImportError,
};
pub use template::{template_csv, write_template_csv};
pub use writer::{
    create_aggregate, delete_aggregate, load_aggregate, update_aggregate, WriteError, WritePhase,
};
