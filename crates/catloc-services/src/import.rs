//! Bulk import of content cards from a delimited text file.
//!
//! The pipeline parses the file into per-line candidates, validates each one
//! independently, and drives the aggregate writer over the survivors,
//! sequentially and in file order. Row problems are recorded into the
//! outcome and never abort the run; only structural defects (no header,
//! missing mandatory columns, no data) reject the file before any row is
//! processed.
//!
//! Row failure messages are written for the catalog's admin audience in
//! Spanish; the CLI frames them with its own localized strings.

use std::collections::HashMap;

use catloc_core::{Locale, ParentId};
use catloc_domain::{Aggregate, Card, CardKind, CardText, ImportOutcome, ImportPlan};
use catloc_store::CatalogStore;

use crate::writer::create_aggregate;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field delimiter; one character, `,` by default.
    pub delimiter: char,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions { delimiter: ',' }
    }
}

/// File-level defect that prevents any row from being processed.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StructuralImportError {
    #[error("the file is empty")]
    Empty,
    #[error("the file has a header but no data rows")]
    NoDataRows,
    #[error("missing mandatory columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// One parsed data line: raw values keyed by header column plus the
/// physical 1-based line number (the header is line 1). Transient; becomes
/// an aggregate candidate or a recorded failure.
#[derive(Debug, Clone)]
struct ImportRow {
    line: usize,
    values: HashMap<String, String>,
}

impl ImportRow {
    fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    fn flag(&self, column: &str) -> bool {
        parse_flag(self.get(column))
    }
}

/// Permissive boolean: trimmed `"true"` (any case) or `"1"` mean true,
/// anything else (including an absent column) means false.
fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn content_column(locale: Locale) -> String {
    format!("content_{}", locale.code())
}

fn mandatory_columns() -> Vec<String> {
    let mut columns = vec!["id".to_string()];
    columns.extend(Locale::required().map(content_column));
    columns
}

fn parse_rows(text: &str, opts: &ImportOptions) -> Result<Vec<ImportRow>, StructuralImportError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw))
        .filter(|(_, raw)| !raw.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(StructuralImportError::Empty);
    };
    let header: Vec<String> = header_line
        .split(opts.delimiter)
        .map(|column| column.trim().to_string())
        .collect();
    let missing: Vec<String> = mandatory_columns()
        .into_iter()
        .filter(|column| !header.contains(column))
        .collect();
    if !missing.is_empty() {
        return Err(StructuralImportError::MissingColumns(missing));
    }

    let rows: Vec<ImportRow> = lines
        .map(|(line, raw)| {
            // Positional zip of header to values; missing trailing values
            // default to empty, surplus values are dropped.
            let mut split = raw.split(opts.delimiter);
            let values = header
                .iter()
                .map(|column| {
                    let value = split.next().unwrap_or("").trim().to_string();
                    (column.clone(), value)
                })
                .collect();
            ImportRow { line, values }
        })
        .collect();
    if rows.is_empty() {
        return Err(StructuralImportError::NoDataRows);
    }
    Ok(rows)
}

fn validate_row(row: &ImportRow) -> Result<(), String> {
    if row.get("id").is_empty() {
        return Err("falta la referencia de la categoría (columna `id`)".to_string());
    }
    let blank: Vec<&'static str> = Locale::required()
        .filter(|locale| row.get(&content_column(*locale)).is_empty())
        .map(Locale::code)
        .collect();
    if !blank.is_empty() {
        return Err(format!(
            "falta el contenido obligatorio en: {}",
            blank.join(", ")
        ));
    }
    Ok(())
}

fn aggregate_from_row(row: &ImportRow) -> Aggregate<CardKind> {
    let icon = row.get("icon");
    let parent = Card {
        category_id: ParentId::new(row.get("id")),
        icon: (!icon.is_empty()).then(|| icon.to_string()),
        intensity: None,
        is_active: row.flag("is_active"),
        is_premium: row.flag("is_premium"),
    };
    let mut aggregate = Aggregate::<CardKind>::new(parent);
    for locale in Locale::all() {
        let content = row.get(&content_column(locale));
        // Blank optional locales are omitted, never stored as empty rows.
        if !content.is_empty() {
            aggregate.translations.insert(
                locale,
                CardText {
                    content: content.to_string(),
                    tags: None,
                },
            );
        }
    }
    aggregate
}

/// What happened to one data line.
#[derive(Debug)]
pub struct RowOutcome {
    pub line: usize,
    /// Created parent id, or the user-facing failure message.
    pub result: Result<ParentId, String>,
}

/// Lazy bulk-import pipeline: one validated row is written per `next()`
/// call, strictly in file order, so a caller can fold the outcomes into its
/// own live progress state. Restartable only from scratch; rows already
/// written stay written if the iterator is dropped early.
pub struct BulkImport<'a, S> {
    store: &'a S,
    rows: std::vec::IntoIter<ImportRow>,
    total: usize,
}

impl<'a, S: CatalogStore> BulkImport<'a, S> {
    pub fn new(
        store: &'a S,
        text: &str,
        opts: &ImportOptions,
    ) -> Result<Self, StructuralImportError> {
        let rows = parse_rows(text, opts)?;
        Ok(BulkImport {
            store,
            total: rows.len(),
            rows: rows.into_iter(),
        })
    }

    /// Number of data rows the file holds (all of them will be attempted).
    pub fn total_rows(&self) -> usize {
        self.total
    }
}

impl<S: CatalogStore> Iterator for BulkImport<'_, S> {
    type Item = RowOutcome;

    fn next(&mut self) -> Option<RowOutcome> {
        let row = self.rows.next()?;
        if let Err(message) = validate_row(&row) {
            return Some(RowOutcome {
                line: row.line,
                result: Err(message),
            });
        }
        let aggregate = aggregate_from_row(&row);
        let result = match create_aggregate(self.store, &aggregate) {
            Ok(id) => Ok(id),
            // A row-level write failure is recorded, not retried; the run
            // moves on to the next line.
            Err(err) => Err(format!("no se pudo guardar la fila: {err}")),
        };
        Some(RowOutcome {
            line: row.line,
            result,
        })
    }
}

/// Parse and validate only: the dry-run twin of [`run_file_import`].
/// Needs no store and performs zero writes.
pub fn plan_file_import(
    text: &str,
    opts: &ImportOptions,
) -> Result<ImportPlan, StructuralImportError> {
    let rows = parse_rows(text, opts)?;
    let mut plan = ImportPlan::new();
    plan.total_rows = rows.len();
    for row in &rows {
        match validate_row(row) {
            Ok(()) => plan.valid_rows += 1,
            Err(message) => plan.issues.push(catloc_domain::ImportFailure {
                line: row.line,
                message,
            }),
        }
    }
    Ok(plan)
}

/// Run a whole file through the pipeline and fold the outcome.
pub fn run_file_import<S: CatalogStore>(
    store: &S,
    text: &str,
    opts: &ImportOptions,
) -> Result<ImportOutcome, StructuralImportError> {
    run_file_import_with_progress(store, text, opts, |_, _| {})
}

/// Like [`run_file_import`], reporting `(done, total)` after every attempted
/// row regardless of its outcome.
pub fn run_file_import_with_progress<S: CatalogStore>(
    store: &S,
    text: &str,
    opts: &ImportOptions,
    mut progress: impl FnMut(usize, usize),
) -> Result<ImportOutcome, StructuralImportError> {
    let pipeline = BulkImport::new(store, text, opts)?;
    let total = pipeline.total_rows();
    let mut outcome = ImportOutcome::new();
    for (done, row) in pipeline.enumerate() {
        match row.result {
            Ok(_) => outcome.record_success(),
            Err(message) => outcome.record_failure(row.line, message),
        }
        progress(done + 1, total);
    }
    tracing::debug!(
        event = "bulk_import_done",
        attempted = outcome.attempted,
        succeeded = outcome.succeeded,
        failed = outcome.failures.len()
    );
    Ok(outcome)
}
