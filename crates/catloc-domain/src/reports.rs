//! Serializable report DTOs returned by bulk operations. These are the
//! stable JSON surface for callers; breaking changes bump [`SCHEMA_VERSION`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One rejected row of a bulk run: the physical 1-based line number in the
/// source file (header counts as line 1) and a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportFailure {
    pub line: usize,
    pub message: String,
}

/// Accumulated result of a bulk import run. Row failures never abort the
/// run; they land here in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportOutcome {
    pub schema_version: u32,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportOutcome {
    pub fn new() -> Self {
        ImportOutcome {
            schema_version: SCHEMA_VERSION,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, line: usize, message: impl Into<String>) {
        self.attempted += 1;
        self.failures.push(ImportFailure {
            line,
            message: message.into(),
        });
    }

    /// A run counts as successful when at least one row was persisted.
    pub fn is_success(&self) -> bool {
        self.succeeded > 0
    }
}

impl Default for ImportOutcome {
    fn default() -> Self {
        ImportOutcome::new()
    }
}

/// Dry-run report: rows are parsed and validated but nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportPlan {
    pub schema_version: u32,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub issues: Vec<ImportFailure>,
}

impl ImportPlan {
    pub fn new() -> Self {
        ImportPlan {
            schema_version: SCHEMA_VERSION,
            total_rows: 0,
            valid_rows: 0,
            issues: Vec::new(),
        }
    }
}

impl Default for ImportPlan {
    fn default() -> Self {
        ImportPlan::new()
    }
}
