// SPDX-License-Identifier: MIT
//! Problem data model — the shape the browser extension pushes over the wire
//! and the shape persisted next to generated source files.

pub mod naming;
pub mod store;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

// ─── TestCase ─────────────────────────────────────────────────────────────────

/// One sample test. The `id` is assigned locally at ingestion time; any id
/// supplied by the extension is ignored and overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub id: String,
    pub input: String,
    pub output: String,
}

// ─── Problem ──────────────────────────────────────────────────────────────────

/// A scraped problem. `src_path` is absent from the wire payload and attached
/// once during ingestion; the struct is not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub group: String,
    /// Time limit in milliseconds, as sent by the extension.
    #[serde(default)]
    pub time_limit: u64,
    /// Memory limit in megabytes, as sent by the extension.
    #[serde(default)]
    pub memory_limit: u64,
    #[serde(default)]
    pub tests: Vec<TestCase>,
    /// Absolute path of the generated source file. Local-only field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_path: Option<PathBuf>,
}

impl Problem {
    /// Give every test a fresh locally generated id, replacing whatever the
    /// extension sent. Ids are unique within the problem.
    pub fn assign_test_ids(&mut self) {
        for test in &mut self.tests {
            test.id = Uuid::new_v4().to_string();
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
