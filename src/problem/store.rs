// SPDX-License-Identifier: MIT
//! Sidecar metadata store — one JSON file per generated source, keyed by the
//! source path, written to a `.companion/` directory next to the source.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Problem;

const SIDECAR_DIR: &str = ".companion";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SidecarRecord {
    saved_at: DateTime<Utc>,
    problem: Problem,
}

/// Persists problem metadata (tests, limits, url) alongside generated sources.
#[derive(Debug, Default)]
pub struct ProblemStore;

impl ProblemStore {
    pub fn new() -> Self {
        Self
    }

    /// `{folder}/.companion/{srcFileName}.prob` for a source at
    /// `{folder}/{srcFileName}`.
    pub fn sidecar_path(&self, src_path: &Path) -> Result<PathBuf> {
        let folder = src_path
            .parent()
            .context("source path has no parent directory")?;
        let file_name = src_path
            .file_name()
            .context("source path has no file name")?;
        let mut name = file_name.to_os_string();
        name.push(".prob");
        Ok(folder.join(SIDECAR_DIR).join(name))
    }

    pub async fn save(&self, src_path: &Path, problem: &Problem) -> Result<()> {
        let sidecar = self.sidecar_path(src_path)?;
        if let Some(dir) = sidecar.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let record = SidecarRecord {
            saved_at: Utc::now(),
            problem: problem.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(&sidecar, json).await?;
        debug!(path = %sidecar.display(), "saved problem sidecar");
        Ok(())
    }

    /// Load the problem saved for `src_path`. `Ok(None)` when no sidecar
    /// exists; `Err` when one exists but cannot be read or parsed.
    pub async fn load(&self, src_path: &Path) -> Result<Option<Problem>> {
        let sidecar = self.sidecar_path(src_path)?;
        let raw = match tokio::fs::read_to_string(&sidecar).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SidecarRecord = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt sidecar at {}", sidecar.display()))?;
        Ok(Some(record.problem))
    }
}
