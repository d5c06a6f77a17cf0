//! CLI command handlers for the stride application.

mod catalogue;
mod rank;
mod recommend;

pub(crate) use catalogue::handle_catalogue_command;
pub(crate) use rank::handle_rank_command;
pub(crate) use recommend::handle_recommend_command;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stride_catalogue::{CatalogueProvider, FileCatalogue};
use stride_matching::{MatchEngine, ScoringTable};

use crate::config::{prose_timeout, scoring_table_path, ENV_CATALOGUE};

/// Reads a request body from a file, or stdin for `-`.
pub(crate) fn read_request(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read request from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))
}

pub(crate) fn catalogue_provider(path: Option<PathBuf>) -> Result<Arc<dyn CatalogueProvider>> {
    let path = path.with_context(|| {
        format!("No catalogue configured; pass --catalogue or set {ENV_CATALOGUE}")
    })?;
    Ok(Arc::new(FileCatalogue::new(path)))
}

/// Builds the engine with the scoring-table override (flag, then
/// `STRIDE_SCORING_TABLE`) and the configured text-generation timeout.
pub(crate) fn build_engine(table: Option<&Path>) -> Result<MatchEngine> {
    let table = match table.map(Path::to_path_buf).or_else(scoring_table_path) {
        Some(path) => ScoringTable::load(&path)?,
        None => ScoringTable::default(),
    };
    let engine = MatchEngine::new(Arc::new(table));
    Ok(match prose_timeout() {
        Some(timeout) => engine.with_bullet_timeout(timeout),
        None => engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_SCORING_TABLE;
    use serial_test::serial;
    use stride_test_utils::set_env_var;

    #[test]
    #[serial]
    fn build_engine_reads_table_from_env_when_no_flag() {
        let _table = set_env_var(ENV_SCORING_TABLE, Some("/nonexistent/stride/table.toml"));
        assert!(build_engine(None).is_err());
    }

    #[test]
    #[serial]
    fn build_engine_uses_default_table_when_unset() {
        let _table = set_env_var(ENV_SCORING_TABLE, Some("  "));
        assert!(build_engine(None).is_ok());
    }

    #[test]
    fn catalogue_provider_requires_a_path() {
        let err = catalogue_provider(None).err().map(|e| e.to_string());
        assert!(err.is_some_and(|msg| msg.contains("--catalogue")));
    }
}
