//! CLI handler for the `recommend` command.

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;
use stride_matching::{BulletWriter, OfflineWriter};
use stride_prose::MessagesWriter;
use tokio::runtime::Runtime;

use super::{build_engine, catalogue_provider, read_request};
use crate::config::prose_enabled;
use crate::handler::{status_and_body, RequestHandler};

/// Picks the text generator: the HTTP writer when enabled and configured,
/// otherwise fallback bullets only.
fn bullet_writer(offline: bool) -> Arc<dyn BulletWriter> {
    if offline || !prose_enabled() {
        tracing::debug!(target: "stride::prose", "Text generation disabled");
        return Arc::new(OfflineWriter);
    }
    match MessagesWriter::from_env() {
        Ok(writer) => Arc::new(writer),
        Err(e) => {
            tracing::warn!(target: "stride::prose", error = %e, "Text generation unavailable, using fallback bullets");
            Arc::new(OfflineWriter)
        }
    }
}

/// Handle the `recommend` command.
pub(crate) fn handle_recommend_command(
    request: PathBuf,
    catalogue: Option<PathBuf>,
    table: Option<PathBuf>,
    offline: bool,
    compact: bool,
) -> Result<()> {
    let body = read_request(&request)?;
    let engine = build_engine(table.as_deref())?;
    let handler = RequestHandler::new(
        Arc::new(engine),
        catalogue_provider(catalogue)?,
        bullet_writer(offline),
    )?;

    let rt = Runtime::new()?;
    let result = rt.block_on(handler.handle_json(&body));
    let (status, payload) = status_and_body(&result);

    let rendered = if compact {
        serde_json::to_string(&payload)?
    } else {
        serde_json::to_string_pretty(&payload)?
    };
    println!("{rendered}");

    if status != 200 {
        bail!("request failed with status {status}");
    }
    Ok(())
}
