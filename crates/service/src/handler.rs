//! Request handling: validation, catalogue loading, context classification
//! and dispatch to the matching engine.

use anyhow::Context;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use stride_catalogue::{Catalogue, CatalogueProvider};
use stride_matching::{BulletWriter, MatchEngine};

use crate::error::RequestError;
use crate::request::{MatchRequest, MatchResponse, RawRequest};
use crate::signals::SignalClassifier;

/// Serves matching requests against one catalogue source.
///
/// Requests share nothing but the read-only engine, catalogue and writer.
#[derive(Clone)]
pub struct RequestHandler {
    engine: Arc<MatchEngine>,
    catalogue: Arc<dyn CatalogueProvider>,
    writer: Arc<dyn BulletWriter>,
    classifier: Arc<SignalClassifier>,
}

impl RequestHandler {
    pub fn new(
        engine: Arc<MatchEngine>,
        catalogue: Arc<dyn CatalogueProvider>,
        writer: Arc<dyn BulletWriter>,
    ) -> anyhow::Result<Self> {
        let classifier = SignalClassifier::new().context("Failed to compile context rules")?;
        Ok(Self {
            engine,
            catalogue,
            writer,
            classifier: Arc::new(classifier),
        })
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Parses a JSON body and handles it.
    pub async fn handle_json(&self, body: &str) -> Result<MatchResponse, RequestError> {
        let raw = RawRequest::from_json(body)?;
        self.handle(raw).await
    }

    /// Validates, classifies and runs one request.
    ///
    /// The pipeline runs in its own task; a panic there is reported as
    /// [`RequestError::Internal`] and no partial payload is returned.
    pub async fn handle(&self, raw: RawRequest) -> Result<MatchResponse, RequestError> {
        let mode = raw.mode()?;
        let catalogue = self.catalogue.load()?;
        let request = self.prepare(raw, &catalogue)?;

        let engine = Arc::clone(&self.engine);
        let writer = Arc::clone(&self.writer);
        let task = tokio::spawn(async move {
            execute(&engine, &catalogue, writer.as_ref(), request).await
        });

        match task.await {
            Ok(Ok(response)) => {
                tracing::info!(target: "stride::service", mode = mode.label(), "Request served");
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "stride::service", mode = mode.label(), status = e.status(), error = %e, "Request failed");
                Err(e)
            }
            Err(join) => {
                tracing::error!(
                    target: "stride::service",
                    mode = mode.label(),
                    panicked = join.is_panic(),
                    error = %join,
                    "Matching task aborted"
                );
                Err(RequestError::Internal)
            }
        }
    }

    fn prepare(&self, raw: RawRequest, catalogue: &Catalogue) -> Result<MatchRequest, RequestError> {
        let classified = match raw.chat_context.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                self.classifier.classify(text, &brands(catalogue))
            }
            _ => Vec::new(),
        };
        raw.into_request(classified)
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

async fn execute(
    engine: &MatchEngine,
    catalogue: &Catalogue,
    writer: &dyn BulletWriter,
    request: MatchRequest,
) -> Result<MatchResponse, RequestError> {
    match request {
        MatchRequest::GapDetection {
            profile,
            current_shoes,
        } => {
            let gap = engine.detect_gap(catalogue, &current_shoes, &profile)?;
            Ok(MatchResponse::Gap { gap })
        }
        MatchRequest::Discovery(query) => {
            let results = engine.discover(catalogue, &query, writer).await?;
            Ok(MatchResponse::Discovery { results })
        }
        MatchRequest::Analysis(query) => {
            let outcome = engine.recommend(catalogue, &query, writer).await?;
            Ok(MatchResponse::Analysis(outcome))
        }
    }
}

fn brands(catalogue: &Catalogue) -> Vec<String> {
    catalogue
        .iter()
        .map(|shoe| shoe.brand.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Status code and JSON body for a handled request.
pub fn status_and_body(result: &Result<MatchResponse, RequestError>) -> (u16, Value) {
    let rendered = match result {
        Ok(response) => serde_json::to_value(response).map(|v| (200, v)),
        Err(e) => serde_json::to_value(e.body()).map(|v| (e.status(), v)),
    };
    rendered.unwrap_or_else(|e| {
        tracing::error!(target: "stride::service", error = %e, "Failed to serialize response");
        let fallback = RequestError::Internal;
        (
            fallback.status(),
            serde_json::json!({ "status": fallback.status(), "code": fallback.code(), "message": fallback.to_string() }),
        )
    })
}
