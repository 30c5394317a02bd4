//! Rerank request pipeline: normalize, pair, score, assemble.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_LENGTH;
use crate::error::RerankError;
use crate::traits::Scorer;
use crate::types::{Document, Pair, RerankRequest, RerankResponse, ScoredResult};

/// Characters of the query echoed into logs.
pub const QUERY_LOG_CHARS: usize = 50;

/// Drops documents without visible text, keeping the survivors in order.
pub fn normalize_documents(documents: Vec<Document>) -> Vec<Document> {
    documents.into_iter().filter(Document::has_content).collect()
}

pub fn build_pairs(query: &str, documents: &[Document]) -> Vec<Pair> {
    let query: Arc<str> = Arc::from(query);
    documents
        .iter()
        .map(|doc| Pair {
            query: Arc::clone(&query),
            text: doc.text().to_string(),
        })
        .collect()
}

/// Pairs `documents[i]` with `scores[i]` and sorts by similarity, highest first.
///
/// The sort is stable so tied scores keep document order.
pub fn assemble_results(
    documents: Vec<Document>,
    scores: Vec<f32>,
) -> Result<Vec<ScoredResult>, RerankError> {
    if documents.len() != scores.len() {
        return Err(RerankError::ScoreCountMismatch {
            expected: documents.len(),
            actual: scores.len(),
        });
    }

    let mut results: Vec<ScoredResult> = documents
        .into_iter()
        .zip(scores)
        .map(|(doc, similarity)| ScoredResult {
            id: doc.id,
            similarity,
        })
        .collect();
    results.sort_by(|a, b| similarity_desc(a.similarity, b.similarity));
    Ok(results)
}

/// Descending order with NaN after every number.
fn similarity_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}

pub fn truncate_for_log(text: &str) -> &str {
    match text.char_indices().nth(QUERY_LOG_CHARS) {
        Some((idx, _)) => text.get(..idx).unwrap_or(text),
        None => text,
    }
}

/// Runs rerank requests against one shared scorer.
#[derive(Clone)]
pub struct Reranker {
    scorer: Arc<dyn Scorer>,
    max_length: usize,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self {
            scorer,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub async fn rerank(&self, request: RerankRequest) -> Result<RerankResponse, RerankError> {
        let RerankRequest { query, documents } = request;
        info!(
            documents = documents.len(),
            "reranking {} documents for query: {}...",
            documents.len(),
            truncate_for_log(&query)
        );

        if documents.is_empty() {
            info!("no documents supplied, returning empty result");
            return Ok(RerankResponse::empty());
        }

        let documents = normalize_documents(documents);
        if documents.is_empty() {
            info!("all documents empty after filtering, returning empty result");
            return Ok(RerankResponse::empty());
        }
        if query.trim().is_empty() {
            warn!("query is blank, scoring it as given");
        }

        let pairs = build_pairs(&query, &documents);
        let started = Instant::now();
        let scores = self
            .scorer
            .score(pairs, self.max_length)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    scorer = self.scorer.name(),
                    documents = documents.len(),
                    query = truncate_for_log(&query),
                    error = %err,
                    "scoring failed"
                );
            })?;
        debug!(
            scored = scores.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "scoring finished"
        );

        let data = assemble_results(documents, scores)?;
        Ok(RerankResponse { data })
    }
}
