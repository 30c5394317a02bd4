use async_trait::async_trait;

use crate::error::ScorerError;
use crate::types::Pair;

/// Relevance model capability consumed by the rerank pipeline.
///
/// Implementations must return exactly one score per pair, in pair order, and
/// must score the whole slice as one batch.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, pairs: Vec<Pair>, max_length: usize) -> Result<Vec<f32>, ScorerError>;
}
