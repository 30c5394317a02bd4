use std::sync::Arc;

use crate::config::FastEmbedConfig;
use crate::error::ScorerError;
use crate::providers::FastEmbedScorer;
use crate::traits::Scorer;

pub fn build_scorer(cfg: FastEmbedConfig) -> Result<Arc<dyn Scorer>, ScorerError> {
    Ok(Arc::new(FastEmbedScorer::new(cfg)?))
}
