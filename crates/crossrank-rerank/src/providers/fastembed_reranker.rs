//! Local cross-encoder scorer backed by fastembed's ONNX `TextRerank`.
//!
//! The tokenizer truncates every pair to the configured `max_length` and pads
//! each batch to its longest member. ONNX Runtime runs inference only, so no
//! gradient state is ever allocated.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::{Device, FastEmbedConfig};
use crate::error::ScorerError;
use crate::traits::Scorer;
use crate::types::Pair;

pub struct FastEmbedScorer {
    model: Arc<Mutex<TextRerank>>,
    model_code: String,
    max_length: usize,
}

impl FastEmbedScorer {
    pub fn new(config: FastEmbedConfig) -> Result<Self, ScorerError> {
        if config.device != Device::Cpu {
            return Err(ScorerError::Config(format!(
                "device {} is not available in this build, use cpu",
                config.device.as_str()
            )));
        }
        if config.max_length == 0 {
            return Err(ScorerError::Config("max_length must be positive".to_string()));
        }

        let (model, model_code) = resolve_model(&config.model)?;
        let mut options = RerankInitOptions::new(model)
            .with_max_length(config.max_length)
            .with_show_download_progress(config.show_download_progress);
        if let Some(dir) = config.cache_dir {
            options = options.with_cache_dir(dir);
        }

        let rerank = TextRerank::try_new(options).map_err(|err| {
            ScorerError::Model(format!("failed to load reranker {model_code}: {err:#}"))
        })?;

        Ok(Self {
            model: Arc::new(Mutex::new(rerank)),
            model_code,
            max_length: config.max_length,
        })
    }

}

#[async_trait]
impl Scorer for FastEmbedScorer {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    async fn score(&self, pairs: Vec<Pair>, max_length: usize) -> Result<Vec<f32>, ScorerError> {
        if max_length != self.max_length {
            return Err(ScorerError::Config(format!(
                "model {} was loaded with max_length {}, got {max_length}",
                self.model_code, self.max_length
            )));
        }
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let mut guard = model.lock();
            score_batched(&mut guard, &pairs)
        })
        .await
        .map_err(|err| ScorerError::Model(format!("scoring worker failed: {err}")))?
    }
}

/// Scores each run of pairs sharing a query as one batch and restores pair order.
fn score_batched(model: &mut TextRerank, pairs: &[Pair]) -> Result<Vec<f32>, ScorerError> {
    let mut scores = Vec::with_capacity(pairs.len());
    for run in query_runs(pairs) {
        let Some(first) = run.first() else {
            continue;
        };
        let texts: Vec<&str> = run.iter().map(|p| p.text.as_str()).collect();
        let batch_size = texts.len();
        debug!(batch_size, "running cross-encoder batch");

        let results = model
            .rerank(first.query.as_ref(), texts, false, Some(batch_size))
            .map_err(|err| ScorerError::classify(format!("{err:#}")))?;

        // fastembed hands results back sorted by score; put them back by index.
        let placed = place_by_index(results.iter().map(|r| (r.index, r.score)), batch_size)?;
        scores.extend(placed);
    }
    Ok(scores)
}

/// Restores `(index, score)` results to input order; every index in `0..len`
/// must appear exactly once.
fn place_by_index(
    results: impl IntoIterator<Item = (usize, f32)>,
    len: usize,
) -> Result<Vec<f32>, ScorerError> {
    let mut placed: Vec<Option<f32>> = vec![None; len];
    for (index, score) in results {
        let slot = placed.get_mut(index).ok_or_else(|| {
            ScorerError::Model(format!(
                "reranker returned index {index} for a batch of {len}"
            ))
        })?;
        if slot.replace(score).is_some() {
            return Err(ScorerError::Model(format!(
                "reranker returned index {index} twice"
            )));
        }
    }
    placed
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                ScorerError::Model(format!("reranker omitted a score for batch member {index}"))
            })
        })
        .collect()
}

fn query_runs(pairs: &[Pair]) -> Vec<&[Pair]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for (idx, window) in pairs.windows(2).enumerate() {
        if let [prev, next] = window {
            if prev.query != next.query {
                runs.extend(pairs.get(start..=idx));
                start = idx + 1;
            }
        }
    }
    runs.extend(pairs.get(start..));
    runs.retain(|run| !run.is_empty());
    runs
}

/// Looks a model identifier up among fastembed's supported rerankers.
///
/// Accepts the exact model code or any `<org>/<name>` whose `<name>` matches, so
/// `BAAI/bge-reranker-v2-m3` resolves to the ONNX export fastembed ships.
pub fn resolve_model(name: &str) -> Result<(RerankerModel, String), ScorerError> {
    let wanted = name.trim();
    let wanted_repo = repo_name(wanted);
    let supported = TextRerank::list_supported_models();

    let exact = supported
        .iter()
        .find(|info| info.model_code.eq_ignore_ascii_case(wanted));
    let by_repo = || {
        supported
            .iter()
            .find(|info| repo_name(&info.model_code).eq_ignore_ascii_case(wanted_repo))
    };

    match exact.or_else(by_repo) {
        Some(info) => Ok((info.model.clone(), info.model_code.clone())),
        None => {
            let known: Vec<&str> = supported.iter().map(|i| i.model_code.as_str()).collect();
            Err(ScorerError::Config(format!(
                "unsupported reranker model {wanted}, expected one of: {}",
                known.join(", ")
            )))
        }
    }
}

fn repo_name(code: &str) -> &str {
    code.rsplit('/').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(query: &str, text: &str) -> Pair {
        Pair {
            query: Arc::from(query),
            text: text.to_string(),
        }
    }

    #[test]
    fn resolves_default_model_by_repo_name() {
        let (model, code) = resolve_model("BAAI/bge-reranker-v2-m3").expect("resolve default");
        assert_eq!(model, RerankerModel::BGERerankerV2M3);
        assert!(code.ends_with("/bge-reranker-v2-m3"));
    }

    #[test]
    fn resolves_exact_model_code() {
        let (model, code) = resolve_model("BAAI/bge-reranker-base").expect("resolve base");
        assert_eq!(model, RerankerModel::BGERerankerBase);
        assert_eq!(code, "BAAI/bge-reranker-base");
    }

    #[test]
    fn unknown_model_is_a_config_error() {
        let err = resolve_model("acme/not-a-reranker").expect_err("unknown model");
        assert!(matches!(err, ScorerError::Config(_)));
        assert!(err.to_string().contains("acme/not-a-reranker"));
    }

    #[test]
    fn cuda_device_is_rejected_before_loading() {
        let mut cfg = FastEmbedConfig::default();
        cfg.device = Device::Cuda;
        let err = FastEmbedScorer::new(cfg).err().expect("cuda rejected");
        assert!(matches!(err, ScorerError::Config(_)));
    }

    #[test]
    fn place_by_index_restores_input_order() {
        let sorted_by_score = vec![(2, 0.9), (0, 0.4), (3, 0.1), (1, -2.5)];
        let scores = place_by_index(sorted_by_score, 4).expect("place");
        assert_eq!(scores, vec![0.4, -2.5, 0.9, 0.1]);
    }

    #[test]
    fn place_by_index_rejects_missing_member() {
        let err = place_by_index(vec![(0, 1.0), (2, 0.5)], 3).expect_err("missing index 1");
        assert!(matches!(err, ScorerError::Model(_)));
        assert!(err.to_string().contains("member 1"));
    }

    #[test]
    fn place_by_index_rejects_out_of_range_index() {
        let err = place_by_index(vec![(0, 1.0), (5, 0.5)], 2).expect_err("index 5 of 2");
        assert!(matches!(err, ScorerError::Model(_)));
        assert!(err.to_string().contains("index 5 for a batch of 2"));
    }

    #[test]
    fn place_by_index_rejects_repeated_index() {
        let err = place_by_index(vec![(0, 1.0), (0, 0.5)], 2).expect_err("index 0 twice");
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn query_runs_split_on_query_change() {
        let pairs = vec![
            pair("a", "1"),
            pair("a", "2"),
            pair("b", "3"),
            pair("a", "4"),
        ];
        let runs = query_runs(&pairs);
        let lens: Vec<usize> = runs.iter().map(|r| r.len()).collect();
        assert_eq!(lens, vec![2, 1, 1]);
    }

    #[test]
    fn single_query_is_one_run() {
        let pairs = vec![pair("q", "1"), pair("q", "2"), pair("q", "3")];
        assert_eq!(query_runs(&pairs).len(), 1);
        assert!(query_runs(&[]).is_empty());
    }
}
