use thiserror::Error;

/// Failures raised by a [`crate::Scorer`] implementation.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("model inference failed: {0}")]
    Model(String),
}

impl ScorerError {
    /// Sorts an opaque inference-runtime message into the scorer taxonomy.
    ///
    /// ONNX Runtime and the tokenizer only surface stringly errors, so the
    /// classification is keyword based.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        if lower.contains("out of memory")
            || lower.contains("failed to allocate")
            || lower.contains("allocation")
        {
            Self::ResourceExhausted(message)
        } else if lower.contains("tokeniz")
            || lower.contains("encode")
            || lower.contains("encoding")
        {
            Self::Tokenization(message)
        } else {
            Self::Model(message)
        }
    }
}

#[derive(Debug, Error)]
pub enum RerankError {
    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error("scorer returned {actual} scores for {expected} pairs")]
    ScoreCountMismatch { expected: usize, actual: usize },
}
