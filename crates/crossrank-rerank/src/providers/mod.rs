pub mod fastembed_reranker;

pub use fastembed_reranker::FastEmbedScorer;
