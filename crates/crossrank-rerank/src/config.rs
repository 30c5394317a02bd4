use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "BAAI/bge-reranker-v2-m3";
pub const DEFAULT_MAX_LENGTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cpu" => Some(Self::Cpu),
            "cuda" | "gpu" => Some(Self::Cuda),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    pub model: String,
    pub max_length: usize,
    pub device: Device,
    pub cache_dir: Option<PathBuf>,
    pub show_download_progress: bool,
}

impl FastEmbedConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_length: DEFAULT_MAX_LENGTH,
            device: Device::Cpu,
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

impl Default for FastEmbedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}
