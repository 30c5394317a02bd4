use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use crossrank_rerank::{Device, FastEmbedConfig, DEFAULT_MAX_LENGTH, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_length: usize,
    pub model: String,
    pub device: Device,
    pub cache_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => 8787,
        };
        let max_length = match get("MAX_LENGTH") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_LENGTH must be an integer, got {raw:?}"))?,
            None => DEFAULT_MAX_LENGTH,
        };
        if max_length == 0 {
            bail!("MAX_LENGTH must be positive");
        }
        let model = get("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let device = match get("DEVICE") {
            Some(raw) => Device::parse(&raw)
                .with_context(|| format!("DEVICE must be cpu or cuda, got {raw:?}"))?,
            None => Device::Cpu,
        };
        let cache_dir = get("MODEL_CACHE_DIR").map(PathBuf::from);

        Ok(Self {
            host,
            port,
            max_length,
            model,
            device,
            cache_dir,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scorer_config(&self) -> FastEmbedConfig {
        let mut cfg = FastEmbedConfig::new(self.model.clone());
        cfg.max_length = self.max_length;
        cfg.device = self.device;
        cfg.cache_dir = self.cache_dir.clone();
        cfg
    }

    pub fn log_summary(&self) {
        tracing::info!("host: {}", self.host);
        tracing::info!("port: {}", self.port);
        tracing::info!("max_length: {}", self.max_length);
        tracing::info!("model: {}", self.model);
        tracing::info!("device: {}", self.device.as_str());
    }
}
