//! Configuration loader and path helpers.
//!
//! Figment merges `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates sections, e.g. `APP_GENERATOR__ENABLED=true`).

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed view of every section, with defaults for anything unset.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub generator: GeneratorSettings,
    pub advice: AdviceSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be >= 1".into()));
        }
        if self.retrieval.batch_size == 0 {
            return Err(Error::InvalidConfig("retrieval.batch_size must be >= 1".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be >= 1".into()));
        }
        if self.generator.enabled && self.generator.timeout_ms == 0 {
            return Err(Error::InvalidConfig("generator.timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub corpus_path: String,
    pub index_path: String,
    pub documents_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            corpus_path: "data/corpus.txt".to_string(),
            index_path: "data/index/skillmentor.idx".to_string(),
            documents_path: "data/index/documents.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub batch_size: usize,
    pub show_progress: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 3, batch_size: 32, show_progress: false } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Use the hashing embedder instead of loading a model.
    pub use_fake: bool,
    /// Output dimension of the hashing embedder.
    pub dim: usize,
    pub model_dir: Option<String>,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { use_fake: false, dim: 384, model_dir: None, max_len: 256 } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceSettings {
    /// Fixed seed for advice rotation; random when unset.
    pub seed: Option<u64>,
    /// JSON file replacing the built-in advice pools.
    pub catalog_path: Option<String>,
    pub min_keyword_len: usize,
}

impl Default for AdviceSettings {
    fn default() -> Self { Self { seed: None, catalog_path: None, min_keyword_len: 4 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
