// src/i18n/source.rs
use crate::core::config::SourceConfig;
use crate::core::error::Result;
use crate::i18n::error::TranslationError;
use crate::i18n::types::{LanguageCode, TranslationTable};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type FetchResult = std::result::Result<TranslationTable, TranslationError>;

/// Fetches the translation document for one language.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    async fn fetch(&self, code: &LanguageCode) -> FetchResult;

    fn describe(&self) -> String;
}

/// Tables compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSource;

#[async_trait]
impl TranslationSource for EmbeddedSource {
    async fn fetch(&self, code: &LanguageCode) -> FetchResult {
        let content = crate::i18n::langs::get_language_file(code.as_str()).ok_or_else(|| {
            TranslationError::LoadError(format!("No embedded table for '{}'", code))
        })?;
        TranslationTable::from_json(&content)
    }

    fn describe(&self) -> String {
        format!("embedded ({})", crate::i18n::langs::embedded_languages().join(", "))
    }
}

/// `<dir>/<code>.json` on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, code: &LanguageCode) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }
}

#[async_trait]
impl TranslationSource for DirectorySource {
    async fn fetch(&self, code: &LanguageCode) -> FetchResult {
        let path = self.path_for(code);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| TranslationError::LoadError(format!("{}: {}", path.display(), e)))?;
        TranslationTable::from_json(&content)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// `<base_url>/<code>.json` over HTTP(S).
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, code: &LanguageCode) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), code)
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl TranslationSource for RemoteSource {
    async fn fetch(&self, code: &LanguageCode) -> FetchResult {
        let url = self.url_for(code);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TranslationError::FetchError(format!("{}: {}", url, e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::FetchError(format!("{}: {}", url, e)))?;
        TranslationTable::from_json(&body)
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}

/// Raw JSON documents held in memory, counting every fetch.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
    fetches: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, code: &str, json: impl Into<String>) -> Self {
        self.documents.insert(code.to_lowercase(), json.into());
        self
    }

    /// Shared counter; stays valid after the source is moved into an engine.
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait]
impl TranslationSource for MemorySource {
    async fn fetch(&self, code: &LanguageCode) -> FetchResult {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let content = self
            .documents
            .get(code.as_str())
            .ok_or_else(|| TranslationError::FetchError(format!("404 for '{}'", code)))?;
        TranslationTable::from_json(content)
    }

    fn describe(&self) -> String {
        format!("memory ({} documents)", self.documents.len())
    }
}

pub fn source_from_config(config: &SourceConfig) -> Result<Box<dyn TranslationSource>> {
    match config {
        SourceConfig::Embedded => Ok(Box::new(EmbeddedSource)),
        SourceConfig::Directory(dir) => Ok(Box::new(DirectorySource::new(dir.clone()))),
        #[cfg(feature = "remote")]
        SourceConfig::Remote(base_url) => Ok(Box::new(RemoteSource::new(base_url.clone()))),
        #[cfg(not(feature = "remote"))]
        SourceConfig::Remote(base_url) => Err(crate::core::error::AppError::Config(format!(
            "Remote source '{}' needs the `remote` feature",
            base_url
        ))),
    }
}
