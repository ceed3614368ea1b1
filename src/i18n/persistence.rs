// src/i18n/persistence.rs - persisted language preference
use crate::core::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use toml_edit::{value, DocumentMut, Item, Table};

/// A single stored language code that survives restarts.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, code: &str) -> Result<()>;
}

/// Process-local preference. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    value: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(code: &str) -> Self {
        let store = Self::default();
        store.set(Some(code.to_string()));
        store
    }

    pub fn get(&self) -> Option<String> {
        match self.value.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, code: Option<String>) {
        let mut guard = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Preference mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        };
        *guard = code;
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.get())
    }

    async fn save(&self, code: &str) -> Result<()> {
        self.set(Some(code.to_string()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `[preferences].<key> = "<code>"` inside a TOML file. Other content and
/// comments in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    key: String,
}

const SECTION: &str = "preferences";

impl TomlPreferenceStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_document(&self) -> Result<Option<DocumentMut>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content.parse::<DocumentMut>()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl PreferenceStore for TomlPreferenceStore {
    async fn load(&self) -> Result<Option<String>> {
        let Some(doc) = self.read_document().await? else {
            return Ok(None);
        };
        Ok(doc
            .get(SECTION)
            .and_then(|section| section.get(self.key.as_str()))
            .and_then(|item| item.as_str())
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty()))
    }

    async fn save(&self, code: &str) -> Result<()> {
        let rendered = {
            let mut doc = self.read_document().await?.unwrap_or_default();
            if !doc.get(SECTION).is_some_and(Item::is_table_like) {
                doc.insert(SECTION, Item::Table(Table::new()));
            }
            doc[SECTION][self.key.as_str()] = value(code);
            doc.to_string()
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, rendered).await?;

        log::debug!(
            "Language '{}' saved to {}",
            code.to_uppercase(),
            self.path.display()
        );
        Ok(())
    }
}
