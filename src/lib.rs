#[macro_export]
macro_rules! impl_default {
    ($type:ty, $body:expr) => {
        impl Default for $type {
            fn default() -> Self {
                $body
            }
        }
    };
}

// Module definitions
pub mod core;
pub mod dom;
pub mod i18n;

// Essential re-exports
pub use core::config::Config;
pub use core::error::{AppError, Result};
pub use dom::{Document, Element, History, Markers, MemoryDocument, MemoryElement, MemoryHistory};
pub use i18n::{Environment, LanguageCode, LanguageSet, TranslationEngine, TranslationTable};

/// Loads the config at `path` and builds an engine from it.
pub async fn engine_from_config_file<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<(Config, TranslationEngine)> {
    let config = Config::load(path).await?;
    let engine = TranslationEngine::from_config(&config)?;
    Ok((config, engine))
}
