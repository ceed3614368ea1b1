// src/i18n/mod.rs
pub mod error;
pub mod interpolate;
pub mod langs;
pub mod persistence;
pub mod resolver;
pub mod service;
pub mod source;
pub mod types;

pub use error::TranslationError;
pub use interpolate::Variables;
pub use persistence::{MemoryPreferenceStore, PreferenceStore, TomlPreferenceStore};
pub use resolver::{with_lang_query, Environment, LanguageResolver, ResolvedFrom};
pub use service::{
    ApplyReport, Binding, EngineState, LoadOutcome, SwitchOutcome, TranslationEngine, WriteMode,
};
pub use source::{DirectorySource, EmbeddedSource, MemorySource, TranslationSource};
#[cfg(feature = "remote")]
pub use source::RemoteSource;
pub use types::{LanguageCode, LanguageSet, Lookup, TranslationNode, TranslationTable};

pub use crate::core::constants::DEFAULT_LANGUAGE;

/// Shorthand for `engine.lookup(key, None)` or `engine.lookup(key, Some(fallback))`.
#[macro_export]
macro_rules! t {
    ($engine:expr, $key:expr) => { $engine.lookup($key, None) };
    ($engine:expr, $key:expr, $fallback:expr) => { $engine.lookup($key, Some($fallback)) };
}

/// Shorthand for `engine.interpolate` with inline `name => value` pairs.
#[macro_export]
macro_rules! tv {
    ($engine:expr, $key:expr $(, $name:expr => $value:expr)*) => {{
        let mut variables = $crate::i18n::Variables::new();
        $( variables.insert(($name).to_string(), ($value).to_string()); )*
        $engine.interpolate($key, &variables, None)
    }};
}
