// src/core/config.rs
use crate::core::constants::{
    ATTR_FALLBACK, ATTR_HTML, ATTR_KEY, ATTR_ORIGINAL, ATTR_SCAN, ATTR_TEMPLATE, ATTR_VARIABLES,
    ATTR_VARIABLE_PREFIX, BUILTIN_LANGUAGES, DEFAULT_LANGUAGE, DEFAULT_LOCALES_DIR,
    DEFAULT_LOG_LEVEL, DEFAULT_PREFERENCE_FILE, DEFAULT_STORAGE_KEY,
};
use crate::core::error::{AppError, Result};
use crate::dom::Markers;
use crate::i18n::LanguageSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// TOML Configuration Structure
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    language: LanguageConfigToml,
    #[serde(default)]
    source: SourceConfigToml,
    #[serde(default)]
    markers: MarkersToml,
    #[serde(default)]
    preferences: PreferencesToml,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguageConfigToml {
    #[serde(default = "default_supported")]
    supported: Vec<String>,
    #[serde(default = "default_language")]
    default: String,
    #[serde(default = "default_storage_key")]
    storage_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SourceConfigToml {
    #[serde(default = "default_source_kind")]
    kind: String,
    #[serde(default = "default_locales_dir")]
    path: String,
    #[serde(default)]
    base_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PreferencesToml {
    #[serde(default = "default_preference_file")]
    file: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkersToml {
    #[serde(default = "default_attr_key")]
    key: String,
    #[serde(default = "default_attr_fallback")]
    fallback: String,
    #[serde(default = "default_attr_html")]
    html: String,
    #[serde(default = "default_attr_template")]
    template: String,
    #[serde(default = "default_attr_variable_prefix")]
    variable_prefix: String,
    #[serde(default = "default_attr_variables")]
    variables: String,
    #[serde(default = "default_attr_scan")]
    scan: String,
    #[serde(default = "default_attr_original")]
    original: String,
}

// Default Functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.into()
}
fn default_supported() -> Vec<String> {
    BUILTIN_LANGUAGES.iter().map(|l| l.to_string()).collect()
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.into()
}
fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}
fn default_source_kind() -> String {
    "embedded".into()
}
fn default_locales_dir() -> String {
    DEFAULT_LOCALES_DIR.into()
}
fn default_preference_file() -> String {
    DEFAULT_PREFERENCE_FILE.into()
}

// Marker Defaults
fn default_attr_key() -> String {
    ATTR_KEY.into()
}
fn default_attr_fallback() -> String {
    ATTR_FALLBACK.into()
}
fn default_attr_html() -> String {
    ATTR_HTML.into()
}
fn default_attr_template() -> String {
    ATTR_TEMPLATE.into()
}
fn default_attr_variable_prefix() -> String {
    ATTR_VARIABLE_PREFIX.into()
}
fn default_attr_variables() -> String {
    ATTR_VARIABLES.into()
}
fn default_attr_scan() -> String {
    ATTR_SCAN.into()
}
fn default_attr_original() -> String {
    ATTR_ORIGINAL.into()
}

crate::impl_default!(LanguageConfigToml, LanguageConfigToml {
    supported: default_supported(),
    default: default_language(),
    storage_key: default_storage_key(),
});

crate::impl_default!(SourceConfigToml, SourceConfigToml {
    kind: default_source_kind(),
    path: default_locales_dir(),
    base_url: String::new(),
});

crate::impl_default!(PreferencesToml, PreferencesToml {
    file: default_preference_file(),
});

crate::impl_default!(MarkersToml, MarkersToml {
    key: default_attr_key(),
    fallback: default_attr_fallback(),
    html: default_attr_html(),
    template: default_attr_template(),
    variable_prefix: default_attr_variable_prefix(),
    variables: default_attr_variables(),
    scan: default_attr_scan(),
    original: default_attr_original(),
});

impl From<MarkersToml> for Markers {
    fn from(m: MarkersToml) -> Self {
        Self {
            key: m.key,
            fallback: m.fallback,
            html: m.html,
            template: m.template,
            variable_prefix: m.variable_prefix,
            variables: m.variables,
            scan: m.scan,
            original: m.original,
        }
    }
}

/// Where translation tables are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Embedded,
    Directory(PathBuf),
    Remote(String),
}

// Main Configuration Structure
#[derive(Debug, Clone)]
pub struct Config {
    config_path: Option<PathBuf>,
    pub log_level: String,
    pub languages: LanguageSet,
    pub storage_key: String,
    pub preference_file: PathBuf,
    pub source: SourceConfig,
    pub markers: Markers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            log_level: default_log_level(),
            languages: LanguageSet::builtin(),
            storage_key: default_storage_key(),
            preference_file: PathBuf::from(DEFAULT_PREFERENCE_FILE),
            source: SourceConfig::Embedded,
            markers: Markers::default(),
        }
    }
}

impl Config {
    /// Loads the config at `path`; a missing file yields the defaults.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let mut config = Self::parse(&content)?;
                config.config_path = Some(path.to_path_buf());
                log::debug!("Config loaded from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let languages =
            LanguageSet::new(file.language.supported.as_slice(), &file.language.default)?;

        let source = match file.source.kind.trim().to_lowercase().as_str() {
            "embedded" => SourceConfig::Embedded,
            "directory" | "dir" => SourceConfig::Directory(PathBuf::from(file.source.path)),
            "remote" | "http" => {
                if file.source.base_url.trim().is_empty() {
                    return Err(AppError::Config(
                        "source.base_url is required for a remote source".into(),
                    ));
                }
                SourceConfig::Remote(file.source.base_url)
            }
            other => {
                return Err(AppError::Config(format!(
                    "Unknown source kind '{}' (expected embedded, directory or remote)",
                    other
                )))
            }
        };

        if file.language.storage_key.trim().is_empty() {
            return Err(AppError::Validation("language.storage_key is empty".into()));
        }

        Ok(Self {
            config_path: None,
            log_level: file.log_level,
            languages,
            storage_key: file.language.storage_key,
            preference_file: PathBuf::from(file.preferences.file),
            source,
            markers: file.markers.into(),
        })
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
