pub const APP_TITLE: &str = "SITE LOCALIZER";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_LANGUAGE: &str = "en";
pub const BUILTIN_LANGUAGES: &[&str] = &["en", "de", "fr"];

pub const DEFAULT_CONFIG_FILE: &str = "site-localizer.toml";
pub const DEFAULT_PREFERENCE_FILE: &str = "preferences.toml";
pub const DEFAULT_STORAGE_KEY: &str = "site-language";
pub const DEFAULT_LOCALES_DIR: &str = "locales";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Query parameter and fragment marker name.
pub const LANG_PARAM: &str = "lang";

// DOM marker attributes
pub const ATTR_KEY: &str = "data-i18n";
pub const ATTR_FALLBACK: &str = "data-i18n-fallback";
pub const ATTR_HTML: &str = "data-i18n-html";
pub const ATTR_TEMPLATE: &str = "data-i18n-template";
pub const ATTR_VARIABLE_PREFIX: &str = "data-i18n-var-";
pub const ATTR_VARIABLES: &str = "data-i18n-vars";
pub const ATTR_SCAN: &str = "data-i18n-scan";
pub const ATTR_ORIGINAL: &str = "data-i18n-original";
