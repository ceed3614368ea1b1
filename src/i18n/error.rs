// src/i18n/error.rs

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    InvalidLanguage(String),
    LoadError(String),
    ParseError(String),
    FetchError(String),
}

impl std::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLanguage(lang) => write!(f, "Unsupported language: {}", lang),
            Self::LoadError(msg) => write!(f, "Load error: {}", msg),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::FetchError(msg) => write!(f, "Fetch error: {}", msg),
        }
    }
}

impl std::error::Error for TranslationError {}
