// src/i18n/types.rs
use crate::core::constants::{BUILTIN_LANGUAGES, DEFAULT_LANGUAGE};
use crate::core::error::{AppError, Result};
use crate::i18n::error::TranslationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A normalised (lowercase, primary-subtag) language code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Reduces a code or locale tag (`de-DE`, `de_DE`, ` DE `) to its primary
    /// subtag. Returns `None` for anything that is not purely alphabetic.
    pub fn normalize(raw: &str) -> Option<Self> {
        let primary = raw.trim().split(['-', '_', '.', '@']).next()?;
        if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self(primary.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fixed set of supported codes plus the designated default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    supported: Vec<LanguageCode>,
    default: LanguageCode,
}

impl LanguageSet {
    pub fn new<S: AsRef<str>>(supported: &[S], default: &str) -> Result<Self> {
        let mut codes: Vec<LanguageCode> = Vec::with_capacity(supported.len());
        for raw in supported {
            let code = LanguageCode::normalize(raw.as_ref()).ok_or_else(|| {
                AppError::Validation(format!("Invalid language code: {}", raw.as_ref()))
            })?;
            if !codes.contains(&code) {
                codes.push(code);
            }
        }

        let default = LanguageCode::normalize(default)
            .filter(|d| codes.contains(d))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Default language '{}' is not one of {:?}",
                    default,
                    codes.iter().map(LanguageCode::as_str).collect::<Vec<_>>()
                ))
            })?;

        Ok(Self {
            supported: codes,
            default,
        })
    }

    /// `en` (default), `de`, `fr`.
    pub fn builtin() -> Self {
        Self {
            supported: BUILTIN_LANGUAGES
                .iter()
                .map(|l| LanguageCode(l.to_string()))
                .collect(),
            default: LanguageCode(DEFAULT_LANGUAGE.to_string()),
        }
    }

    /// Returns the supported code `raw` normalises to, if any.
    pub fn parse(&self, raw: &str) -> Option<LanguageCode> {
        LanguageCode::normalize(raw).filter(|code| self.supported.contains(code))
    }

    pub fn validate(&self, raw: &str) -> std::result::Result<LanguageCode, TranslationError> {
        self.parse(raw)
            .ok_or_else(|| TranslationError::InvalidLanguage(raw.to_string()))
    }

    pub fn contains(&self, code: &LanguageCode) -> bool {
        self.supported.contains(code)
    }

    pub fn default_code(&self) -> &LanguageCode {
        &self.default
    }

    pub fn is_default(&self, code: &LanguageCode) -> bool {
        &self.default == code
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageCode> {
        self.supported.iter()
    }

    pub fn len(&self) -> usize {
        self.supported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supported.is_empty()
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One node of a translation document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Text(String),
    Branch(BTreeMap<String, TranslationNode>),
    /// Numbers, booleans, arrays and nulls parse but never resolve.
    Opaque(serde_json::Value),
}

/// Result of walking a dotted key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    Missing,
}

impl<'a> Lookup<'a> {
    pub fn or<'b>(self, fallback: &'b str) -> &'b str
    where
        'a: 'b,
    {
        match self {
            Lookup::Found(text) => text,
            Lookup::Missing => fallback,
        }
    }
}

/// A whole translation document for one language. Always an object at the root.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranslationTable {
    root: BTreeMap<String, TranslationNode>,
}

impl TranslationTable {
    pub fn new(root: BTreeMap<String, TranslationNode>) -> Self {
        Self { root }
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, TranslationError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| TranslationError::ParseError(e.to_string()))?;
        if !value.is_object() {
            return Err(TranslationError::ParseError(
                "translation document must be a JSON object".into(),
            ));
        }
        let root = serde_json::from_value(value)
            .map_err(|e| TranslationError::ParseError(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn lookup_path(&self, key: &str) -> Lookup<'_> {
        let mut segments = key.split('.');
        let Some(first) = segments.next() else {
            return Lookup::Missing;
        };
        let mut node = match self.root.get(first) {
            Some(node) => node,
            None => return Lookup::Missing,
        };
        for segment in segments {
            node = match node {
                TranslationNode::Branch(children) => match children.get(segment) {
                    Some(child) => child,
                    None => return Lookup::Missing,
                },
                _ => return Lookup::Missing,
            };
        }
        match node {
            TranslationNode::Text(text) => Lookup::Found(text),
            _ => Lookup::Missing,
        }
    }

    /// Every dotted path that resolves to a string, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        fn walk(prefix: &str, map: &BTreeMap<String, TranslationNode>, out: &mut Vec<String>) {
            for (name, node) in map {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                match node {
                    TranslationNode::Text(_) => out.push(path),
                    TranslationNode::Branch(children) => walk(&path, children, out),
                    TranslationNode::Opaque(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn root(&self) -> &BTreeMap<String, TranslationNode> {
        &self.root
    }
}
