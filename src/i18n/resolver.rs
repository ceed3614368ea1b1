// src/i18n/resolver.rs
use crate::core::constants::LANG_PARAM;
use crate::i18n::types::{LanguageCode, LanguageSet};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static FRAGMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"lang=([A-Za-z_\-]+)").expect("fragment pattern"));

/// Snapshot of everything language resolution may consult.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub url: Option<Url>,
    pub stored: Option<String>,
    pub locale: Option<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with the operating system's locale standing in for the
    /// browser's.
    pub fn system() -> Self {
        Self {
            locale: sys_locale::get_locale(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, raw: &str) -> Self {
        self.url = match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                log::debug!("Ignoring unparseable URL '{}': {}", raw, e);
                None
            }
        };
        self
    }

    pub fn with_stored(mut self, stored: Option<String>) -> Self {
        self.stored = stored;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Which input decided the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Fragment,
    Query,
    Stored,
    Path,
    Locale,
    Default,
}

#[derive(Debug, Clone)]
pub struct LanguageResolver {
    languages: LanguageSet,
}

impl LanguageResolver {
    pub fn new(languages: LanguageSet) -> Self {
        Self { languages }
    }

    pub fn resolve(&self, env: &Environment) -> LanguageCode {
        self.resolve_detailed(env).0
    }

    /// First supported candidate wins: fragment, query, stored preference,
    /// first path segment, locale. Otherwise the default.
    pub fn resolve_detailed(&self, env: &Environment) -> (LanguageCode, ResolvedFrom) {
        let url = env.url.as_ref();

        let candidates: [(ResolvedFrom, Option<String>); 5] = [
            (ResolvedFrom::Fragment, url.and_then(fragment_marker)),
            (ResolvedFrom::Query, url.and_then(query_param)),
            (ResolvedFrom::Stored, env.stored.clone()),
            (ResolvedFrom::Path, url.and_then(first_path_segment)),
            (ResolvedFrom::Locale, env.locale.clone()),
        ];

        for (from, candidate) in candidates {
            let Some(raw) = candidate else { continue };
            if let Some(code) = self.accept(from, &raw) {
                log::debug!("Language '{}' resolved from {:?}", code, from);
                return (code, from);
            }
            log::debug!("Ignoring unsupported language '{}' from {:?}", raw, from);
        }

        let default = self.languages.default_code().clone();
        log::debug!("Language defaulted to '{}'", default);
        (default, ResolvedFrom::Default)
    }

    fn accept(&self, from: ResolvedFrom, raw: &str) -> Option<LanguageCode> {
        match from {
            // Only the locale is truncated to its primary subtag.
            ResolvedFrom::Locale => self.languages.parse(raw),
            _ => {
                let code = LanguageCode::normalize(raw)?;
                (code.as_str().eq_ignore_ascii_case(raw.trim()) && self.languages.contains(&code))
                    .then_some(code)
            }
        }
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }
}

fn fragment_marker(url: &Url) -> Option<String> {
    let fragment = url.fragment()?;
    FRAGMENT_MARKER
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn query_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == LANG_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Rewrites (or appends) the `lang` query parameter. Every other query
/// segment and the fragment are kept byte for byte. `None` if `raw` is not a
/// valid URL.
pub fn with_lang_query(raw: &str, code: &LanguageCode) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    let lang_pair = format!("{}={}", LANG_PARAM, code);

    let mut replaced = false;
    let mut segments: Vec<String> = Vec::new();
    for segment in url.query().unwrap_or_default().split('&') {
        if segment.is_empty() {
            continue;
        }
        let name = segment.split_once('=').map_or(segment, |(name, _)| name);
        if name != LANG_PARAM {
            segments.push(segment.to_string());
        } else if !replaced {
            segments.push(lang_pair.clone());
            replaced = true;
        }
    }
    if !replaced {
        segments.push(lang_pair);
    }

    url.set_query(Some(&segments.join("&")));
    Some(url.into())
}
