// src/i18n/service.rs - translation engine
use crate::core::config::Config;
use crate::core::error::Result;
use crate::dom::{Document, Element, History, Markers, NodeId};
use crate::i18n::interpolate::{self, Variables};
use crate::i18n::persistence::{PreferenceStore, TomlPreferenceStore};
use crate::i18n::resolver::{with_lang_query, Environment, LanguageResolver};
use crate::i18n::source::{source_from_config, TranslationSource};
use crate::i18n::types::{LanguageCode, LanguageSet, Lookup, TranslationTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No table adopted (never loaded, or every load failed).
    Uninitialized,
    Ready,
}

/// What `load` ended up doing. Never an error: failures degrade to the
/// default language and then to an empty table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LanguageCode),
    FellBack {
        requested: String,
        adopted: LanguageCode,
    },
    /// The default table failed too; lookups return fallbacks.
    Empty(LanguageCode),
}

impl LoadOutcome {
    pub fn language(&self) -> &LanguageCode {
        match self {
            LoadOutcome::Loaded(code) | LoadOutcome::Empty(code) => code,
            LoadOutcome::FellBack { adopted, .. } => adopted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Already active: nothing fetched, scanned or stored.
    Unchanged,
    Switched(LoadOutcome),
}

/// How a resolved string is written into an element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Text,
    Html,
    Placeholder,
    Attribute(String),
}

/// One entry of a batch translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub selector: String,
    pub key: String,
    pub fallback: Option<String>,
    pub mode: WriteMode,
}

impl Binding {
    pub fn new(selector: &str, key: &str) -> Self {
        Self {
            selector: selector.into(),
            key: key.into(),
            fallback: None,
            mode: WriteMode::Text,
        }
    }

    pub fn fallback(mut self, fallback: &str) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Elements touched by one `apply_to_document` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub keyed: usize,
    pub templated: usize,
    pub scanned: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.keyed + self.templated + self.scanned
    }
}

/// Holds the active language and its table, and writes translations into a
/// `Document`.
///
/// `load`, `switch` and `initialize` take `&mut self`, so two loads on the same
/// engine can never overlap. Pending fetches are not cancellable.
pub struct TranslationEngine {
    resolver: LanguageResolver,
    source: Box<dyn TranslationSource>,
    store: Box<dyn PreferenceStore>,
    markers: Markers,
    current: LanguageCode,
    table: TranslationTable,
    state: EngineState,
}

impl TranslationEngine {
    pub fn new(
        languages: LanguageSet,
        source: Box<dyn TranslationSource>,
        store: Box<dyn PreferenceStore>,
        markers: Markers,
    ) -> Self {
        let current = languages.default_code().clone();
        Self {
            resolver: LanguageResolver::new(languages),
            source,
            store,
            markers,
            current,
            table: TranslationTable::default(),
            state: EngineState::Uninitialized,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let source = source_from_config(&config.source)?;
        let store = TomlPreferenceStore::new(&config.preference_file, &config.storage_key);
        log::debug!(
            "Engine using {} source, preferences in {}",
            source.describe(),
            store.path().display()
        );
        Ok(Self::new(
            config.languages.clone(),
            source,
            Box::new(store),
            config.markers.clone(),
        ))
    }

    pub fn current(&self) -> &LanguageCode {
        &self.current
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn languages(&self) -> &LanguageSet {
        self.resolver.languages()
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Resolves the language, loads its table and translates `document`.
    /// A stored preference is read from the engine's store unless `env`
    /// already carries one. An unreadable preference counts as absent.
    pub async fn initialize(
        &mut self,
        mut env: Environment,
        document: &mut dyn Document,
    ) -> Result<LanguageCode> {
        if env.stored.is_none() {
            env.stored = match self.store.load().await {
                Ok(stored) => stored,
                Err(e) => {
                    log::warn!("Ignoring stored language preference: {}", e);
                    None
                }
            };
        }

        let code = self.resolver.resolve(&env);
        let outcome = self.load(code.as_str()).await;
        document.set_language(self.current.as_str());
        let report = self.apply_to_document(document);

        log::info!(
            "Localization ready: {} ({:?}), {} elements translated",
            self.current,
            outcome,
            report.total()
        );
        Ok(self.current.clone())
    }

    /// Fetches and adopts the table for `requested`. An unsupported code or a
    /// failed fetch falls back to the default language exactly once.
    pub async fn load(&mut self, requested: &str) -> LoadOutcome {
        let code = match self.languages().validate(requested) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("{}, falling back to default", e);
                return self.load_default(requested).await;
            }
        };

        match self.source.fetch(&code).await {
            Ok(table) => {
                self.adopt(code.clone(), table);
                LoadOutcome::Loaded(code)
            }
            Err(e) if !self.languages().is_default(&code) => {
                log::warn!("Could not load '{}': {}, falling back to default", code, e);
                self.load_default(requested).await
            }
            Err(e) => {
                log::error!("Could not load default language '{}': {}", code, e);
                self.adopt_empty(code.clone());
                LoadOutcome::Empty(code)
            }
        }
    }

    async fn load_default(&mut self, requested: &str) -> LoadOutcome {
        let default = self.languages().default_code().clone();
        match self.source.fetch(&default).await {
            Ok(table) => {
                self.adopt(default.clone(), table);
                LoadOutcome::FellBack {
                    requested: requested.to_string(),
                    adopted: default,
                }
            }
            Err(e) => {
                log::error!("Could not load default language '{}': {}", default, e);
                self.adopt_empty(default.clone());
                LoadOutcome::Empty(default)
            }
        }
    }

    fn adopt(&mut self, code: LanguageCode, table: TranslationTable) {
        log::debug!("Adopted '{}' ({} keys)", code, table.keys().len());
        self.current = code;
        self.table = table;
        self.state = EngineState::Ready;
    }

    fn adopt_empty(&mut self, code: LanguageCode) {
        self.current = code;
        self.table = TranslationTable::default();
        self.state = EngineState::Uninitialized;
    }

    /// Leaf string at dotted `key`, else `fallback`, else `key` itself.
    pub fn lookup<'a>(&'a self, key: &'a str, fallback: Option<&'a str>) -> &'a str {
        self.table.lookup_path(key).or(fallback.unwrap_or(key))
    }

    /// `lookup` followed by `{{name}}` substitution from `variables`.
    pub fn interpolate(&self, key: &str, variables: &Variables, fallback: Option<&str>) -> String {
        interpolate::interpolate(self.lookup(key, fallback), variables)
    }

    /// Runs the three marker passes over `document`.
    pub fn apply_to_document(&self, document: &mut dyn Document) -> ApplyReport {
        let report = ApplyReport {
            keyed: self.apply_keyed(document),
            templated: self.apply_templates(document),
            scanned: self.apply_inline_scan(document),
        };
        log::debug!(
            "Applied '{}': {} keyed, {} templated, {} scanned",
            self.current,
            report.keyed,
            report.templated,
            report.scanned
        );
        report
    }

    fn apply_keyed(&self, document: &mut dyn Document) -> usize {
        let mut written = 0;
        for id in document.elements_with_attribute(&self.markers.key) {
            let Some((key, fallback, mode)) = self.read_binding(document, id, &self.markers.key)
            else {
                continue;
            };
            let text = self.lookup(&key, fallback.as_deref()).to_string();
            if write_to(document, id, &text, &mode) {
                written += 1;
            }
        }
        written
    }

    fn apply_templates(&self, document: &mut dyn Document) -> usize {
        let mut written = 0;
        for id in document.elements_with_attribute(&self.markers.template) {
            let Some((key, fallback, mode)) =
                self.read_binding(document, id, &self.markers.template)
            else {
                continue;
            };
            let variables = match document.element(id) {
                Some(element) => self.read_variables(element),
                None => continue,
            };
            let text = self.interpolate(&key, &variables, fallback.as_deref());
            if write_to(document, id, &text, &mode) {
                written += 1;
            }
        }
        written
    }

    fn apply_inline_scan(&self, document: &mut dyn Document) -> usize {
        let mut written = 0;
        for id in document.elements_with_attribute(&self.markers.scan) {
            let Some(element) = document.element_mut(id) else {
                continue;
            };
            let original = match element.attribute(&self.markers.original) {
                Some(original) => original.to_string(),
                None => {
                    let original = element.inner_html();
                    element.set_attribute(&self.markers.original, &original);
                    original
                }
            };
            let expanded = interpolate::replace_placeholders(&original, |key| {
                match self.table.lookup_path(key) {
                    Lookup::Found(text) => Some(text.to_string()),
                    Lookup::Missing => None,
                }
            });
            element.set_inner_html(&expanded);
            written += 1;
        }
        written
    }

    /// Key, fallback and write mode of a marked element. Empty keys are skipped.
    fn read_binding(
        &self,
        document: &dyn Document,
        id: NodeId,
        key_attribute: &str,
    ) -> Option<(String, Option<String>, WriteMode)> {
        let element = document.element(id)?;
        let key = element.attribute(key_attribute)?.trim();
        if key.is_empty() {
            log::debug!("Skipping <{}> with empty {}", element.tag_name(), key_attribute);
            return None;
        }
        let fallback = element.attribute(&self.markers.fallback).map(str::to_string);
        let mode = if element.is_text_input() {
            WriteMode::Placeholder
        } else if element.has_attribute(&self.markers.html) {
            WriteMode::Html
        } else {
            WriteMode::Text
        };
        Some((key.to_string(), fallback, mode))
    }

    /// JSON object in the variables attribute, overridden by per-name
    /// prefixed attributes.
    fn read_variables(&self, element: &dyn Element) -> Variables {
        let mut variables = match element.attribute(&self.markers.variables) {
            Some(raw) => interpolate::variables_from_json(raw).unwrap_or_else(|| {
                log::debug!("Ignoring non-object {}: {}", self.markers.variables, raw);
                Variables::new()
            }),
            None => Variables::new(),
        };

        let prefix = self.markers.variable_prefix.to_ascii_lowercase();
        for (name, value) in element.attributes() {
            if let Some(var) = name.to_ascii_lowercase().strip_prefix(&prefix) {
                if !var.is_empty() {
                    variables.insert(var.to_string(), value);
                }
            }
        }
        variables
    }

    /// Writes `key` into the first element matching `selector`. Returns
    /// whether an element was found.
    pub fn translate_element(
        &self,
        document: &mut dyn Document,
        selector: &str,
        key: &str,
        fallback: Option<&str>,
        mode: &WriteMode,
    ) -> bool {
        let Some(id) = document.select(selector) else {
            log::debug!("No element matches '{}'", selector);
            return false;
        };
        let text = self.lookup(key, fallback).to_string();
        write_to(document, id, &text, mode)
    }

    /// Applies every binding; returns how many found an element.
    pub fn translate_batch(&self, document: &mut dyn Document, bindings: &[Binding]) -> usize {
        bindings
            .iter()
            .filter(|b| {
                self.translate_element(
                    document,
                    &b.selector,
                    &b.key,
                    b.fallback.as_deref(),
                    &b.mode,
                )
            })
            .count()
    }

    /// Changes the active language: load, retranslate, update the URL and
    /// persist. Switching to the active language does nothing at all.
    ///
    /// Callers must await one switch before issuing the next.
    pub async fn switch(
        &mut self,
        requested: &str,
        document: &mut dyn Document,
        history: &mut dyn History,
    ) -> Result<SwitchOutcome> {
        if self.languages().parse(requested).as_ref() == Some(&self.current) {
            log::debug!("'{}' already active", self.current);
            return Ok(SwitchOutcome::Unchanged);
        }

        let outcome = self.load(requested).await;
        document.set_language(self.current.as_str());
        self.apply_to_document(document);

        if let Some(url) = history.current_url() {
            match with_lang_query(&url, &self.current) {
                Some(updated) => history.replace_url(&updated),
                None => log::debug!("Leaving unparseable URL '{}' untouched", url),
            }
        }

        self.store.save(self.current.as_str()).await?;
        log::info!("Language switched to {}", self.current.as_str().to_uppercase());
        Ok(SwitchOutcome::Switched(outcome))
    }
}

fn write_to(document: &mut dyn Document, id: NodeId, text: &str, mode: &WriteMode) -> bool {
    let Some(element) = document.element_mut(id) else {
        return false;
    };
    match mode {
        WriteMode::Text => element.set_text_content(text),
        WriteMode::Html => element.set_inner_html(text),
        WriteMode::Placeholder => element.set_placeholder(text),
        WriteMode::Attribute(name) => element.set_attribute(name, text),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement, MemoryHistory};
    use crate::i18n::persistence::MemoryPreferenceStore;
    use crate::i18n::source::MemorySource;
    use std::sync::atomic::Ordering;

    const EN: &str = r#"{
        "nav": { "home": "Home" },
        "msg": "Hi {{n}}, {{n}}!",
        "rich": "<b>Bold</b>",
        "count": 7
    }"#;
    const DE: &str = r#"{ "nav": { "home": "Startseite" }, "msg": "Hallo {{n}}" }"#;

    fn engine_with(source: MemorySource, store: MemoryPreferenceStore) -> TranslationEngine {
        TranslationEngine::new(
            LanguageSet::builtin(),
            Box::new(source),
            Box::new(store),
            Markers::default(),
        )
    }

    fn engine() -> TranslationEngine {
        engine_with(
            MemorySource::new()
                .with_document("en", EN)
                .with_document("de", DE),
            MemoryPreferenceStore::new(),
        )
    }

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn starts_uninitialized_with_empty_table() {
        let engine = engine();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.table().is_empty());
        assert_eq!(engine.lookup("nav.home", None), "nav.home");
    }

    #[tokio::test]
    async fn lookup_uses_fallback_then_raw_key() {
        let mut engine = engine();
        assert_eq!(
            engine.load("en").await,
            LoadOutcome::Loaded(LanguageCode::normalize("en").unwrap())
        );
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.lookup("nav.home", Some("x")), "Home");
        assert_eq!(engine.lookup("nav.away", Some("Away")), "Away");
        assert_eq!(engine.lookup("nav.away", None), "nav.away");
        assert_eq!(engine.lookup("count", None), "count");
        assert_eq!(engine.lookup("nav", Some("fb")), "fb");
    }

    #[tokio::test]
    async fn interpolate_replaces_every_occurrence() {
        let mut engine = engine();
        engine.load("en").await;
        assert_eq!(
            engine.interpolate("msg", &vars(&[("n", "Sam")]), None),
            "Hi Sam, Sam!"
        );
        assert_eq!(
            engine.interpolate("missing", &vars(&[("n", "Sam")]), Some("Bye {{n}} {{m}}")),
            "Bye Sam {{m}}"
        );
    }

    #[tokio::test]
    async fn unsupported_code_falls_back_to_default() {
        let mut engine = engine();
        let outcome = engine.load("xx").await;
        assert_eq!(
            outcome,
            LoadOutcome::FellBack {
                requested: "xx".into(),
                adopted: LanguageCode::normalize("en").unwrap(),
            }
        );
        assert_eq!(engine.current().as_str(), "en");
        assert_eq!(engine.lookup("nav.home", None), "Home");
    }

    #[tokio::test]
    async fn missing_table_falls_back_once() {
        let source = MemorySource::new().with_document("en", EN);
        let fetches = source.fetch_counter();
        let mut engine = engine_with(source, MemoryPreferenceStore::new());

        let outcome = engine.load("fr").await;
        assert!(matches!(outcome, LoadOutcome::FellBack { .. }));
        assert_eq!(outcome.language().as_str(), "en");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_default_gives_up_with_empty_table() {
        let source = MemorySource::new().with_document("de", DE);
        let fetches = source.fetch_counter();
        let mut engine = engine_with(source, MemoryPreferenceStore::new());
        engine.load("de").await;
        assert_eq!(engine.state(), EngineState::Ready);

        let outcome = engine.load("fr").await;
        assert_eq!(outcome, LoadOutcome::Empty(LanguageCode::normalize("en").unwrap()));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.table().is_empty());
        assert_eq!(engine.lookup("nav.home", Some("Home?")), "Home?");
        // de, fr, en: no retry loop
        assert_eq!(fetches.load(Ordering::SeqCst), 3);

        assert!(matches!(engine.load("en").await, LoadOutcome::Empty(_)));
        assert_eq!(fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn applies_all_three_marker_kinds() {
        let mut engine = engine();
        engine.load("en").await;

        let mut doc = MemoryDocument::new();
        let plain = doc.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));
        let rich = doc.push(
            MemoryElement::new("p")
                .attr("data-i18n", "rich")
                .attr("data-i18n-html", ""),
        );
        let escaped = doc.push(MemoryElement::new("p").attr("data-i18n", "rich"));
        let input = doc.push(
            MemoryElement::new("input")
                .attr("type", "text")
                .attr("data-i18n", "nav.gone")
                .attr("data-i18n-fallback", "Type here"),
        );
        let template = doc.push(
            MemoryElement::new("span")
                .attr("data-i18n-template", "msg")
                .attr("data-i18n-var-n", "Ada"),
        );
        let scanned = doc.push(
            MemoryElement::new("footer")
                .attr("data-i18n-scan", "")
                .html("<i>{{nav.home}}</i> {{nav.none}}"),
        );

        let report = engine.apply_to_document(&mut doc);
        assert_eq!(
            report,
            ApplyReport {
                keyed: 4,
                templated: 1,
                scanned: 1
            }
        );
        assert_eq!(doc.html_of(plain), "Home");
        assert_eq!(doc.html_of(rich), "<b>Bold</b>");
        assert_eq!(doc.html_of(escaped), "&lt;b&gt;Bold&lt;/b&gt;");
        assert_eq!(
            doc.attribute_of(input, "placeholder").as_deref(),
            Some("Type here")
        );
        assert_eq!(doc.html_of(input), "");
        assert_eq!(doc.html_of(template), "Hi Ada, Ada!");
        assert_eq!(doc.html_of(scanned), "<i>Home</i> {{nav.none}}");
    }

    #[tokio::test]
    async fn inline_scan_is_stable_across_runs_and_languages() {
        let mut engine = engine();
        engine.load("en").await;

        let mut doc = MemoryDocument::new();
        let id = doc.push(
            MemoryElement::new("div")
                .attr("data-i18n-scan", "")
                .html("[{{nav.home}}]"),
        );

        engine.apply_to_document(&mut doc);
        let once = doc.html_of(id);
        engine.apply_to_document(&mut doc);
        assert_eq!(doc.html_of(id), once);
        assert_eq!(once, "[Home]");
        assert_eq!(
            doc.attribute_of(id, "data-i18n-original").as_deref(),
            Some("[{{nav.home}}]")
        );

        engine.load("de").await;
        engine.apply_to_document(&mut doc);
        assert_eq!(doc.html_of(id), "[Startseite]");
    }

    #[tokio::test]
    async fn json_variables_merge_with_prefixed_attributes() {
        let mut engine = engine();
        engine.load("en").await;

        let mut doc = MemoryDocument::new();
        let id = doc.push(
            MemoryElement::new("p")
                .attr("data-i18n-template", "msg")
                .attr("data-i18n-vars", r#"{"n":"Json"}"#)
                .attr("data-i18n-var-n", "Attr"),
        );
        let bad = doc.push(
            MemoryElement::new("p")
                .attr("data-i18n-template", "msg")
                .attr("data-i18n-vars", "[1,2]"),
        );
        engine.apply_to_document(&mut doc);
        assert_eq!(doc.html_of(id), "Hi Attr, Attr!");
        assert_eq!(doc.html_of(bad), "Hi {{n}}, {{n}}!");
    }

    #[tokio::test]
    async fn translates_by_selector_and_batch() {
        let mut engine = engine();
        engine.load("de").await;

        let mut doc = MemoryDocument::new();
        let title = doc.push(MemoryElement::new("h1").attr("id", "title"));
        let link = doc.push(MemoryElement::new("a").attr("class", "home"));

        assert!(engine.translate_element(&mut doc, "#title", "nav.home", None, &WriteMode::Text));
        assert_eq!(doc.html_of(title), "Startseite");
        assert!(!engine.translate_element(&mut doc, "#nope", "nav.home", None, &WriteMode::Text));

        let written = engine.translate_batch(
            &mut doc,
            &[
                Binding::new(".home", "nav.home").mode(WriteMode::Attribute("title".into())),
                Binding::new("#title", "missing").fallback("Fallback"),
                Binding::new("#ghost", "nav.home"),
            ],
        );
        assert_eq!(written, 2);
        assert_eq!(doc.attribute_of(link, "title").as_deref(), Some("Startseite"));
        assert_eq!(doc.html_of(title), "Fallback");
    }

    #[tokio::test]
    async fn switch_to_current_is_a_no_op() {
        let source = MemorySource::new().with_document("en", EN);
        let fetches = source.fetch_counter();
        let store = MemoryPreferenceStore::new();
        let mut engine = engine_with(source, store.clone());
        engine.load("en").await;

        let mut doc = MemoryDocument::new();
        let id = doc.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));
        let mut history = MemoryHistory::new(Some("https://site.test/"));

        let outcome = engine.switch("EN", &mut doc, &mut history).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Unchanged);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(store.write_count(), 0);
        assert_eq!(doc.html_of(id), "");
        assert!(history.replacements().is_empty());
    }

    #[tokio::test]
    async fn switch_reloads_rescans_persists_and_rewrites_url() {
        let store = MemoryPreferenceStore::new();
        let mut engine = engine_with(
            MemorySource::new()
                .with_document("en", EN)
                .with_document("de", DE),
            store.clone(),
        );
        engine.load("en").await;

        let mut doc = MemoryDocument::new();
        let id = doc.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));
        let mut history = MemoryHistory::new(Some("https://site.test/p?x=1#top"));

        let outcome = engine.switch("de", &mut doc, &mut history).await.unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Switched(LoadOutcome::Loaded(LanguageCode::normalize("de").unwrap()))
        );
        assert_eq!(engine.current().as_str(), "de");
        assert_eq!(doc.language().as_deref(), Some("de"));
        assert_eq!(doc.html_of(id), "Startseite");
        assert_eq!(store.get().as_deref(), Some("de"));
        assert_eq!(
            history.current_url().as_deref(),
            Some("https://site.test/p?x=1&lang=de#top")
        );
    }

    #[tokio::test]
    async fn switch_to_broken_language_persists_the_adopted_default() {
        let store = MemoryPreferenceStore::new();
        let mut engine = engine_with(
            MemorySource::new()
                .with_document("en", EN)
                .with_document("de", DE),
            store.clone(),
        );
        engine.load("de").await;

        let mut doc = MemoryDocument::new();
        let mut history = MemoryHistory::new(None);
        let outcome = engine.switch("fr", &mut doc, &mut history).await.unwrap();

        assert!(matches!(
            outcome,
            SwitchOutcome::Switched(LoadOutcome::FellBack { .. })
        ));
        assert_eq!(engine.current().as_str(), "en");
        assert_eq!(store.get().as_deref(), Some("en"));
        assert!(history.replacements().is_empty());
    }

    #[tokio::test]
    async fn initialize_resolves_loads_and_applies() {
        let store = MemoryPreferenceStore::with_value("de");
        let mut engine = engine_with(
            MemorySource::new()
                .with_document("en", EN)
                .with_document("de", DE),
            store,
        );

        let mut doc = MemoryDocument::new();
        let id = doc.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));

        let code = engine
            .initialize(Environment::new().with_locale("fr-FR"), &mut doc)
            .await
            .unwrap();
        assert_eq!(code.as_str(), "de");
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(doc.language().as_deref(), Some("de"));
        assert_eq!(doc.html_of(id), "Startseite");
    }

    #[tokio::test]
    async fn initialize_survives_a_corrupt_preference_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "[preferences\n").unwrap();

        let mut engine = TranslationEngine::new(
            LanguageSet::builtin(),
            Box::new(
                MemorySource::new()
                    .with_document("en", EN)
                    .with_document("de", DE),
            ),
            Box::new(TomlPreferenceStore::new(&path, "lang")),
            Markers::default(),
        );

        let mut doc = MemoryDocument::new();
        let id = doc.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));

        let code = engine
            .initialize(Environment::new().with_url("https://site.test/?lang=de"), &mut doc)
            .await
            .unwrap();
        assert_eq!(code.as_str(), "de");
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(doc.language().as_deref(), Some("de"));
        assert_eq!(doc.html_of(id), "Startseite");

        let mut plain = MemoryDocument::new();
        let home = plain.push(MemoryElement::new("a").attr("data-i18n", "nav.home"));
        engine.initialize(Environment::new(), &mut plain).await.unwrap();
        assert_eq!(engine.current().as_str(), "en");
        assert_eq!(plain.html_of(home), "Home");
    }
}
