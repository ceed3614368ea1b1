// src/dom/mod.rs - document surface the translation engine writes into
pub mod memory;

pub use memory::{MemoryDocument, MemoryElement, MemoryHistory};

use crate::core::constants::{
    ATTR_FALLBACK, ATTR_HTML, ATTR_KEY, ATTR_ORIGINAL, ATTR_SCAN, ATTR_TEMPLATE, ATTR_VARIABLES,
    ATTR_VARIABLE_PREFIX,
};

/// Opaque handle to an element inside one `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "email", "tel", "url", "password"];

pub trait Element {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn attributes(&self) -> Vec<(String, String)>;
    fn set_attribute(&mut self, name: &str, value: &str);
    fn inner_html(&self) -> String;
    fn set_inner_html(&mut self, html: &str);
    fn set_text_content(&mut self, text: &str);

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn set_placeholder(&mut self, text: &str) {
        self.set_attribute("placeholder", text);
    }

    /// `<textarea>` or an `<input>` whose type takes free text.
    fn is_text_input(&self) -> bool {
        match self.tag_name() {
            "textarea" => true,
            "input" => self
                .attribute("type")
                .map(|t| TEXT_INPUT_TYPES.contains(&t.trim().to_ascii_lowercase().as_str()))
                .unwrap_or(true),
            _ => false,
        }
    }
}

pub trait Document {
    /// The root element's `lang` attribute.
    fn set_language(&mut self, code: &str);
    fn language(&self) -> Option<String>;
    fn elements_with_attribute(&self, name: &str) -> Vec<NodeId>;
    fn select_all(&self, selector: &str) -> Vec<NodeId>;
    fn element(&self, id: NodeId) -> Option<&dyn Element>;
    fn element_mut(&mut self, id: NodeId) -> Option<&mut dyn Element>;

    fn select(&self, selector: &str) -> Option<NodeId> {
        self.select_all(selector).into_iter().next()
    }
}

/// Address bar of the hosting page.
pub trait History {
    fn current_url(&self) -> Option<String>;
    /// Replaces the visible URL without reloading the page.
    fn replace_url(&mut self, url: &str);
}

/// Attribute names of the declarative markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub key: String,
    pub fallback: String,
    pub html: String,
    pub template: String,
    pub variable_prefix: String,
    pub variables: String,
    pub scan: String,
    /// Where the untouched markup of scanned elements is kept.
    pub original: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            key: ATTR_KEY.into(),
            fallback: ATTR_FALLBACK.into(),
            html: ATTR_HTML.into(),
            template: ATTR_TEMPLATE.into(),
            variable_prefix: ATTR_VARIABLE_PREFIX.into(),
            variables: ATTR_VARIABLES.into(),
            scan: ATTR_SCAN.into(),
            original: ATTR_ORIGINAL.into(),
        }
    }
}
