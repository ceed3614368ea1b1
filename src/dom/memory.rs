// src/dom/memory.rs - flat in-memory document
use super::{Document, Element, History, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryElement {
    tag: String,
    attributes: Vec<(String, String)>,
    inner: String,
}

impl MemoryElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.trim().to_ascii_lowercase(),
            attributes: Vec::new(),
            inner: String::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        Element::set_attribute(&mut self, name, value);
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.inner = html.to_string();
        self
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }
}

impl Element for MemoryElement {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.attributes.clone()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn inner_html(&self) -> String {
        self.inner.clone()
    }

    fn set_inner_html(&mut self, html: &str) {
        self.inner = html.to_string();
    }

    fn set_text_content(&mut self, text: &str) {
        self.inner = escape_text(text);
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Simple selector: optional tag name followed by at most one of
/// `#id`, `.class`, `[attr]` or `[attr=value]`.
#[derive(Debug, PartialEq, Eq)]
struct Selector<'a> {
    tag: Option<&'a str>,
    qualifier: Option<Qualifier<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
enum Qualifier<'a> {
    Id(&'a str),
    Class(&'a str),
    Attribute(&'a str, Option<&'a str>),
}

impl<'a> Selector<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        let split = raw
            .find(|c: char| matches!(c, '#' | '.' | '['))
            .unwrap_or(raw.len());
        let (tag, rest) = raw.split_at(split);
        let tag = (!tag.is_empty()).then_some(tag);

        if let Some(t) = tag {
            if !t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
        }

        let qualifier = if rest.is_empty() {
            None
        } else if let Some(id) = rest.strip_prefix('#') {
            Some(Qualifier::Id(id))
        } else if let Some(class) = rest.strip_prefix('.') {
            Some(Qualifier::Class(class))
        } else {
            let body = rest.strip_prefix('[')?.strip_suffix(']')?;
            match body.split_once('=') {
                Some((name, value)) => Some(Qualifier::Attribute(
                    name.trim(),
                    Some(value.trim().trim_matches(|c| c == '"' || c == '\'')),
                )),
                None => Some(Qualifier::Attribute(body.trim(), None)),
            }
        };

        if tag.is_none() && qualifier.is_none() {
            return None;
        }
        Some(Self { tag, qualifier })
    }

    fn matches(&self, element: &MemoryElement) -> bool {
        if let Some(tag) = self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        match &self.qualifier {
            None => true,
            Some(Qualifier::Id(id)) => element.attribute("id") == Some(*id),
            Some(Qualifier::Class(class)) => element.classes().any(|c| c == *class),
            Some(Qualifier::Attribute(name, None)) => element.has_attribute(name),
            Some(Qualifier::Attribute(name, Some(value))) => {
                element.attribute(name) == Some(*value)
            }
        }
    }
}

/// A document as a flat list of elements; `NodeId(0)` is the `<html>` root.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    elements: Vec<MemoryElement>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            elements: vec![MemoryElement::new("html")],
        }
    }

    pub fn push(&mut self, element: MemoryElement) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&MemoryElement> {
        self.elements.get(id.0)
    }

    pub fn html_of(&self, id: NodeId) -> String {
        self.get(id).map(|e| e.inner_html()).unwrap_or_default()
    }

    pub fn attribute_of(&self, id: NodeId, name: &str) -> Option<String> {
        self.get(id)
            .and_then(|e| e.attribute(name))
            .map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }
}

impl Document for MemoryDocument {
    fn set_language(&mut self, code: &str) {
        self.elements[0].set_attribute("lang", code);
    }

    fn language(&self) -> Option<String> {
        self.elements[0].attribute("lang").map(str::to_string)
    }

    fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.has_attribute(name))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn select_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            log::debug!("Unsupported selector '{}'", selector);
            return Vec::new();
        };
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| selector.matches(e))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn element(&self, id: NodeId) -> Option<&dyn Element> {
        self.elements.get(id.0).map(|e| e as &dyn Element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut dyn Element> {
        self.elements.get_mut(id.0).map(|e| e as &mut dyn Element)
    }
}

/// Address bar stand-in that records every replacement.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    url: Option<String>,
    replaced: Vec<String>,
}

impl MemoryHistory {
    pub fn new(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            replaced: Vec::new(),
        }
    }

    pub fn replacements(&self) -> &[String] {
        &self.replaced
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn replace_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.replaced.push(url.to_string());
    }
}
