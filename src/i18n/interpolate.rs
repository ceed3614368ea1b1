// src/i18n/interpolate.rs
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// `{{name}}` / `{{dotted.key}}`, with optional inner padding.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}\}").expect("placeholder pattern")
});

/// Named values substituted into `{{name}}` placeholders.
pub type Variables = BTreeMap<String, String>;

/// Replaces each placeholder `resolve` knows about; unknown ones stay verbatim.
pub fn replace_placeholders<'t, F>(template: &'t str, mut resolve: F) -> Cow<'t, str>
where
    F: FnMut(&str) -> Option<String>,
{
    PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
}

pub fn interpolate(template: &str, variables: &Variables) -> String {
    if variables.is_empty() {
        return template.to_string();
    }
    replace_placeholders(template, |name| variables.get(name).cloned()).into_owned()
}

/// Builds variables from a JSON object; anything else yields `None`.
/// Non-string scalars are rendered with their JSON text.
pub fn variables_from_json(raw: &str) -> Option<Variables> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_repeated_placeholders() {
        assert_eq!(
            interpolate("Hi {{n}}, {{n}}!", &vars(&[("n", "Sam")])),
            "Hi Sam, Sam!"
        );
    }

    #[test]
    fn leaves_unmatched_names_verbatim() {
        assert_eq!(
            interpolate("{{greeting}} {{name}}", &vars(&[("name", "Ada")])),
            "{{greeting}} Ada"
        );
        assert_eq!(interpolate("{{ x }}", &Variables::new()), "{{ x }}");
    }

    #[test]
    fn idempotent_without_matches() {
        let once = interpolate("plain {{other}} text", &vars(&[("n", "1")]));
        let twice = interpolate(&once, &vars(&[("n", "1")]));
        assert_eq!(once, "plain {{other}} text");
        assert_eq!(once, twice);
    }

    #[test]
    fn tolerates_padding_and_malformed_markers() {
        assert_eq!(interpolate("{{ n }}", &vars(&[("n", "x")])), "x");
        assert_eq!(interpolate("{{n} {n}}", &vars(&[("n", "x")])), "{{n} {n}}");
    }

    #[test]
    fn json_variables_require_an_object() {
        let parsed = variables_from_json(r#"{"name":"Ada","count":3}"#).unwrap();
        assert_eq!(parsed.get("name").unwrap(), "Ada");
        assert_eq!(parsed.get("count").unwrap(), "3");
        assert!(variables_from_json("[1,2]").is_none());
        assert!(variables_from_json("not json").is_none());
    }
}
