// src/i18n/langs/mod.rs

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "src/i18n/langs/"]
pub struct Langs;

/// Raw JSON of the embedded table for `lang`, if one ships with the crate.
pub fn get_language_file(lang: &str) -> Option<String> {
    let filename = format!("{}.json", lang.to_lowercase());
    let file = Langs::get(&filename)?;
    match std::str::from_utf8(file.data.as_ref()) {
        Ok(content) => Some(content.to_string()),
        Err(e) => {
            log::error!("Embedded {} is not valid UTF-8: {}", filename, e);
            None
        }
    }
}

pub fn embedded_languages() -> Vec<String> {
    let mut langs: Vec<String> = Langs::iter()
        .filter_map(|f| f.as_ref().strip_suffix(".json").map(str::to_string))
        .collect();
    langs.sort();
    langs
}
