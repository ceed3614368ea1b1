// src/main.rs
use clap::Parser;
use site_localizer::core::constants::{APP_TITLE, DEFAULT_CONFIG_FILE, VERSION};
use site_localizer::i18n::{Environment, SwitchOutcome};
use site_localizer::{MemoryDocument, MemoryHistory, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-localizer")]
#[command(version)]
#[command(about = "Resolve the page language and print translations")]
#[command(
    long_about = "Resolves the language for a page URL (plus stored preference and system locale), \
loads its translation table and prints the requested keys. No page markup is read or \
rewritten: the binary only resolves, switches and looks up keys."
)]
struct CliArgs {
    /// Config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page URL consulted for fragment, query and path markers
    #[arg(short, long)]
    url: Option<String>,

    /// Switch to this language after initialization
    #[arg(short, long)]
    lang: Option<String>,

    /// Print every key of the active table
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Dotted keys to look up
    keys: Vec<String>,
}

fn init_logger(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .is_err()
    {
        eprintln!("Logger already initialized");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (config, mut engine) = site_localizer::engine_from_config_file(&config_path).await?;

    init_logger(&config.log_level);
    log::debug!("{} v{}", APP_TITLE, VERSION);
    match config.config_path() {
        Some(path) => log::info!("Config loaded from {}", path.display()),
        None => log::info!("Using default config"),
    }

    let mut env = Environment::system();
    if let Some(url) = &args.url {
        env = env.with_url(url);
    }

    // No markup: the DOM passes have nothing to touch here.
    let mut document = MemoryDocument::new();
    let mut history = MemoryHistory::new(args.url.as_deref());
    engine.initialize(env, &mut document).await?;

    if let Some(lang) = &args.lang {
        match engine.switch(lang, &mut document, &mut history).await? {
            SwitchOutcome::Unchanged => log::info!("'{}' is already active", lang),
            SwitchOutcome::Switched(outcome) => log::debug!("Switch: {:?}", outcome),
        }
        if let Some(url) = history.replacements().last() {
            println!("url: {}", url);
        }
    }

    println!("lang: {}", engine.current());

    if args.list {
        for key in engine.table().keys() {
            println!("{} = {}", key, engine.lookup(&key, None));
        }
    }

    for key in &args.keys {
        println!("{} = {}", key, engine.lookup(key, None));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_keys() {
        let parsed = CliArgs::try_parse_from([
            "site-localizer",
            "--url",
            "https://site.test/?lang=de",
            "-l",
            "fr",
            "--list",
            "nav.home",
            "site.title",
        ])
        .unwrap();
        assert_eq!(parsed.url.as_deref(), Some("https://site.test/?lang=de"));
        assert_eq!(parsed.lang.as_deref(), Some("fr"));
        assert!(parsed.list);
        assert_eq!(parsed.keys, vec!["nav.home", "site.title"]);
        assert!(parsed.config.is_none());
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(CliArgs::try_parse_from(["site-localizer", "--verbose"]).is_err());
        assert!(CliArgs::try_parse_from(["site-localizer", "--config"]).is_err());
    }

    #[test]
    fn help_says_no_markup_is_rewritten() {
        let help = CliArgs::command().render_long_help().to_string();
        assert!(help.contains("No page markup is read or rewritten"));
    }
}
