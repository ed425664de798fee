//! Localize a route table from the command line.
//!
//! Usage:
//!   localize-routes <ROUTES_JSON> <TRANSLATIONS_DIR> [LANG...]
//!
//! Reads the route table, loads `<TRANSLATIONS_DIR>/<lang>.json` bundles and
//! prints the localized table for every requested language (all configured
//! locales when none are given) as one JSON object keyed by language.
//!
//! Optional environment variables:
//! - LOCALIZE_LOCALES (defaults to "en")
//! - LOCALIZE_KEY_PREFIX (defaults to "ROUTES.")
//! - LOCALIZE_ALWAYS_SET_PREFIX (defaults to true)
//! - LOCALIZE_USE_CACHED_LANG, LOCALIZE_CACHE_NAME, LOCALIZE_CACHE_MECHANISM

use anyhow::{bail, Context, Result};
use localize_router::prelude::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

fn print_usage() {
    println!(
        r#"
Localize a route table into every configured language

USAGE:
    localize-routes <ROUTES_JSON> <TRANSLATIONS_DIR> [LANG...]

ARGS:
    ROUTES_JSON       Route table as a JSON array
    TRANSLATIONS_DIR  Directory with one <lang>.json bundle per language
    LANG              Languages to print (defaults to LOCALIZE_LOCALES)
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localize_router=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }
    if args.len() < 3 {
        print_usage();
        bail!("Missing arguments");
    }

    let routes_path = &args[1];
    let translations_dir = &args[2];

    let content = std::fs::read_to_string(routes_path)
        .with_context(|| format!("Failed to read routes from {}", routes_path))?;
    let routes: RouteTable = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse routes in {}", routes_path))?;

    let options = ParserOptions::from_env()?;
    let settings = LocalizeRouterSettings::from_env()?;
    info!("Settings: {:?}", settings);

    let languages: Vec<String> = if args.len() > 3 {
        args[3..].to_vec()
    } else {
        options.locales.iter().map(str::to_string).collect()
    };

    let parser = ManualParser::new(
        options,
        settings,
        StaticLocation::shared("/"),
        &CacheStores::default(),
    );
    let service = Arc::new(FileTranslationService::new(translations_dir).with_browser_lang(None));

    let mut initializer = ParserInitializer::new(parser);
    initializer
        .for_root(routes)
        .context("Failed to register routes")?;
    initializer
        .initialize(service, None)
        .await
        .context("Failed to load routes")?;

    let mut parser = initializer.into_parser();
    let mut output = Map::new();

    for lang in &languages {
        parser
            .translate_routes(lang)
            .await
            .with_context(|| format!("Failed to translate routes to '{}'", lang))?;
        output.insert(lang.clone(), serde_json::to_value(parser.routes())?);
    }

    let report = parser.core().metrics().report();
    info!(
        "Localized {} language(s): {} segments translated, {} kept",
        languages.len(),
        report.hits,
        report.fallbacks
    );

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}
