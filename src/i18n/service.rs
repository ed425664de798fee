//! Translation service seam.
//!
//! The localizer never stores translation strings itself. It asks a
//! [`TranslationService`] for a bundle (a JSON document of keys to strings or
//! nested objects) whenever the language changes, and looks keys up in it.

use crate::error::TranslationError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// A loaded set of translations for one language.
pub type Bundle = Value;

/// Source of translation bundles.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Record the language used when a key is missing in the active one.
    fn set_default_lang(&self, lang: &str);

    /// Load the bundle for `lang` and make it the active language.
    async fn use_lang(&self, lang: &str) -> Result<Bundle, TranslationError>;

    /// Language preferred by the user's environment, if known.
    fn browser_lang(&self) -> Option<String>;

    /// Resolve `key` inside `bundle`.
    ///
    /// Keys are dotted paths (`ROUTES.about`) walked through nested objects.
    fn get_parsed_result(&self, bundle: &Bundle, key: &str) -> Option<Value> {
        lookup_key(bundle, key).cloned()
    }
}

/// Walk a dotted key through nested JSON objects.
///
/// Parts are joined back together when no object matches them, so keys that
/// themselves contain dots (`"file.html"`) still resolve. Intermediate string
/// values are only accepted for the last part of the key.
pub fn lookup_key<'a>(bundle: &'a Bundle, key: &str) -> Option<&'a Value> {
    let mut target = bundle;
    let mut pending = String::new();
    let mut parts = key.split('.').peekable();

    while let Some(part) = parts.next() {
        pending.push_str(part);
        let is_last = parts.peek().is_none();

        match target.get(pending.as_str()) {
            Some(next) if next.is_object() || is_last => {
                target = next;
                pending.clear();
            }
            _ if is_last => return None,
            _ => pending.push('.'),
        }
    }

    Some(target)
}

/// Language code of the environment (`LC_ALL`, then `LANG`), e.g. `fr` for `fr_FR.UTF-8`.
pub fn system_lang() -> Option<String> {
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| normalize_lang(&value))
}

/// Reduce a locale tag such as `pt-BR` or `de_DE.UTF-8` to its language part.
fn normalize_lang(tag: &str) -> Option<String> {
    let lang = tag
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if lang.is_empty() || lang == "c" || lang == "posix" {
        None
    } else {
        Some(lang)
    }
}

/// In-memory bundles, keyed by language.
#[derive(Debug, Default)]
pub struct StaticTranslationService {
    bundles: HashMap<String, Bundle>,
    browser_lang: Option<String>,
    default_lang: Mutex<Option<String>>,
    current_lang: Mutex<Option<String>>,
}

impl StaticTranslationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, lang: impl Into<String>, bundle: Bundle) -> Self {
        self.bundles.insert(lang.into(), bundle);
        self
    }

    pub fn with_browser_lang(mut self, lang: impl Into<String>) -> Self {
        self.browser_lang = Some(lang.into());
        self
    }

    pub fn default_lang(&self) -> Option<String> {
        self.default_lang.lock().ok().and_then(|lang| lang.clone())
    }

    /// Language of the last successful `use_lang`.
    pub fn current_lang(&self) -> Option<String> {
        self.current_lang.lock().ok().and_then(|lang| lang.clone())
    }
}

#[async_trait]
impl TranslationService for StaticTranslationService {
    fn set_default_lang(&self, lang: &str) {
        if let Ok(mut default) = self.default_lang.lock() {
            *default = Some(lang.to_string());
        }
    }

    async fn use_lang(&self, lang: &str) -> Result<Bundle, TranslationError> {
        let bundle = self
            .bundles
            .get(lang)
            .cloned()
            .ok_or_else(|| TranslationError::MissingLanguage(lang.to_string()))?;

        if let Ok(mut current) = self.current_lang.lock() {
            *current = Some(lang.to_string());
        }
        Ok(bundle)
    }

    fn browser_lang(&self) -> Option<String> {
        self.browser_lang.clone()
    }
}

/// Bundles read from `<dir>/<lang>.json`.
#[derive(Debug)]
pub struct FileTranslationService {
    dir: PathBuf,
    browser_lang: Option<String>,
    default_lang: Mutex<Option<String>>,
}

impl FileTranslationService {
    /// Serve bundles from `dir`; the browser language is taken from the environment.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            browser_lang: system_lang(),
            default_lang: Mutex::new(None),
        }
    }

    pub fn with_browser_lang(mut self, lang: Option<String>) -> Self {
        self.browser_lang = lang;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_lang(&self) -> Option<String> {
        self.default_lang.lock().ok().and_then(|lang| lang.clone())
    }
}

#[async_trait]
impl TranslationService for FileTranslationService {
    fn set_default_lang(&self, lang: &str) {
        if let Ok(mut default) = self.default_lang.lock() {
            *default = Some(lang.to_string());
        }
    }

    async fn use_lang(&self, lang: &str) -> Result<Bundle, TranslationError> {
        let path = self.dir.join(format!("{}.json", lang));
        debug!("Reading translations from {}", path.display());

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TranslationError::Io {
                lang: lang.to_string(),
                source,
            })?;

        let bundle: Bundle =
            serde_json::from_str(&content).map_err(|source| TranslationError::Json {
                lang: lang.to_string(),
                source,
            })?;

        info!("Loaded translations for '{}'", lang);
        Ok(bundle)
    }

    fn browser_lang(&self) -> Option<String> {
        self.browser_lang.clone()
    }
}
