use crate::error::ConfigError;
use crate::i18n::LocaleSet;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::Arc;

/// Cache key used when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "LOCALIZE_DEFAULT_LANGUAGE";

/// Translation key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "ROUTES.";

/// Picks the default language from (locales, cached, browser).
pub type DefaultLangFn = Arc<dyn Fn(&LocaleSet, Option<&str>, Option<&str>) -> String + Send + Sync>;

/// Where the selected language is remembered between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMechanism {
    #[default]
    LocalStorage,
    Cookie,
}

impl FromStr for CacheMechanism {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "localstorage" | "local_storage" | "storage" => Ok(CacheMechanism::LocalStorage),
            "cookie" | "cookies" => Ok(CacheMechanism::Cookie),
            other => Err(ConfigError::UnknownCacheMechanism(other.to_string())),
        }
    }
}

/// Localizer behaviour switches.
#[derive(Clone)]
pub struct LocalizeRouterSettings {
    /// Read and write the selected language through the language cache
    pub use_cached_lang: bool,

    /// Prefix every URL with the locale, even for the default language
    pub always_set_prefix: bool,

    /// Key (storage) or name (cookie) the language is cached under
    pub cache_name: String,

    pub cache_mechanism: CacheMechanism,

    /// Overrides cached/browser/first-locale default selection
    pub default_lang_fn: Option<DefaultLangFn>,
}

impl Default for LocalizeRouterSettings {
    fn default() -> Self {
        Self {
            use_cached_lang: true,
            always_set_prefix: true,
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            cache_mechanism: CacheMechanism::LocalStorage,
            default_lang_fn: None,
        }
    }
}

impl std::fmt::Debug for LocalizeRouterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizeRouterSettings")
            .field("use_cached_lang", &self.use_cached_lang)
            .field("always_set_prefix", &self.always_set_prefix)
            .field("cache_name", &self.cache_name)
            .field("cache_mechanism", &self.cache_mechanism)
            .field("default_lang_fn", &self.default_lang_fn.is_some())
            .finish()
    }
}

impl LocalizeRouterSettings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            use_cached_lang: std::env::var("LOCALIZE_USE_CACHED_LANG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.use_cached_lang),
            always_set_prefix: std::env::var("LOCALIZE_ALWAYS_SET_PREFIX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.always_set_prefix),
            cache_name: std::env::var("LOCALIZE_CACHE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_name),
            cache_mechanism: std::env::var("LOCALIZE_CACHE_MECHANISM")
                .ok()
                .map(|v| v.parse::<CacheMechanism>())
                .transpose()
                .context("LOCALIZE_CACHE_MECHANISM is invalid")?
                .unwrap_or(defaults.cache_mechanism),
            default_lang_fn: None,
        })
    }

    pub fn with_use_cached_lang(mut self, use_cached_lang: bool) -> Self {
        self.use_cached_lang = use_cached_lang;
        self
    }

    pub fn with_always_set_prefix(mut self, always_set_prefix: bool) -> Self {
        self.always_set_prefix = always_set_prefix;
        self
    }

    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = cache_name.into();
        self
    }

    pub fn with_cache_mechanism(mut self, cache_mechanism: CacheMechanism) -> Self {
        self.cache_mechanism = cache_mechanism;
        self
    }

    pub fn with_default_lang_fn<F>(mut self, select: F) -> Self
    where
        F: Fn(&LocaleSet, Option<&str>, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.default_lang_fn = Some(Arc::new(select));
        self
    }
}

/// Locale list and translation key prefix for a manually configured parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub locales: LocaleSet,
    pub key_prefix: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            locales: LocaleSet::new(["en"]),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl ParserOptions {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            locales: std::env::var("LOCALIZE_LOCALES")
                .ok()
                .map(|v| LocaleSet::parse(&v))
                .unwrap_or(defaults.locales),
            key_prefix: std::env::var("LOCALIZE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        })
    }
}
