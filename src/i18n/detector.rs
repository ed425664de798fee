//! Active language detection.
//!
//! Resolution order, first hit wins:
//! 1. a locale code in the URL (segment 1, then segment 0)
//! 2. the configured default-language function, if any
//! 3. the cached language
//! 4. the browser language
//! 5. the first configured locale
//!
//! Steps 2-5 produce the *default* language. The URL only overrides the
//! language selected at load time, the default is kept for prefix decisions.

use crate::config::DefaultLangFn;
use crate::i18n::LocaleSet;
use tracing::debug;

/// Outcome of language detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Language used when nothing in the URL asks for another one
    pub default_lang: String,

    /// Language the route table is first translated into
    pub selected: String,
}

/// Resolves the active language from URL, cache and browser signals.
#[derive(Clone, Default)]
pub struct LanguageDetector {
    default_lang_fn: Option<DefaultLangFn>,
}

impl std::fmt::Debug for LanguageDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageDetector")
            .field("default_lang_fn", &self.default_lang_fn.is_some())
            .finish()
    }
}

impl LanguageDetector {
    pub fn new(default_lang_fn: Option<DefaultLangFn>) -> Self {
        Self { default_lang_fn }
    }

    /// Find a locale code in a URL path.
    ///
    /// The query part is ignored. The path is split on `/` and the segment
    /// after the leading slash is checked before the very first segment, so
    /// both `/fr/home` and `fr/home` resolve to `fr`.
    pub fn location_lang(locales: &LocaleSet, url: &str) -> Option<String> {
        let path = url.split('?').next().unwrap_or_default();
        let slices: Vec<&str> = path.split('/').collect();

        if slices.len() > 1 && locales.contains(slices[1]) {
            return Some(slices[1].to_string());
        }
        if let Some(first) = slices.first() {
            if locales.contains(first) {
                return Some(first.to_string());
            }
        }
        None
    }

    /// Compute the default language, ignoring the URL.
    ///
    /// # Returns
    /// `None` only when `locales` is empty.
    pub fn default_lang(
        &self,
        locales: &LocaleSet,
        cached: Option<&str>,
        browser: Option<&str>,
    ) -> Option<String> {
        let fallback = locales.first()?;

        if let Some(select) = &self.default_lang_fn {
            let chosen = select(locales, cached, browser);
            debug!("Default language function picked '{}'", chosen);
            if chosen.is_empty() {
                return Some(fallback.to_string());
            }
            return Some(chosen);
        }

        let chosen = locales
            .validate(cached)
            .or_else(|| locales.validate(browser))
            .unwrap_or(fallback);
        Some(chosen.to_string())
    }

    /// Detect the default and the selected language.
    ///
    /// # Arguments
    /// * `locales` - Supported locales; empty means detection is skipped
    /// * `cached` - Previously cached language, if any
    /// * `browser` - Language reported by the browser/environment, if any
    /// * `url` - Current URL path
    ///
    /// # Returns
    /// `None` when `locales` is empty.
    pub fn detect(
        &self,
        locales: &LocaleSet,
        cached: Option<&str>,
        browser: Option<&str>,
        url: &str,
    ) -> Option<Detection> {
        let default_lang = self.default_lang(locales, cached, browser)?;
        let selected = Self::location_lang(locales, url).unwrap_or_else(|| default_lang.clone());

        debug!(
            "Detected language '{}' (default '{}', cached {:?}, browser {:?}, url '{}')",
            selected, default_lang, cached, browser, url
        );

        Some(Detection {
            default_lang,
            selected,
        })
    }
}
