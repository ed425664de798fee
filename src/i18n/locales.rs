//! Locale set: the ordered list of languages a route table is localized into.
//!
//! The first locale is the implicit fallback when no other signal picks a
//! language. An empty set turns the whole localizer into a passthrough.

use tracing::warn;

/// Ordered list of supported locale codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet {
    locales: Vec<String>,
}

impl LocaleSet {
    /// Build a locale set, dropping blank and repeated codes.
    ///
    /// # Arguments
    /// * `locales` - Locale codes in priority order (e.g., `["en", "fr"]`)
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for locale in locales {
            let locale = locale.into().trim().to_string();
            if locale.is_empty() {
                continue;
            }
            if unique.contains(&locale) {
                warn!("Ignoring duplicate locale '{}'", locale);
                continue;
            }
            unique.push(locale);
        }
        Self { locales: unique }
    }

    /// A locale set with no locales.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"en, fr,de"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.locales.iter().any(|locale| locale == code)
    }

    /// The fallback locale.
    pub fn first(&self) -> Option<&str> {
        self.locales.first().map(String::as_str)
    }

    /// Return `code` only if it belongs to this set.
    pub fn validate<'a>(&self, code: Option<&'a str>) -> Option<&'a str> {
        code.filter(|code| !code.is_empty() && self.contains(code))
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.locales
    }
}

impl<S: Into<String>> FromIterator<S> for LocaleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
