//! Route translation: rewrites `path` and `redirectTo` into the active language.
//!
//! Every rewrite starts from the untranslated value recorded in the route's
//! [`LocalizationRecord`](crate::routes::LocalizationRecord), so translating
//! to A, then B, then A again yields exactly the first result.

use crate::cache::LanguageCache;
use crate::error::{ParseError, ParserError, TranslationError};
use crate::i18n::{Bundle, LookupMetrics, TranslationService};
use crate::routes::{Route, RouteKind, RouteProperty, RouteTable};
use crate::transformer::TransformOutcome;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Field of a structured translation entry holding the page's URL name.
pub const PAGE_NAME_KEY: &str = "PAGE_NAME";

/// Position of the routes the translator treats specially.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteLayout {
    /// Index of the language root in the top-level table
    pub language_root: Option<usize>,

    /// Index of the extracted wildcard route in the top-level table
    pub wildcard: Option<usize>,
}

impl RouteLayout {
    /// Layout of a table the transformer has just restructured.
    pub fn after_transform(outcome: TransformOutcome, routes: &[Route]) -> Self {
        Self {
            language_root: outcome.language_root.then_some(0),
            wildcard: if outcome.wildcard {
                routes.len().checked_sub(1)
            } else {
                None
            },
        }
    }

    /// Find the language root (and, under a forced prefix, the trailing
    /// wildcard) in a table that was transformed earlier.
    pub fn locate(routes: &[Route], always_prefix: bool) -> Self {
        let language_root = routes.iter().position(Route::is_lang_root);
        let wildcard = if always_prefix && language_root.is_some() {
            routes.iter().rposition(Route::is_wildcard)
        } else {
            None
        };

        Self {
            language_root,
            wildcard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LangPrefix {
    Never,
    WhenAbsolute,
    Always,
}

/// Translates route strings through the active translation bundle.
pub struct RouteTranslator {
    key_prefix: String,
    always_set_prefix: bool,
    service: Option<Arc<dyn TranslationService>>,
    bundle: Option<Bundle>,
    current_lang: Option<String>,
    default_lang: Option<String>,
    metrics: LookupMetrics,
}

impl std::fmt::Debug for RouteTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTranslator")
            .field("key_prefix", &self.key_prefix)
            .field("always_set_prefix", &self.always_set_prefix)
            .field("current_lang", &self.current_lang)
            .field("default_lang", &self.default_lang)
            .field("bundle_loaded", &self.bundle.is_some())
            .finish()
    }
}

impl RouteTranslator {
    /// # Arguments
    /// * `key_prefix` - Prepended to every segment before lookup (e.g., `"ROUTES."`)
    /// * `always_set_prefix` - Whether the locale prefix is used even for the default language
    pub fn new(key_prefix: impl Into<String>, always_set_prefix: bool) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            always_set_prefix,
            service: None,
            bundle: None,
            current_lang: None,
            default_lang: None,
            metrics: LookupMetrics::new(),
        }
    }

    pub fn set_service(&mut self, service: Arc<dyn TranslationService>) {
        self.service = Some(service);
    }

    pub fn set_default_lang(&mut self, lang: &str) {
        self.default_lang = Some(lang.to_string());
    }

    pub fn current_lang(&self) -> Option<&str> {
        self.current_lang.as_deref()
    }

    pub fn default_lang(&self) -> Option<&str> {
        self.default_lang.as_deref()
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }

    /// Locale segment for generated URLs.
    ///
    /// The active locale when prefixes are forced or the active locale is not
    /// the default one, otherwise empty.
    pub fn url_prefix(&self) -> &str {
        match &self.current_lang {
            Some(current)
                if self.always_set_prefix || self.default_lang.as_ref() != Some(current) =>
            {
                current
            }
            _ => "",
        }
    }

    /// Load the bundle for `lang` and make it the active language.
    pub async fn load_bundle(&mut self, lang: &str) -> Result<(), TranslationError> {
        let service = match &self.service {
            Some(service) => Arc::clone(service),
            None => return Err(TranslationError::MissingLanguage(lang.to_string())),
        };

        let bundle = service.use_lang(lang).await?;
        self.bundle = Some(bundle);
        self.current_lang = Some(lang.to_string());
        Ok(())
    }

    /// Translate a single path segment.
    ///
    /// Falls back to the segment itself when no bundle is loaded or the key
    /// has no usable entry.
    pub fn translate_text(&self, segment: &str) -> String {
        let (Some(bundle), Some(service)) = (&self.bundle, &self.service) else {
            return segment.to_string();
        };

        let key = format!("{}{}", self.key_prefix, segment);
        let translated = match service.get_parsed_result(bundle, &key) {
            Some(Value::String(text)) => Some(text),
            Some(Value::Object(entry)) => entry
                .get(PAGE_NAME_KEY)
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            _ => None,
        };

        match translated {
            Some(text) => {
                self.metrics.record_hit();
                text
            }
            None => {
                debug!("No translation for '{}', keeping segment", key);
                self.metrics.record_fallback();
                segment.to_string()
            }
        }
    }

    /// Translate every segment of a path, keeping the query string verbatim.
    ///
    /// # Errors
    /// `ParseError::MultipleQueryBlocks` when `path` contains more than one `?`.
    pub fn translate_route(&self, path: &str) -> Result<String, ParseError> {
        if path.matches('?').count() > 1 {
            return Err(ParseError::MultipleQueryBlocks(path.to_string()));
        }

        let (path_part, query) = match path.split_once('?') {
            Some((path_part, query)) => (path_part, Some(query)),
            None => (path, None),
        };

        let translated = path_part
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    String::new()
                } else {
                    self.translate_text(segment)
                }
            })
            .collect::<Vec<_>>()
            .join("/");

        Ok(match query {
            Some(query) => format!("{}?{}", translated, query),
            None => translated,
        })
    }

    /// Join `/` + url prefix with an already translated path.
    fn with_lang_prefix(&self, translated: &str) -> String {
        let prefix = self.url_prefix();
        let needs_separator = !translated.is_empty() && !translated.starts_with('/');

        match (prefix.is_empty(), needs_separator) {
            (true, true) => format!("/{}", translated),
            (true, false) => translated.to_string(),
            (false, true) => format!("/{}/{}", prefix, translated),
            (false, false) => format!("/{}{}", prefix, translated),
        }
    }

    /// Rewrite one property of `route` from its recorded original.
    fn translate_property(
        &self,
        route: &mut Route,
        property: RouteProperty,
        prefix: LangPrefix,
    ) -> Result<(), ParseError> {
        let shown = route.property(property).map(str::to_string);
        let record = route
            .data_mut()
            .localize_router
            .get_or_insert_with(Default::default);
        record.record_if_absent(property, shown.as_deref());

        let Some(original) = record.get(property).map(str::to_string) else {
            return Ok(());
        };

        let translated = self.translate_route(&original)?;
        let value = match prefix {
            LangPrefix::Always => self.with_lang_prefix(&translated),
            LangPrefix::WhenAbsolute if original.starts_with('/') => {
                self.with_lang_prefix(&translated)
            }
            LangPrefix::WhenAbsolute | LangPrefix::Never => translated,
        };

        debug!("{} '{}' -> '{}'", property.name(), original, value);
        route.set_property(property, value);
        Ok(())
    }

    /// Translate a route (sub)tree in place.
    ///
    /// Skipped routes are left alone together with their descendants. Resolved
    /// lazy children are translated too, so a lazy module loaded before a
    /// language switch stays in sync.
    pub fn translate_tree(&self, routes: &mut [Route]) -> Result<(), ParseError> {
        for route in routes.iter_mut() {
            if route.skips_localization() {
                continue;
            }

            let has_path = route
                .path
                .as_deref()
                .is_some_and(|path| !path.is_empty() && path != crate::routes::WILDCARD_PATH);
            if has_path {
                self.translate_property(route, RouteProperty::Path, LangPrefix::Never)?;
            }

            if route.redirect_to.as_deref().is_some_and(|to| !to.is_empty()) {
                self.translate_property(route, RouteProperty::RedirectTo, LangPrefix::WhenAbsolute)?;
            }

            self.translate_tree(&mut route.children)?;

            if let Some(loaded) = route.loaded_children.as_mut() {
                self.translate_tree(loaded)?;
            }
        }
        Ok(())
    }

    /// Rewrite the whole table for the active language.
    fn apply(&self, routes: &mut RouteTable, layout: RouteLayout) -> Result<(), ParseError> {
        let Some(root_index) = layout.language_root else {
            return self.translate_tree(routes);
        };

        if let Some(root) = routes.get_mut(root_index) {
            self.translate_tree(&mut root.children)?;
        }

        if !self.always_set_prefix {
            // unprefixed copies of the root's children
            for (index, route) in routes.iter_mut().enumerate() {
                if index != root_index {
                    self.translate_tree(std::slice::from_mut(route))?;
                }
            }
        }

        if let Some(wildcard) = layout.wildcard.and_then(|index| routes.get_mut(index)) {
            if wildcard.redirect_to.as_deref().is_some_and(|to| !to.is_empty()) {
                self.translate_property(wildcard, RouteProperty::RedirectTo, LangPrefix::Always)?;
            }
        }

        Ok(())
    }

    /// Switch the route table to `lang`.
    ///
    /// The cache and the language root's path are updated before the bundle is
    /// fetched. If the fetch fails nothing else changes and the error is returned.
    pub async fn translate_routes(
        &mut self,
        routes: &mut RouteTable,
        layout: RouteLayout,
        cache: &LanguageCache,
        lang: &str,
    ) -> Result<(), ParserError> {
        if self.service.is_none() {
            return Err(ParserError::NotLoaded);
        }

        cache.set(lang);
        if let Some(root) = layout.language_root.and_then(|index| routes.get_mut(index)) {
            root.path = Some(lang.to_string());
            root.data_mut().kind = Some(RouteKind::LangRoot);
        }

        self.load_bundle(lang).await?;
        let before = self.metrics.report();
        self.apply(routes, layout)?;
        self.metrics.record_pass();

        let pass = self.metrics.report().since(&before);
        info!(
            "Routes translated to '{}' ({} segments translated, {} kept, {:.1}% hit rate)",
            lang, pass.hits, pass.fallbacks, pass.hit_rate
        );
        Ok(())
    }
}
