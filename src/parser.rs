//! Parser orchestrator: wires detection, caching, transformation and
//! translation into the load / switch lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --load--> Loading --(translation done)--> Ready
//! ```
//!
//! A cold load restructures the table around a language root and translates
//! it. A warm load receives a table that was already transformed (e.g. handed
//! over as JSON), locates the language root and translates it again.

use crate::cache::{CacheStores, LanguageCache};
use crate::config::{LocalizeRouterSettings, ParserOptions};
use crate::error::{ParseError, ParserError};
use crate::i18n::{LanguageDetector, LocaleSet, LookupMetrics, TranslationService};
use crate::location::{LocationProvider, StaticLocation};
use crate::routes::{Route, RouteTable};
use crate::transformer::transform;
use crate::translator::{RouteLayout, RouteTranslator};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Where a parser is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

impl ParserState {
    pub fn name(&self) -> &'static str {
        match self {
            ParserState::Uninitialized => "uninitialized",
            ParserState::Loading => "loading",
            ParserState::Ready => "ready",
        }
    }
}

/// State and behaviour shared by every parser.
pub struct ParserCore {
    settings: LocalizeRouterSettings,
    locales: LocaleSet,
    detector: LanguageDetector,
    cache: LanguageCache,
    translator: RouteTranslator,
    location: Arc<dyn LocationProvider>,
    routes: RouteTable,
    layout: RouteLayout,
    state: ParserState,
}

impl std::fmt::Debug for ParserCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserCore")
            .field("locales", &self.locales)
            .field("state", &self.state)
            .field("translator", &self.translator)
            .field("cache", &self.cache)
            .field("layout", &self.layout)
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl ParserCore {
    /// # Arguments
    /// * `locales` - Supported locales; empty disables localization entirely
    /// * `key_prefix` - Translation key prefix for route segments
    /// * `settings` - Localizer behaviour switches
    /// * `location` - Source of the URL the application was opened with
    /// * `stores` - Storage facilities for the language cache
    pub fn new(
        locales: LocaleSet,
        key_prefix: impl Into<String>,
        settings: LocalizeRouterSettings,
        location: Arc<dyn LocationProvider>,
        stores: &CacheStores,
    ) -> Self {
        let cache = LanguageCache::new(&settings, locales.clone(), stores);
        let detector = LanguageDetector::new(settings.default_lang_fn.clone());
        let translator = RouteTranslator::new(key_prefix, settings.always_set_prefix);

        Self {
            settings,
            locales,
            detector,
            cache,
            translator,
            location,
            routes: RouteTable::new(),
            layout: RouteLayout::default(),
            state: ParserState::Uninitialized,
        }
    }

    /// Take ownership of `routes` and localize them.
    ///
    /// # Arguments
    /// * `routes` - The application's route table
    /// * `service` - Translation bundle source
    /// * `warm_start` - `routes` was already transformed by an earlier load
    ///
    /// # Errors
    /// * `ParserError::AlreadyLoaded` if called more than once
    /// * `ParserError::Translation` if the initial bundle cannot be loaded; the
    ///   parser stays in `Loading` and `translate_routes` may be retried
    pub async fn load(
        &mut self,
        routes: RouteTable,
        service: Arc<dyn TranslationService>,
        warm_start: bool,
    ) -> Result<(), ParserError> {
        if self.state != ParserState::Uninitialized {
            return Err(ParserError::AlreadyLoaded(self.state.name()));
        }

        self.routes = routes;
        self.translator.set_service(Arc::clone(&service));
        self.state = ParserState::Loading;

        let cached = self.cache.get();
        let browser = service.browser_lang();
        let url = self.location.current_path();

        let Some(detection) =
            self.detector
                .detect(&self.locales, cached.as_deref(), browser.as_deref(), &url)
        else {
            debug!("No locales configured, leaving {} routes untouched", self.routes.len());
            self.state = ParserState::Ready;
            return Ok(());
        };

        service.set_default_lang(&detection.default_lang);
        self.translator.set_default_lang(&detection.default_lang);

        if warm_start {
            self.layout = RouteLayout::locate(&self.routes, self.settings.always_set_prefix);
            info!(
                "Reusing localized routes for '{}' (default '{}')",
                detection.selected, detection.default_lang
            );
            return self.translate_routes(&detection.selected).await;
        }

        let outcome = transform(
            &mut self.routes,
            &detection.selected,
            self.locales.len(),
            self.settings.always_set_prefix,
        );
        self.layout = RouteLayout::after_transform(outcome, &self.routes);
        debug!("Route layout after transform: {:?}", self.layout);

        self.translate_routes(&detection.selected).await
    }

    /// Switch the whole table to `lang`.
    pub async fn translate_routes(&mut self, lang: &str) -> Result<(), ParserError> {
        if self.state == ParserState::Uninitialized {
            return Err(ParserError::NotLoaded);
        }
        if self.locales.is_empty() {
            return Ok(());
        }

        self.translator
            .translate_routes(&mut self.routes, self.layout, &self.cache, lang)
            .await?;

        if self.state == ParserState::Loading {
            self.state = ParserState::Ready;
            info!("Localized routes ready in '{}'", lang);
        }
        Ok(())
    }

    pub fn translate_route(&self, path: &str) -> Result<String, ParseError> {
        self.translator.translate_route(path)
    }

    /// Translate a lazily loaded route set before it is attached.
    pub fn init_child_routes(&self, mut routes: RouteTable) -> Result<RouteTable, ParseError> {
        self.translator.translate_tree(&mut routes)?;
        Ok(routes)
    }

    pub fn settings(&self) -> &LocalizeRouterSettings {
        &self.settings
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn current_lang(&self) -> Option<&str> {
        self.translator.current_lang()
    }

    pub fn default_lang(&self) -> Option<&str> {
        self.translator.default_lang()
    }

    pub fn url_prefix(&self) -> &str {
        self.translator.url_prefix()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut RouteTable {
        &mut self.routes
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn metrics(&self) -> &LookupMetrics {
        self.translator.metrics()
    }
}

/// Route localization entry point.
///
/// Implementors only provide access to their [`ParserCore`]; the lifecycle is
/// shared.
#[async_trait]
pub trait LocalizeParser: Send + Sync {
    fn core(&self) -> &ParserCore;

    fn core_mut(&mut self) -> &mut ParserCore;

    async fn load(
        &mut self,
        routes: RouteTable,
        service: Arc<dyn TranslationService>,
        warm_start: bool,
    ) -> Result<(), ParserError> {
        self.core_mut().load(routes, service, warm_start).await
    }

    async fn translate_routes(&mut self, lang: &str) -> Result<(), ParserError> {
        self.core_mut().translate_routes(lang).await
    }

    /// Translate a path through the active bundle, keeping its query string.
    fn translate_route(&self, path: &str) -> Result<String, ParseError> {
        self.core().translate_route(path)
    }

    fn init_child_routes(&self, routes: RouteTable) -> Result<RouteTable, ParseError> {
        self.core().init_child_routes(routes)
    }

    fn locales(&self) -> &LocaleSet {
        self.core().locales()
    }

    fn current_lang(&self) -> Option<&str> {
        self.core().current_lang()
    }

    fn default_lang(&self) -> Option<&str> {
        self.core().default_lang()
    }

    fn url_prefix(&self) -> &str {
        self.core().url_prefix()
    }

    fn routes(&self) -> &[Route] {
        self.core().routes()
    }

    fn routes_mut(&mut self) -> &mut RouteTable {
        self.core_mut().routes_mut()
    }

    fn state(&self) -> ParserState {
        self.core().state()
    }
}

/// Parser configured with an explicit locale list and key prefix.
#[derive(Debug)]
pub struct ManualParser {
    core: ParserCore,
}

impl ManualParser {
    pub fn new(
        options: ParserOptions,
        settings: LocalizeRouterSettings,
        location: Arc<dyn LocationProvider>,
        stores: &CacheStores,
    ) -> Self {
        info!(
            "Configuring route localization for {} locale(s), key prefix '{}'",
            options.locales.len(),
            options.key_prefix
        );
        Self {
            core: ParserCore::new(options.locales, options.key_prefix, settings, location, stores),
        }
    }
}

impl LocalizeParser for ManualParser {
    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }
}

/// Parser without locales: loads instantly and never touches the table.
#[derive(Debug)]
pub struct DummyParser {
    core: ParserCore,
}

impl DummyParser {
    pub fn new(settings: LocalizeRouterSettings) -> Self {
        Self {
            core: ParserCore::new(
                LocaleSet::empty(),
                "",
                settings,
                Arc::new(StaticLocation::default()),
                &CacheStores::default(),
            ),
        }
    }
}

impl Default for DummyParser {
    fn default() -> Self {
        Self::new(LocalizeRouterSettings::default())
    }
}

impl LocalizeParser for DummyParser {
    fn core(&self) -> &ParserCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{KeyValueStore, MemoryStorage};
    use crate::i18n::StaticTranslationService;
    use crate::routes::PathMatch;
    use serde_json::json;

    fn service() -> Arc<StaticTranslationService> {
        Arc::new(
            StaticTranslationService::new()
                .with_bundle("en", json!({"ROUTES": {"home": "home", "about": "about"}}))
                .with_bundle("fr", json!({"ROUTES": {"home": "accueil", "about": "a-propos"}})),
        )
    }

    fn routes() -> RouteTable {
        vec![
            Route::redirect("", "home").with_path_match(PathMatch::Full),
            Route::new("home"),
            Route::new("about"),
            Route::redirect("**", "/home"),
        ]
    }

    fn parser(url: &str, settings: LocalizeRouterSettings, stores: &CacheStores) -> ManualParser {
        let options = ParserOptions {
            locales: LocaleSet::new(["en", "fr"]),
            ..ParserOptions::default()
        };
        ManualParser::new(options, settings, StaticLocation::shared(url), stores)
    }

    fn child_paths(parser: &ManualParser) -> Vec<String> {
        parser.routes()[0]
            .children
            .iter()
            .filter_map(|route| route.path.clone())
            .collect()
    }

    // ==================== Load Tests ====================

    #[tokio::test]
    async fn test_cold_load_uses_url_language() {
        let mut parser = parser("/fr/home", LocalizeRouterSettings::default(), &CacheStores::default());

        parser.load(routes(), service(), false).await.unwrap();

        assert_eq!(parser.state(), ParserState::Ready);
        assert_eq!(parser.current_lang(), Some("fr"));
        assert_eq!(parser.default_lang(), Some("en"));
        assert_eq!(parser.routes()[0].path.as_deref(), Some("fr"));
        assert_eq!(child_paths(&parser), vec!["", "accueil", "a-propos"]);
        assert_eq!(parser.routes()[2].redirect_to.as_deref(), Some("/fr/accueil"));
    }

    #[tokio::test]
    async fn test_cold_load_sets_service_default_lang() {
        let service = service();
        let mut parser = parser("/", LocalizeRouterSettings::default(), &CacheStores::default());

        parser.load(routes(), service.clone(), false).await.unwrap();

        assert_eq!(service.default_lang().as_deref(), Some("en"));
        assert_eq!(service.current_lang().as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_second_load_is_rejected() {
        let mut parser = parser("/", LocalizeRouterSettings::default(), &CacheStores::default());
        parser.load(routes(), service(), false).await.unwrap();
        let before = parser.routes().to_vec();

        let result = parser.load(routes(), service(), false).await;

        assert!(matches!(result, Err(ParserError::AlreadyLoaded("ready"))));
        assert_eq!(parser.routes(), before.as_slice());
    }

    #[tokio::test]
    async fn test_translate_before_load_is_rejected() {
        let mut parser = parser("/", LocalizeRouterSettings::default(), &CacheStores::default());

        let result = parser.translate_routes("fr").await;

        assert!(matches!(result, Err(ParserError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_failed_load_recovers_on_switch() {
        let service = Arc::new(
            StaticTranslationService::new()
                .with_bundle("fr", json!({"ROUTES": {"home": "accueil"}})),
        );
        let mut parser = parser("/", LocalizeRouterSettings::default(), &CacheStores::default());

        let result = parser.load(routes(), service, false).await;
        assert!(matches!(result, Err(ParserError::Translation(_))));
        assert_eq!(parser.state(), ParserState::Loading);

        parser.translate_routes("fr").await.unwrap();

        assert_eq!(parser.state(), ParserState::Ready);
        assert_eq!(parser.current_lang(), Some("fr"));
    }

    #[tokio::test]
    async fn test_load_while_loading_is_rejected() {
        let fr_only = || {
            Arc::new(
                StaticTranslationService::new()
                    .with_bundle("fr", json!({"ROUTES": {"home": "accueil"}})),
            )
        };
        let mut parser = parser("/", LocalizeRouterSettings::default(), &CacheStores::default());
        assert!(parser.load(routes(), fr_only(), false).await.is_err());
        assert_eq!(parser.state(), ParserState::Loading);
        let before = parser.routes().to_vec();

        let result = parser.load(routes(), fr_only(), false).await;

        assert!(matches!(result, Err(ParserError::AlreadyLoaded("loading"))));
        assert_eq!(parser.state(), ParserState::Loading);
        assert_eq!(parser.routes(), before.as_slice());
    }

    #[tokio::test]
    async fn test_warm_load_keeps_table() {
        let mut first = parser("/fr", LocalizeRouterSettings::default(), &CacheStores::default());
        first.load(routes(), service(), false).await.unwrap();
        let transferred = first.routes().to_vec();

        let mut second = parser("/fr", LocalizeRouterSettings::default(), &CacheStores::default());
        second.load(transferred.clone(), service(), true).await.unwrap();

        assert_eq!(second.state(), ParserState::Ready);
        assert_eq!(second.routes(), transferred.as_slice());
        assert_eq!(second.current_lang(), Some("fr"));

        second.translate_routes("en").await.unwrap();
        assert_eq!(second.routes()[0].path.as_deref(), Some("en"));
        assert_eq!(child_paths(&second), vec!["", "home", "about"]);
        assert_eq!(second.routes()[2].redirect_to.as_deref(), Some("/en/home"));
    }

    // ==================== Cache Tests ====================

    #[tokio::test]
    async fn test_switch_updates_cache_and_next_load_uses_it() {
        let storage = Arc::new(MemoryStorage::new());
        let stores = CacheStores::default().with_storage(storage.clone());

        let mut parser_a = parser("/", LocalizeRouterSettings::default(), &stores);
        parser_a.load(routes(), service(), false).await.unwrap();
        parser_a.translate_routes("fr").await.unwrap();

        assert_eq!(
            storage.get_item("LOCALIZE_DEFAULT_LANGUAGE").unwrap().as_deref(),
            Some("fr")
        );

        let mut parser_b = parser("/", LocalizeRouterSettings::default(), &stores);
        parser_b.load(routes(), service(), false).await.unwrap();
        assert_eq!(parser_b.default_lang(), Some("fr"));
    }

    // ==================== url_prefix Tests ====================

    #[tokio::test]
    async fn test_url_prefix_unforced_default_is_empty() {
        let settings = LocalizeRouterSettings::default().with_always_set_prefix(false);
        let mut parser = parser("/", settings, &CacheStores::default());

        parser.load(routes(), service(), false).await.unwrap();
        assert_eq!(parser.url_prefix(), "");

        parser.translate_routes("fr").await.unwrap();
        assert_eq!(parser.url_prefix(), "fr");
    }

    // ==================== Child Route Tests ====================

    #[tokio::test]
    async fn test_init_child_routes_uses_current_bundle() {
        let mut parser = parser("/fr", LocalizeRouterSettings::default(), &CacheStores::default());
        parser.load(routes(), service(), false).await.unwrap();

        let children = parser
            .init_child_routes(vec![Route::new("about"), Route::new("home/about")])
            .unwrap();

        assert_eq!(children[0].path.as_deref(), Some("a-propos"));
        assert_eq!(children[1].path.as_deref(), Some("accueil/a-propos"));
    }

    // ==================== DummyParser Tests ====================

    #[tokio::test]
    async fn test_dummy_parser_leaves_routes_untouched() {
        let mut parser = DummyParser::default();

        parser.load(routes(), service(), false).await.unwrap();
        parser.translate_routes("fr").await.unwrap();

        assert_eq!(parser.state(), ParserState::Ready);
        assert_eq!(parser.routes(), routes().as_slice());
        assert!(parser.locales().is_empty());
        assert_eq!(parser.current_lang(), None);
        assert_eq!(parser.url_prefix(), "");
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ParserState::default().name(), "uninitialized");
        assert_eq!(ParserState::Loading.name(), "loading");
    }
}
