//! Application start-up wiring for a localize parser.
//!
//! Route sets are registered the way a router module tree declares them: one
//! root set, plus any number of child sets from feature modules. On start the
//! initializer either reuses a table handed over from a previous render (warm)
//! or transforms the registered routes from scratch (cold), after which the
//! localized table is kept for handing over again.

use crate::error::{ConfigError, ParserError};
use crate::i18n::TranslationService;
use crate::parser::LocalizeParser;
use crate::routes::{Route, RouteTable};
use std::sync::Arc;
use tracing::{debug, info};

/// Collects route registrations and runs the parser's initial load.
#[derive(Debug)]
pub struct ParserInitializer<P> {
    parser: P,
    root_routes: Option<RouteTable>,
    child_routes: Vec<RouteTable>,
    transfer: Option<RouteTable>,
}

impl<P: LocalizeParser> ParserInitializer<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            root_routes: None,
            child_routes: Vec::new(),
            transfer: None,
        }
    }

    /// Register the application's root route set.
    ///
    /// # Errors
    /// `ConfigError::ForRootCalledTwice` if a root set is already registered.
    pub fn for_root(&mut self, routes: RouteTable) -> Result<&mut Self, ConfigError> {
        if self.root_routes.is_some() {
            return Err(ConfigError::ForRootCalledTwice);
        }
        debug!("Registered {} root routes", routes.len());
        self.root_routes = Some(routes);
        Ok(self)
    }

    /// Register an additional route set, e.g. from a feature module.
    pub fn for_child(&mut self, routes: RouteTable) -> &mut Self {
        debug!("Registered {} child routes", routes.len());
        self.child_routes.push(routes);
        self
    }

    /// All registered routes: the root set first, then child sets in order.
    pub fn registered_routes(&self) -> RouteTable {
        self.root_routes
            .iter()
            .chain(self.child_routes.iter())
            .flatten()
            .cloned()
            .collect()
    }

    /// Run the parser's initial load.
    ///
    /// # Arguments
    /// * `service` - Translation bundle source
    /// * `transferred` - A table localized by an earlier run; a non-empty table
    ///   triggers a warm start and the registered routes are ignored
    pub async fn initialize(
        &mut self,
        service: Arc<dyn TranslationService>,
        transferred: Option<RouteTable>,
    ) -> Result<(), ParserError> {
        match transferred.filter(|routes| !routes.is_empty()) {
            Some(routes) => {
                info!("Warm start with {} transferred routes", routes.len());
                self.parser.load(routes, service, true).await
            }
            None => {
                let routes = self.registered_routes();
                info!("Cold start with {} registered routes", routes.len());
                self.parser.load(routes, service, false).await?;
                self.transfer = Some(self.parser.routes().to_vec());
                Ok(())
            }
        }
    }

    /// The localized table produced by a cold start, ready to be handed over.
    pub fn transfer_state(&self) -> Option<&[Route]> {
        self.transfer.as_deref()
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut P {
        &mut self.parser
    }

    pub fn into_parser(self) -> P {
        self.parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStores;
    use crate::config::{LocalizeRouterSettings, ParserOptions};
    use crate::i18n::{LocaleSet, StaticTranslationService};
    use crate::location::StaticLocation;
    use crate::parser::{ManualParser, ParserState};
    use serde_json::json;

    fn service() -> Arc<StaticTranslationService> {
        Arc::new(
            StaticTranslationService::new()
                .with_bundle("en", json!({"ROUTES": {"home": "home", "shop": "shop"}}))
                .with_bundle("de", json!({"ROUTES": {"home": "start", "shop": "laden"}})),
        )
    }

    fn initializer(url: &str) -> ParserInitializer<ManualParser> {
        let options = ParserOptions {
            locales: LocaleSet::new(["en", "de"]),
            ..ParserOptions::default()
        };
        let parser = ManualParser::new(
            options,
            LocalizeRouterSettings::default(),
            StaticLocation::shared(url),
            &CacheStores::default(),
        );
        ParserInitializer::new(parser)
    }

    // ==================== Registration Tests ====================

    #[test]
    fn test_for_root_twice_is_rejected() {
        let mut init = initializer("/");
        init.for_root(vec![Route::new("home")]).unwrap();

        let result = init.for_root(vec![Route::new("other")]);

        assert_eq!(result.err(), Some(ConfigError::ForRootCalledTwice));
    }

    #[test]
    fn test_registered_routes_root_first() {
        let mut init = initializer("/");
        init.for_child(vec![Route::new("shop")]);
        init.for_root(vec![Route::new("home")]).unwrap();
        init.for_child(vec![Route::new("blog")]);

        let paths: Vec<_> = init
            .registered_routes()
            .into_iter()
            .filter_map(|route| route.path)
            .collect();

        assert_eq!(paths, vec!["home", "shop", "blog"]);
    }

    // ==================== Start-up Tests ====================

    #[tokio::test]
    async fn test_cold_start_exposes_transfer_state() {
        let mut init = initializer("/de");
        init.for_root(vec![Route::new("home")]).unwrap();
        init.for_child(vec![Route::new("shop")]);

        init.initialize(service(), None).await.unwrap();

        let transfer = init.transfer_state().expect("Should expose routes");
        assert_eq!(transfer, init.parser().routes());
        assert_eq!(transfer[0].path.as_deref(), Some("de"));
        assert_eq!(transfer[0].children[1].path.as_deref(), Some("laden"));
    }

    #[tokio::test]
    async fn test_warm_start_from_serialized_transfer() {
        let mut cold = initializer("/de");
        cold.for_root(vec![Route::new("home"), Route::new("shop")]).unwrap();
        cold.initialize(service(), None).await.unwrap();
        let json = serde_json::to_string(cold.transfer_state().unwrap()).unwrap();

        let transferred: RouteTable = serde_json::from_str(&json).unwrap();
        let mut warm = initializer("/de");
        warm.for_root(vec![Route::new("ignored")]).unwrap();
        warm.initialize(service(), Some(transferred.clone())).await.unwrap();

        assert_eq!(warm.parser().state(), ParserState::Ready);
        assert_eq!(warm.parser().routes(), transferred.as_slice());
        assert!(warm.transfer_state().is_none());

        let mut parser = warm.into_parser();
        parser.translate_routes("en").await.unwrap();
        assert_eq!(parser.routes()[0].path.as_deref(), Some("en"));
        assert_eq!(parser.routes()[0].children[1].path.as_deref(), Some("shop"));
    }

    #[tokio::test]
    async fn test_empty_transfer_falls_back_to_cold_start() {
        let mut init = initializer("/");
        init.for_root(vec![Route::new("home")]).unwrap();

        init.initialize(service(), Some(Vec::new())).await.unwrap();

        assert!(init.transfer_state().is_some());
        assert!(init.parser().routes()[0].is_lang_root());
    }
}
