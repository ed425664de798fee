//! Route localization for hierarchical route tables.
//!
//! A route table is restructured once around a language root (`/en/...`),
//! then every `path` and `redirectTo` is translated segment by segment through
//! a translation bundle. Switching language re-translates the table in place
//! from the recorded originals.
//!
//! # Example
//!
//! ```rust,ignore
//! use localize_router::prelude::*;
//!
//! let mut parser = ManualParser::new(
//!     ParserOptions::default(),
//!     LocalizeRouterSettings::default(),
//!     StaticLocation::shared("/en/home"),
//!     &CacheStores::default(),
//! );
//! parser.load(routes, service, false).await?;
//! parser.translate_routes("fr").await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod initializer;
pub mod location;
pub mod parser;
pub mod routes;
pub mod transformer;
pub mod translator;

pub mod prelude {
    pub use crate::cache::{CacheStores, LanguageCache};
    pub use crate::config::{CacheMechanism, LocalizeRouterSettings, ParserOptions};
    pub use crate::error::{ConfigError, ParseError, ParserError, TranslationError};
    pub use crate::i18n::{
        FileTranslationService, LocaleSet, StaticTranslationService, TranslationService,
    };
    pub use crate::initializer::ParserInitializer;
    pub use crate::location::{LocationProvider, StaticLocation};
    pub use crate::parser::{DummyParser, LocalizeParser, ManualParser, ParserState};
    pub use crate::routes::{PathMatch, Route, RouteTable};
}
