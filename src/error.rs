//! Error types for route localization.
//!
//! Each failure is scoped to a single call: a malformed path fails one
//! translation, a bundle that cannot be loaded fails one language switch.
//! Storage problems never show up here, the language cache swallows them.

use thiserror::Error;

/// A route path that cannot be split into path and query parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("There should be only one query parameter block in the URL: '{0}'")]
    MultipleQueryBlocks(String),
}

/// Failure to load a translation bundle for a language.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("No translations available for language '{0}'")]
    MissingLanguage(String),

    #[error("Failed to read translations for '{lang}': {source}")]
    Io {
        lang: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse translations for '{lang}': {source}")]
    Json {
        lang: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a persistent client-side store.
///
/// Never leaves the language cache: it is logged and treated as a miss.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage is not available: {0}")]
    Unavailable(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage contents are corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by a localize parser.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Parser has already been loaded (state: {0})")]
    AlreadyLoaded(&'static str),

    #[error("Routes cannot be translated before the parser is loaded")]
    NotLoaded,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Wiring-time configuration mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Root routes registered twice. Lazy loaded route sets should be added as child routes instead.")]
    ForRootCalledTwice,

    #[error("Unknown cache mechanism: '{0}'")]
    UnknownCacheMechanism(String),
}
