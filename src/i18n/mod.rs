//! Language selection and translation lookup.
//!
//! # Architecture
//!
//! - `locales`: ordered set of supported locale codes
//! - `detector`: picks the active language from URL, cache and browser signals
//! - `service`: the translation bundle source consumed by the localizer
//! - `metrics`: lookup hit/fallback counters
//!
//! # Example
//!
//! ```rust,ignore
//! use localize_router::i18n::{LanguageDetector, LocaleSet};
//!
//! let locales = LocaleSet::new(["en", "fr", "de"]);
//! let detection = LanguageDetector::default().detect(&locales, Some("de"), None, "/fr/home");
//! assert_eq!(detection.unwrap().selected, "fr");
//! ```

mod detector;
mod locales;
mod metrics;
mod service;

pub use detector::{Detection, LanguageDetector};
pub use locales::LocaleSet;
pub use metrics::{LookupMetrics, LookupReport};
pub use service::{
    lookup_key, system_lang, Bundle, FileTranslationService, StaticTranslationService,
    TranslationService,
};
