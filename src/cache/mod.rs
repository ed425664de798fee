//! Language cache: remembers the selected language between sessions.
//!
//! Two interchangeable backends, chosen by [`CacheMechanism`]:
//! - a key-value store (`localStorage` style)
//! - a cookie jar, with a fixed 30 day expiry
//!
//! Both degrade silently. A missing backend or a failing access is a cache
//! miss on read and a no-op on write; the error is only logged.
//!
//! # Example
//!
//! ```rust,ignore
//! use localize_router::cache::{CacheStores, LanguageCache, MemoryStorage};
//!
//! let stores = CacheStores::default().with_storage(Arc::new(MemoryStorage::new()));
//! let cache = LanguageCache::new(&settings, locales, &stores);
//! cache.set("fr");
//! assert_eq!(cache.get().as_deref(), Some("fr"));
//! ```

mod cookie;
mod storage;

pub use cookie::{cookie_assignment, read_cookie, MemoryCookieJar, COOKIE_EXPIRY_DAYS};
pub use storage::{FileStorage, MemoryStorage};

use crate::config::{CacheMechanism, LocalizeRouterSettings};
use crate::error::StoreError;
use crate::i18n::LocaleSet;
use std::sync::Arc;
use tracing::debug;

/// Persistent key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Cookie access in the style of `document.cookie`.
pub trait CookieJar: Send + Sync {
    /// All visible cookies as `name=value; name2=value2`.
    fn cookie_string(&self) -> Result<String, StoreError>;

    /// Apply one `name=value;expires=...` assignment.
    fn set_cookie(&self, assignment: &str) -> Result<(), StoreError>;
}

/// Storage facilities available in the current environment.
///
/// A `None` slot means the facility does not exist (e.g. rendering outside a
/// browser), which the cache treats like a permanently empty store.
#[derive(Clone, Default)]
pub struct CacheStores {
    pub storage: Option<Arc<dyn KeyValueStore>>,
    pub cookies: Option<Arc<dyn CookieJar>>,
}

impl CacheStores {
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieJar>) -> Self {
        self.cookies = Some(cookies);
        self
    }
}

#[derive(Clone)]
enum Backend {
    Storage(Option<Arc<dyn KeyValueStore>>),
    Cookie(Option<Arc<dyn CookieJar>>),
}

/// Cached language, validated against the locale set on read.
#[derive(Clone)]
pub struct LanguageCache {
    enabled: bool,
    name: String,
    locales: LocaleSet,
    backend: Backend,
}

impl std::fmt::Debug for LanguageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Storage(store) => format!("storage(available: {})", store.is_some()),
            Backend::Cookie(jar) => format!("cookie(available: {})", jar.is_some()),
        };
        f.debug_struct("LanguageCache")
            .field("enabled", &self.enabled)
            .field("name", &self.name)
            .field("backend", &backend)
            .finish()
    }
}

impl LanguageCache {
    /// Build the cache selected by `settings.cache_mechanism`.
    pub fn new(settings: &LocalizeRouterSettings, locales: LocaleSet, stores: &CacheStores) -> Self {
        let backend = match settings.cache_mechanism {
            CacheMechanism::LocalStorage => Backend::Storage(stores.storage.clone()),
            CacheMechanism::Cookie => Backend::Cookie(stores.cookies.clone()),
        };

        Self {
            enabled: settings.use_cached_lang,
            name: settings.cache_name.clone(),
            locales,
            backend,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            name: String::new(),
            locales: LocaleSet::empty(),
            backend: Backend::Storage(None),
        }
    }

    /// Previously cached language, if it is one of the supported locales.
    pub fn get(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let stored = match &self.backend {
            Backend::Storage(Some(store)) => store.get_item(&self.name),
            Backend::Cookie(Some(jar)) => jar
                .cookie_string()
                .map(|cookies| read_cookie(&cookies, &self.name)),
            Backend::Storage(None) | Backend::Cookie(None) => return None,
        };

        match stored {
            Ok(value) => self.locales.validate(value.as_deref()).map(str::to_string),
            Err(e) => {
                debug!("Language cache read failed, treating as empty: {}", e);
                None
            }
        }
    }

    /// Remember `lang`. Empty values are ignored.
    pub fn set(&self, lang: &str) {
        if !self.enabled || lang.is_empty() {
            return;
        }

        let result = match &self.backend {
            Backend::Storage(Some(store)) => store.set_item(&self.name, lang),
            Backend::Cookie(Some(jar)) => jar.set_cookie(&cookie_assignment(&self.name, lang)),
            Backend::Storage(None) | Backend::Cookie(None) => return,
        };

        if let Err(e) = result {
            debug!("Language cache write failed, ignoring: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales() -> LocaleSet {
        LocaleSet::new(["en", "fr", "de"])
    }

    fn storage_cache(storage: Arc<MemoryStorage>) -> LanguageCache {
        let stores = CacheStores::default().with_storage(storage);
        LanguageCache::new(&LocalizeRouterSettings::default(), locales(), &stores)
    }

    fn cookie_cache(jar: Arc<MemoryCookieJar>) -> LanguageCache {
        let settings =
            LocalizeRouterSettings::default().with_cache_mechanism(CacheMechanism::Cookie);
        let stores = CacheStores::default().with_cookies(jar);
        LanguageCache::new(&settings, locales(), &stores)
    }

    // ==================== Storage Backend Tests ====================

    #[test]
    fn test_storage_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = storage_cache(storage.clone());

        cache.set("fr");

        assert_eq!(cache.get().as_deref(), Some("fr"));
        assert_eq!(
            storage.get_item("LOCALIZE_DEFAULT_LANGUAGE").unwrap().as_deref(),
            Some("fr")
        );
    }

    #[test]
    fn test_storage_value_outside_locales_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("LOCALIZE_DEFAULT_LANGUAGE", "es").unwrap();

        assert_eq!(storage_cache(storage).get(), None);
    }

    #[test]
    fn test_unavailable_storage_degrades_silently() {
        let cache = storage_cache(Arc::new(MemoryStorage::unavailable()));

        cache.set("fr");

        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_missing_storage_is_a_miss() {
        let cache = LanguageCache::new(
            &LocalizeRouterSettings::default(),
            locales(),
            &CacheStores::default(),
        );

        cache.set("fr");

        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_disabled_cache_never_reads_or_writes() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("LOCALIZE_DEFAULT_LANGUAGE", "de").unwrap();
        let settings = LocalizeRouterSettings::default().with_use_cached_lang(false);
        let stores = CacheStores::default().with_storage(storage.clone());
        let cache = LanguageCache::new(&settings, locales(), &stores);

        cache.set("fr");

        assert_eq!(cache.get(), None);
        assert_eq!(
            storage.get_item("LOCALIZE_DEFAULT_LANGUAGE").unwrap().as_deref(),
            Some("de")
        );
    }

    #[test]
    fn test_empty_value_is_not_written() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = storage_cache(storage.clone());

        cache.set("");

        assert_eq!(storage.get_item("LOCALIZE_DEFAULT_LANGUAGE").unwrap(), None);
    }

    #[test]
    fn test_custom_cache_name() {
        let storage = Arc::new(MemoryStorage::new());
        let settings = LocalizeRouterSettings::default().with_cache_name("site-lang");
        let stores = CacheStores::default().with_storage(storage.clone());
        let cache = LanguageCache::new(&settings, locales(), &stores);

        cache.set("de");

        assert_eq!(storage.get_item("site-lang").unwrap().as_deref(), Some("de"));
    }

    // ==================== Cookie Backend Tests ====================

    #[test]
    fn test_cookie_round_trip() {
        let jar = Arc::new(MemoryCookieJar::new());
        let cache = cookie_cache(jar.clone());

        cache.set("de");

        assert_eq!(cache.get().as_deref(), Some("de"));
        let assignment = jar.last_assignment().expect("Should have written a cookie");
        assert!(assignment.starts_with("LOCALIZE_DEFAULT_LANGUAGE=de;expires="));
    }

    #[test]
    fn test_cookie_value_outside_locales_is_ignored() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.set_cookie("LOCALIZE_DEFAULT_LANGUAGE=it").unwrap();

        assert_eq!(cookie_cache(jar).get(), None);
    }

    #[test]
    fn test_unavailable_cookies_degrade_silently() {
        let cache = cookie_cache(Arc::new(MemoryCookieJar::unavailable()));

        cache.set("fr");

        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_debug_shows_backend() {
        let cache = cookie_cache(Arc::new(MemoryCookieJar::new()));
        let debug = format!("{:?}", cache);
        assert!(debug.contains("cookie(available: true)"));
    }
}
