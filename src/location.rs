//! Access to the URL the application was opened with.

use std::sync::{Arc, RwLock};

/// Source of the current URL path (e.g. `/fr/home?x=1`).
pub trait LocationProvider: Send + Sync {
    fn current_path(&self) -> String;
}

/// A fixed location that can be moved explicitly.
#[derive(Debug, Default)]
pub struct StaticLocation {
    path: RwLock<String>,
}

impl StaticLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: RwLock::new(path.into()),
        }
    }

    /// Convenience for handing the location to a parser.
    pub fn shared(path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(path))
    }

    pub fn navigate(&self, path: impl Into<String>) {
        if let Ok(mut current) = self.path.write() {
            *current = path.into();
        }
    }
}

impl LocationProvider for StaticLocation {
    fn current_path(&self) -> String {
        self.path
            .read()
            .map(|path| path.clone())
            .unwrap_or_default()
    }
}
