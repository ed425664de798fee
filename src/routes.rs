//! Route table model.
//!
//! Routes mirror the shape of a client-side router configuration: a path,
//! an optional redirect, nested children and a small data bag with the keys
//! the localizer reserves for itself. Everything derives serde so a table that
//! was already localized can be handed over as JSON and reused on a warm start.

use serde::{Deserialize, Serialize};

/// Path that matches every URL not matched by another route.
pub const WILDCARD_PATH: &str = "**";

/// How a route path is matched against the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatch {
    Full,
    Prefix,
}

/// Marker stored in `RouteData::kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    /// The single route whose path is the active locale code.
    #[serde(rename = "lang-root")]
    LangRoot,
}

/// The two route properties the translator rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteProperty {
    Path,
    RedirectTo,
}

impl RouteProperty {
    pub fn name(&self) -> &'static str {
        match self {
            RouteProperty::Path => "path",
            RouteProperty::RedirectTo => "redirectTo",
        }
    }
}

/// Untranslated `path` / `redirectTo` values of a route.
///
/// Every translation starts from these values, never from what the route
/// currently shows, so switching back and forth between languages does not
/// compound. A property is recorded once and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl LocalizationRecord {
    pub fn get(&self, property: RouteProperty) -> Option<&str> {
        match property {
            RouteProperty::Path => self.path.as_deref(),
            RouteProperty::RedirectTo => self.redirect_to.as_deref(),
        }
    }

    /// Record `value` for `property` unless something is already recorded.
    ///
    /// An empty string counts as recorded.
    pub fn record_if_absent(&mut self, property: RouteProperty, value: Option<&str>) {
        let slot = match property {
            RouteProperty::Path => &mut self.path,
            RouteProperty::RedirectTo => &mut self.redirect_to,
        };
        if slot.is_none() {
            *slot = value.map(str::to_string);
        }
    }
}

/// Reserved route data keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RouteKind>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_route_localization: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localize_router: Option<LocalizationRecord>,
}

/// A node of the route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_match: Option<PathMatch>,

    /// Name of the view rendered by this route, carried untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Route>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RouteData>,

    /// Reference to a lazily loaded route set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_children: Option<String>,

    /// The lazily loaded route set, once it has been resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_children: Option<Vec<Route>>,
}

/// A flat or nested sequence of routes, root of the navigable tree.
pub type RouteTable = Vec<Route>;

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn redirect(path: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            redirect_to: Some(redirect_to.into()),
            ..Default::default()
        }
    }

    /// A route whose children come from a lazily loaded module.
    pub fn lazy(path: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            load_children: Some(module.into()),
            ..Default::default()
        }
    }

    /// The `**` route.
    pub fn wildcard() -> Self {
        Self::new(WILDCARD_PATH)
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }

    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }

    pub fn with_path_match(mut self, path_match: PathMatch) -> Self {
        self.path_match = Some(path_match);
        self
    }

    /// Opt this route out of localization.
    pub fn skip_localization(mut self) -> Self {
        self.data_mut().skip_route_localization = true;
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.path.as_deref() == Some(WILDCARD_PATH)
    }

    pub fn is_lang_root(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|data| data.kind == Some(RouteKind::LangRoot))
    }

    pub fn skips_localization(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|data| data.skip_route_localization)
    }

    /// Route data, created empty if the route has none yet.
    pub fn data_mut(&mut self) -> &mut RouteData {
        self.data.get_or_insert_with(RouteData::default)
    }

    /// Recorded originals, if any were captured.
    pub fn localization(&self) -> Option<&LocalizationRecord> {
        self.data.as_ref().and_then(|data| data.localize_router.as_ref())
    }

    pub fn property(&self, property: RouteProperty) -> Option<&str> {
        match property {
            RouteProperty::Path => self.path.as_deref(),
            RouteProperty::RedirectTo => self.redirect_to.as_deref(),
        }
    }

    pub fn set_property(&mut self, property: RouteProperty, value: String) {
        match property {
            RouteProperty::Path => self.path = Some(value),
            RouteProperty::RedirectTo => self.redirect_to = Some(value),
        }
    }

    /// Store the resolved route set of a lazy route.
    ///
    /// The routes should already have gone through the parser's
    /// `init_child_routes` so they show the current language.
    pub fn attach_loaded_children(&mut self, routes: Vec<Route>) {
        self.loaded_children = Some(routes);
    }
}
