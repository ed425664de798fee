//! One-time restructuring of a route table around a language root.
//!
//! With a forced prefix the table becomes
//! `[base redirect, <lang> { ...localizable routes }, ...skipped routes, **]`.
//! Without it the language root is added in front of the untouched table, so
//! the default language keeps working without a prefix.

use crate::routes::{LocalizationRecord, PathMatch, Route, RouteKind, RouteTable};
use tracing::debug;

/// What the transformer placed in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOutcome {
    /// A language root was inserted at the head of the table
    pub language_root: bool,

    /// A wildcard route was moved to the end of the table
    pub wildcard: bool,
}

/// Stamp the untranslated path and redirect onto a route.
fn stamp_originals(route: &mut Route) {
    let record = LocalizationRecord {
        path: route.path.clone(),
        redirect_to: route.redirect_to.clone(),
    };
    route.data_mut().localize_router = Some(record);
}

/// Build the language root for `lang` around `children`.
pub fn language_root(lang: &str, children: Vec<Route>) -> Route {
    let mut root = Route::new(lang).with_children(children);
    root.data_mut().kind = Some(RouteKind::LangRoot);
    root
}

/// Restructure `routes` in place.
///
/// # Arguments
/// * `routes` - The route table; must not have been transformed before
/// * `selected` - Language the root route is created for
/// * `locale_count` - Number of configured locales
/// * `always_prefix` - Whether every URL carries the locale prefix
pub fn transform(
    routes: &mut RouteTable,
    selected: &str,
    locale_count: usize,
    always_prefix: bool,
) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    let mut wildcard = None;

    let mut children: Vec<Route> = if always_prefix {
        if let Some(index) = routes.iter().position(Route::is_wildcard) {
            wildcard = Some(routes.remove(index));
        }
        let base = Route::redirect("", selected).with_path_match(PathMatch::Full);
        std::mem::replace(routes, vec![base])
    } else {
        routes.clone()
    };

    for i in (0..children.len()).rev() {
        if children[i].skips_localization() {
            let skipped = children.remove(i);
            debug!("Route {:?} skips localization", skipped.path);
            if always_prefix {
                routes.push(skipped);
            }
        } else {
            stamp_originals(&mut children[i]);
            if !always_prefix {
                stamp_originals(&mut routes[i]);
            }
        }
    }

    if !children.is_empty() && (locale_count > 1 || always_prefix) {
        debug!(
            "Nesting {} routes under language root '{}'",
            children.len(),
            selected
        );
        routes.insert(0, language_root(selected, children));
        outcome.language_root = true;
    }

    if always_prefix {
        if let Some(wildcard) = wildcard {
            routes.push(wildcard);
            outcome.wildcard = true;
        }
    }

    outcome
}
