// ── Breadcrumb ──
//
// Human-readable label and window title for the current route, built
// from the route's templates by replacing `_param_` placeholders.

use serde::Serialize;

use crate::router::Route;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub title: String,
}

impl Breadcrumb {
    /// Build the breadcrumb for `route`, resolving each parameter value
    /// through `resolve` (normally a user display-name lookup).
    pub fn for_route(route: &Route, resolve: impl Fn(&str) -> String) -> Self {
        let meta = route.meta();
        Self {
            label: render(meta.breadcrumb, route, &resolve),
            title: render(meta.title, route, &resolve),
        }
    }
}

/// Substitute `_key_` placeholders with resolved parameter values.
pub fn render(template: &str, route: &Route, resolve: impl Fn(&str) -> String) -> String {
    let mut out = template.to_owned();
    for (key, value) in &route.params {
        let placeholder = format!("_{key}_");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &resolve(value));
        }
    }
    out
}
