// ── Route table ──
//
// Named routes with `:param` path patterns and the metadata the guard
// and breadcrumb consume. Unknown paths resolve to the login route.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum RouteName {
    Login,
    Home,
    Activity,
    Albums,
    AlbumDetail,
    ImageDetail,
    PublicAlbumDetail,
    PublicImageDetail,
    Profile,
    Settings,
    Upload,
}

/// Per-route flags and label templates.
///
/// `breadcrumb` and `title` may contain `_param_` placeholders naming a
/// path parameter, e.g. `_user_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub disable_nav: bool,
    /// Signed-in users are sent home instead.
    pub redirect_on_auth: bool,
    pub breadcrumb: &'static str,
    pub title: &'static str,
}

const fn private(breadcrumb: &'static str, title: &'static str) -> RouteMeta {
    RouteMeta {
        requires_auth: true,
        disable_nav: false,
        redirect_on_auth: false,
        breadcrumb,
        title,
    }
}

impl RouteName {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Home => "/home",
            Self::Activity => "/activity",
            Self::Albums => "/albums",
            Self::AlbumDetail => "/album/:id",
            Self::ImageDetail => "/album/:album/image/:image",
            Self::PublicAlbumDetail => "/public/album/:id/:token",
            Self::PublicImageDetail => "/public/album/:album/image/:image/:token",
            Self::Profile => "/user/:user",
            Self::Settings => "/settings",
            Self::Upload => "/upload",
        }
    }

    pub fn meta(self) -> RouteMeta {
        match self {
            Self::Login => RouteMeta {
                requires_auth: false,
                disable_nav: true,
                redirect_on_auth: true,
                breadcrumb: "Login",
                title: "Login · hivefriends",
            },
            Self::Home => private("Home", "hivefriends"),
            Self::Activity => private("Activity", "Activity · hivefriends"),
            Self::Albums => private("Albums", "Albums · hivefriends"),
            Self::AlbumDetail => private("Album", "Album · hivefriends"),
            Self::ImageDetail => private("Image", "Image · hivefriends"),
            Self::PublicAlbumDetail => RouteMeta {
                requires_auth: false,
                disable_nav: true,
                redirect_on_auth: false,
                breadcrumb: "Shared album",
                title: "Shared album · hivefriends",
            },
            Self::PublicImageDetail => RouteMeta {
                requires_auth: false,
                disable_nav: true,
                redirect_on_auth: false,
                breadcrumb: "Shared image",
                title: "Shared image · hivefriends",
            },
            Self::Profile => private("_user_", "_user_ · hivefriends"),
            Self::Settings => private("Settings", "Settings · hivefriends"),
            Self::Upload => private("Upload", "Upload · hivefriends"),
        }
    }

    /// Routes reachable through a public share token.
    pub fn is_public(self) -> bool {
        matches!(self, Self::PublicAlbumDetail | Self::PublicImageDetail)
    }

    fn segments(self) -> impl Iterator<Item = &'static str> {
        self.pattern().split('/').filter(|s| !s.is_empty())
    }
}

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub name: RouteName,
    pub params: BTreeMap<String, String>,
    pub path: String,
}

impl Route {
    /// Build a route from its name and parameters.
    pub fn named<'a>(
        name: RouteName,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CoreError> {
        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        let mut path = String::new();
        for segment in name.segments() {
            path.push('/');
            match segment.strip_prefix(':') {
                Some(param) => {
                    let value = params.get(param).filter(|v| !v.is_empty()).ok_or_else(|| {
                        CoreError::MissingRouteParam {
                            route: name.to_string(),
                            param: param.to_owned(),
                        }
                    })?;
                    path.push_str(value);
                }
                None => path.push_str(segment),
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        Ok(Self { name, params, path })
    }

    /// A route without parameters.
    pub fn simple(name: RouteName) -> Self {
        Self {
            name,
            params: BTreeMap::new(),
            path: name.pattern().to_owned(),
        }
    }

    pub fn login() -> Self {
        Self::simple(RouteName::Login)
    }

    /// Match a path against the route table. Unknown paths yield the
    /// login route.
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for name in <RouteName as strum::IntoEnumIterator>::iter() {
            if let Some(params) = match_segments(name, &segments) {
                let normalized = format!("/{}", segments.join("/"));
                return Self {
                    name,
                    params,
                    path: normalized,
                };
            }
        }
        Self::login()
    }

    pub fn meta(&self) -> RouteMeta {
        self.name.meta()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

fn match_segments(name: RouteName, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = name.segments().collect();
    if pattern.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        match expected.strip_prefix(':') {
            Some(param) => {
                params.insert(param.to_owned(), (*actual).to_owned());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}
