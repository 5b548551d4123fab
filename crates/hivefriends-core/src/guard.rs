// ── Route guard ──
//
// Pure decision function evaluated before every navigation. It reads a
// snapshot of the session and returns what the navigator must do; the
// navigator owns the side effects.

use tracing::trace;

use crate::error::CoreError;
use crate::router::{Route, RouteName};
use crate::session::SessionSnapshot;

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Continue to the target.
    Proceed,
    /// Continue to the target, holding its public token.
    ProceedPublic { token: String },
    /// Continue after loading the signed-in user record.
    ProceedAfterHydrate,
    /// A valid session exists on a public route: drop the public token and
    /// go to the authenticated equivalent.
    Promote(Route),
    /// Public viewers may not leave public routes: stay where they were.
    LockIn(Route),
    /// No valid session for a protected route: clear persisted
    /// credentials and go to login.
    RequireLogin,
    /// Signed-in user hit a route that redirects on auth.
    AlreadySignedIn(Route),
}

/// Decide the navigation from `from` to `to`.
pub fn evaluate(
    to: &Route,
    from: &Route,
    session: &SessionSnapshot,
) -> Result<Decision, CoreError> {
    let meta = to.meta();

    // A public target always carries its own token, which replaces any
    // token already held.
    let target_token = if to.name.is_public() {
        to.param("token").filter(|t| !t.is_empty())
    } else {
        None
    };
    let public_token = target_token.or(session.public_token.as_deref());

    if let Some(token) = public_token {
        if !to.name.is_public() {
            trace!(to = %to, from = %from, "public view locked in");
            return Ok(Decision::LockIn(from.clone()));
        }
        if session.has_credentials() {
            return authenticated_equivalent(to).map(Decision::Promote);
        }
        return Ok(Decision::ProceedPublic {
            token: token.to_owned(),
        });
    }

    if meta.requires_auth {
        if !session.has_credentials() {
            return Ok(Decision::RequireLogin);
        }
        if !session.signed_in {
            return Ok(Decision::ProceedAfterHydrate);
        }
    }

    if meta.redirect_on_auth && session.has_credentials() && session.signed_in {
        return Ok(Decision::AlreadySignedIn(Route::simple(RouteName::Home)));
    }

    Ok(Decision::Proceed)
}

/// The private route showing the same resource as a public one.
pub fn authenticated_equivalent(route: &Route) -> Result<Route, CoreError> {
    match route.name {
        RouteName::PublicAlbumDetail => Route::named(
            RouteName::AlbumDetail,
            [("id", route.param("id").unwrap_or_default())],
        ),
        RouteName::PublicImageDetail => Route::named(
            RouteName::ImageDetail,
            [
                ("album", route.param("album").unwrap_or_default()),
                ("image", route.param("image").unwrap_or_default()),
            ],
        ),
        _ => Ok(route.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn signed_in() -> SessionSnapshot {
        SessionSnapshot {
            has_token: true,
            has_user: true,
            signed_in: true,
            public_token: None,
        }
    }

    fn anonymous() -> SessionSnapshot {
        SessionSnapshot::default()
    }

    #[test]
    fn protected_route_without_token_requires_login() {
        let decision = evaluate(&Route::resolve("/albums"), &Route::login(), &anonymous()).unwrap();
        assert_eq!(decision, Decision::RequireLogin);
    }

    #[test]
    fn token_without_user_record_requires_login() {
        let session = SessionSnapshot {
            has_token: true,
            ..SessionSnapshot::default()
        };
        let decision = evaluate(&Route::resolve("/home"), &Route::login(), &session).unwrap();
        assert_eq!(decision, Decision::RequireLogin);
    }

    #[test]
    fn signed_in_user_proceeds() {
        let decision = evaluate(&Route::resolve("/settings"), &Route::login(), &signed_in()).unwrap();
        assert_eq!(decision, Decision::Proceed);
    }

    #[test]
    fn persisted_but_unloaded_user_is_hydrated() {
        let session = SessionSnapshot {
            signed_in: false,
            ..signed_in()
        };
        let decision = evaluate(&Route::resolve("/home"), &Route::login(), &session).unwrap();
        assert_eq!(decision, Decision::ProceedAfterHydrate);
    }

    #[test]
    fn public_route_enters_public_view() {
        let to = Route::resolve("/public/album/a1/share");
        let decision = evaluate(&to, &Route::login(), &anonymous()).unwrap();
        assert_eq!(
            decision,
            Decision::ProceedPublic {
                token: "share".into()
            }
        );
    }

    #[test]
    fn public_route_with_session_promotes() {
        let to = Route::resolve("/public/album/a1/image/i1/share");
        let decision = evaluate(&to, &Route::login(), &signed_in()).unwrap();
        assert_eq!(
            decision,
            Decision::Promote(Route::resolve("/album/a1/image/i1"))
        );
    }

    #[test]
    fn public_view_locks_in() {
        let from = Route::resolve("/public/album/a1/share");
        let session = SessionSnapshot {
            public_token: Some("share".into()),
            ..anonymous()
        };

        let decision = evaluate(&Route::resolve("/albums"), &from, &session).unwrap();
        assert_eq!(decision, Decision::LockIn(from.clone()));

        // Login is not a public route either.
        let decision = evaluate(&Route::login(), &from, &session).unwrap();
        assert_eq!(decision, Decision::LockIn(from));
    }

    #[test]
    fn public_view_moves_between_public_routes() {
        let from = Route::resolve("/public/album/a1/share");
        let session = SessionSnapshot {
            public_token: Some("share".into()),
            ..anonymous()
        };
        let to = Route::resolve("/public/album/a1/image/i2/share");

        let decision = evaluate(&to, &from, &session).unwrap();
        assert!(matches!(decision, Decision::ProceedPublic { .. }));
    }

    #[test]
    fn login_redirects_signed_in_users_home() {
        let decision = evaluate(&Route::login(), &Route::login(), &signed_in()).unwrap();
        assert_eq!(
            decision,
            Decision::AlreadySignedIn(Route::simple(RouteName::Home))
        );
    }

    #[test]
    fn login_open_to_anonymous() {
        let decision = evaluate(&Route::login(), &Route::login(), &anonymous()).unwrap();
        assert_eq!(decision, Decision::Proceed);
    }
}
