// ── Navigator ──
//
// Holds the current route and the published breadcrumb. Also receives
// the HTTP client's 401 hooks: the session is torn down on every 401,
// and the route moves to login without consulting the guard.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use hivefriends_api::LoginRedirect;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::breadcrumb::Breadcrumb;
use crate::router::{Route, RouteName};
use crate::session::SessionContext;

pub struct Navigator {
    session: Arc<SessionContext>,
    current: RwLock<Route>,
    breadcrumb: watch::Sender<Breadcrumb>,
    login_redirects: AtomicUsize,
}

impl Navigator {
    pub fn new(session: Arc<SessionContext>) -> Self {
        let start = Route::login();
        let (breadcrumb, _) = watch::channel(Breadcrumb::for_route(&start, str::to_owned));
        Self {
            session,
            current: RwLock::new(start),
            breadcrumb,
            login_redirects: AtomicUsize::new(0),
        }
    }

    pub fn current(&self) -> Route {
        self.current.read().expect("route lock poisoned").clone()
    }

    pub fn breadcrumb(&self) -> Breadcrumb {
        self.breadcrumb.borrow().clone()
    }

    pub fn subscribe_breadcrumb(&self) -> watch::Receiver<Breadcrumb> {
        self.breadcrumb.subscribe()
    }

    /// How many times a 401 has sent the user to login.
    pub fn login_redirects(&self) -> usize {
        self.login_redirects.load(Ordering::SeqCst)
    }

    /// Settle on `route` and publish its breadcrumb.
    pub(crate) fn commit(&self, route: Route, resolve: impl Fn(&str) -> String) -> Route {
        let crumb = Breadcrumb::for_route(&route, resolve);
        debug!(route = %route, label = %crumb.label, "navigation resolved");
        *self.current.write().expect("route lock poisoned") = route.clone();
        self.breadcrumb.send_replace(crumb);
        route
    }
}

impl LoginRedirect for Navigator {
    fn session_expired(&self) {
        self.session.expire();
    }

    fn on_login_route(&self) -> bool {
        self.current().name == RouteName::Login
    }

    /// Concurrent 401s race here; only the first one moves the route.
    fn redirect_to_login(&self) {
        let login = Route::login();
        {
            let mut current = self.current.write().expect("route lock poisoned");
            if current.name == RouteName::Login {
                return;
            }
            *current = login.clone();
        }
        info!("redirecting to login");
        self.login_redirects.fetch_add(1, Ordering::SeqCst);
        self.breadcrumb
            .send_replace(Breadcrumb::for_route(&login, str::to_owned));
    }
}
