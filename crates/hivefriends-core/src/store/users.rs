// ── User directory ──
//
// All known users plus name resolution for labels. The signed-in user
// comes from the session so lookups work before the list is fetched.

use std::sync::Arc;

use hivefriends_api::User;

use super::collection::Collection;
use crate::session::SessionContext;

pub struct UserDirectory {
    users: Collection<User>,
    session: Arc<SessionContext>,
}

impl UserDirectory {
    pub(crate) fn new(session: Arc<SessionContext>) -> Self {
        Self {
            users: Collection::new(),
            session,
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<User>>> {
        self.users.snapshot()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn replace(&self, users: Vec<User>) {
        self.users.replace(users);
    }

    /// Insert or refresh one user by key.
    pub(crate) fn upsert(&self, user: User) {
        let key = user.key.clone();
        if !self.users.replace_where(|u| u.key == key, user.clone()) {
            self.users.push(user);
        }
    }

    /// Look a user up by username, then by display name.
    pub fn get_user(&self, name: &str) -> Option<Arc<User>> {
        self.users
            .find(|u| u.username == name)
            .or_else(|| {
                self.users
                    .find(|u| u.display_name.as_deref() == Some(name))
            })
    }

    pub fn by_key(&self, key: &str) -> Option<Arc<User>> {
        self.users.find(|u| u.key == key)
    }

    /// Label for a username.
    ///
    /// With no name, the signed-in user's label. Unknown names come back
    /// unchanged.
    pub fn display_name(&self, name: Option<&str>) -> String {
        let me = self.session.user();
        let Some(name) = name else {
            return me.map(|u| u.display_name().to_owned()).unwrap_or_default();
        };
        if let Some(user) = self.users.find(|u| u.username == name) {
            return user.display_name().to_owned();
        }
        match me {
            Some(me) if me.username == name => me.display_name().to_owned(),
            _ => name.to_owned(),
        }
    }
}
