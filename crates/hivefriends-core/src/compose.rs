// ── Text and layout helpers ──

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::store::UserDirectory;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention pattern is valid"));

/// Usernames mentioned as `@name` that belong to known users, in order of
/// appearance, without duplicates.
pub fn mentions(text: &str, users: &UserDirectory) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in MENTION.captures_iter(text) {
        let name = &caps[1];
        if users.get_user(name).is_some() && !found.iter().any(|f| f == name) {
            found.push(name.to_owned());
        }
    }
    found
}

/// Rewrite every `@name` of a known user with `render(original, name)`.
/// Mentions of unknown users are left as written.
pub fn format_mentions<'t>(
    text: &'t str,
    users: &UserDirectory,
    render: impl Fn(&str, &str) -> String,
) -> Cow<'t, str> {
    MENTION.replace_all(text, |caps: &Captures<'_>| {
        let original = &caps[0];
        let name = &caps[1];
        if users.get_user(name).is_some() {
            render(original, name)
        } else {
            original.to_owned()
        }
    })
}

/// Distribute items across `columns` columns, left to right, for a
/// masonry layout. Zero columns behaves like one.
pub fn chunk<T: Clone>(items: &[T], columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let mut out: Vec<Vec<T>> = vec![Vec::new(); columns.min(items.len().max(1))];
    let width = out.len();
    for (i, item) in items.iter().enumerate() {
        if let Some(column) = out.get_mut(i % width) {
            column.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use hivefriends_api::MemoryStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::session::SessionContext;

    fn directory() -> UserDirectory {
        let session = Arc::new(SessionContext::new(Arc::new(MemoryStorage::new())));
        let users = UserDirectory::new(session);
        users.replace(
            ["tmtu", "jokler"]
                .iter()
                .map(|name| {
                    serde_json::from_value(serde_json::json!({
                        "key": format!("k-{name}"),
                        "username": name,
                        "createdAt": 0
                    }))
                    .unwrap()
                })
                .collect(),
        );
        users
    }

    #[test]
    fn only_known_users_are_mentions() {
        let users = directory();
        let found = mentions("@tmtu and @ghost and @jokler and @tmtu again", &users);
        assert_eq!(found, ["tmtu", "jokler"]);
    }

    #[test]
    fn format_leaves_unknown_mentions() {
        let users = directory();
        let out = format_mentions("hi @tmtu, meet @ghost", &users, |orig, name| {
            format!("[{orig}](/user/{name})")
        });
        insta::assert_snapshot!(out, @"hi [@tmtu](/user/tmtu), meet @ghost");
    }

    #[test]
    fn chunk_round_robin() {
        let cols = chunk(&[1, 2, 3, 4, 5], 3);
        assert_eq!(cols, vec![vec![1, 4], vec![2, 5], vec![3]]);
    }

    #[test]
    fn chunk_edge_cases() {
        assert_eq!(chunk(&[1, 2], 5), vec![vec![1], vec![2]]);
        assert_eq!(chunk(&[1, 2], 0), vec![vec![1, 2]]);
        assert_eq!(chunk::<i32>(&[], 3), vec![Vec::<i32>::new()]);
    }
}
