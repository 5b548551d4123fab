// Wire types for the hivefriends REST API.
//
// All payloads are camelCase JSON. Timestamps are seconds since the
// Unix epoch, exactly as the backend stores them.

use serde::{Deserialize, Serialize};

// ── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub key: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_album_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Usernames this user has met.
    #[serde(default)]
    pub met: Vec<String>,
    #[serde(default)]
    pub albums_uploaded: Vec<String>,
    pub created_at: i64,
}

impl User {
    /// Display name if set and non-empty, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

// ── Authentication ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub bearer_token: String,
    pub user_key: String,
}

// ── Images ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub key: String,
    /// Key of the uploading user.
    pub uploader: String,
    pub uploaded_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// An image as it appears in the activity feed: the image plus the
/// albums it was published into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityImage {
    #[serde(flatten)]
    pub image: Image,
    #[serde(default)]
    pub album_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub key: String,
}

// ── Albums ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Key of the album's author.
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_key: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    #[serde(default)]
    pub tagged_users: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub published_at: i64,
    #[serde(default)]
    pub created_at: i64,
}

/// Payload for creating an album. The cover must be one of `image_keys`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cover_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<String>,
    pub timeframe: Timeframe,
    pub image_keys: Vec<String>,
    pub tagged_users: Vec<String>,
    pub draft: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedAlbum {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareToken {
    pub token: String,
}

// ── Comments ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    /// Key of the comment's author.
    pub author: String,
    pub album_key: String,
    pub image_key: String,
    pub created_at: i64,
    pub text: String,
}

// ── Activity ────────────────────────────────────────────────────────

/// One entry of the heterogeneous activity feed.
///
/// The backend encodes the variant as the single key of a JSON object,
/// e.g. `{"comment": {...}}`. Any other key is a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityItem {
    Comment(Comment),
    Image(ActivityImage),
    Album(Album),
    User(User),
}

impl ActivityItem {
    /// The variant's own event time, in seconds since the epoch.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Comment(c) => c.created_at,
            Self::Image(i) => i.image.uploaded_at,
            Self::Album(a) => a.published_at,
            Self::User(u) => u.created_at,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

// ── Settings ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_album_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_theme: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange<'a> {
    pub old: &'a str,
    pub new: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn activity_item_reads_variant_key() {
        let item: ActivityItem = serde_json::from_value(json!({
            "comment": {
                "id": 4,
                "author": "jokler",
                "albumKey": "a1",
                "imageKey": "i1",
                "createdAt": 1_650_000_000,
                "text": "nice"
            }
        }))
        .unwrap();

        assert!(matches!(item, ActivityItem::Comment(_)));
        assert_eq!(item.timestamp(), 1_650_000_000);
    }

    #[test]
    fn activity_image_flattens_image_fields() {
        let item: ActivityItem = serde_json::from_value(json!({
            "image": {
                "key": "img",
                "uploader": "tmtu",
                "uploadedAt": 42,
                "albumKeys": ["a1"]
            }
        }))
        .unwrap();

        let ActivityItem::Image(image) = &item else {
            panic!("expected image variant, got {item:?}");
        };
        assert_eq!(image.image.uploader, "tmtu");
        assert_eq!(image.album_keys, vec!["a1".to_owned()]);
        assert_eq!(item.timestamp(), 42);
    }

    #[test]
    fn unknown_activity_variant_is_an_error() {
        let result: Result<ActivityItem, _> =
            serde_json::from_value(json!({ "poll": { "createdAt": 1 } }));
        assert!(result.is_err());
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user: User = serde_json::from_value(json!({
            "key": "u1",
            "username": "northcode",
            "createdAt": 0
        }))
        .unwrap();
        assert_eq!(user.display_name(), "northcode");

        user.display_name = Some(String::new());
        assert_eq!(user.display_name(), "northcode");

        user.display_name = Some("North".into());
        assert_eq!(user.display_name(), "North");
    }
}
