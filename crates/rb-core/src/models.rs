//! # Domain Models
//!
//! These structs represent the persisted entities of the board plus the
//! derived views the gateway hands back to the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::ids::{deserialize_opt_id, EntityId};

pub const DEFAULT_PASSWORD: &str = "1234567";
pub const DEFAULT_AVATAR: &str = "avatars/default-avatar.png";
pub const ANONYMOUS_USERNAME: &str = "匿名用户";
pub const UNKNOWN_USERNAME: &str = "未知用户";

/// A registered account. `username` is unique, compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: EntityId,
    pub username: String,
    /// Stored in plaintext; this is a local demo store, not an auth system.
    /// Empty on records written without one; login reads that as the
    /// configured default.
    #[serde(default, deserialize_with = "codec::null_default")]
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub rank: String,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub identity: String,
}

/// A user as exposed to callers: everything but the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: EntityId,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub rank: String,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub identity: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            rank: user.rank.clone(),
            title: user.title.clone(),
            identity: user.identity.clone(),
        }
    }
}

/// A thread opener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub custom_username: Option<String>,
    #[serde(default, with = "codec::flag")]
    pub is_anonymous: bool,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub category: String,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub title: String,
    /// HTML body
    #[serde(default, deserialize_with = "codec::null_default")]
    pub content: String,
    /// base64 data URLs or plain URLs
    #[serde(default, deserialize_with = "codec::images::deserialize")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub views: u64,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub likes: u64,
    #[serde(default, with = "codec::flag")]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub sort_order: i64,
    /// Manual override for the displayed reply count; `Some(0)` is a real value.
    #[serde(default)]
    pub custom_replies_count: Option<u64>,
    #[serde(default)]
    pub user_title: Option<String>,
    #[serde(default)]
    pub user_identity: Option<String>,
    #[serde(default)]
    pub user_rank: Option<String>,
    #[serde(default)]
    pub custom_time: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Post {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::default(),
            user_id: None,
            custom_username: None,
            is_anonymous: false,
            category: String::new(),
            title: String::new(),
            content: String::new(),
            images: Vec::new(),
            views: 0,
            likes: 0,
            is_pinned: false,
            sort_order: 0,
            custom_replies_count: None,
            user_title: None,
            user_identity: None,
            user_rank: None,
            custom_time: None,
            region: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reply inside a post's thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: EntityId,
    pub post_id: EntityId,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub custom_username: Option<String>,
    #[serde(default, with = "codec::flag")]
    pub is_anonymous: bool,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub content: String,
    #[serde(default, deserialize_with = "codec::images::deserialize")]
    pub images: Vec<String>,
    /// `None` until pinned by an editor; listings fill the gaps on the fly.
    #[serde(default)]
    pub floor_number: Option<u32>,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub likes: u64,
    #[serde(default, deserialize_with = "codec::null_default")]
    pub sort_order: i64,
    #[serde(default)]
    pub user_title: Option<String>,
    #[serde(default)]
    pub user_identity: Option<String>,
    #[serde(default)]
    pub user_rank: Option<String>,
    #[serde(default)]
    pub custom_time: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Snapshot of the reply being quoted, stored verbatim.
    #[serde(default)]
    pub quoted_reply: Option<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reply {
    pub fn new(post_id: EntityId) -> Self {
        Self {
            id: EntityId::default(),
            post_id,
            user_id: None,
            custom_username: None,
            is_anonymous: false,
            content: String::new(),
            images: Vec::new(),
            floor_number: None,
            likes: 0,
            sort_order: 0,
            user_title: None,
            user_identity: None,
            user_rank: None,
            custom_time: None,
            region: None,
            quoted_reply: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// One user's like on one post. `(post_id, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub post_id: EntityId,
    pub user_id: EntityId,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Display attribution for a post or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub avatar: String,
    pub rank: String,
    pub title: String,
    pub identity: String,
}

/// A post as returned by the gateway.
///
/// `post.user_title` carries the resolved title, since `title` is taken by
/// the post's own headline.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub username: String,
    pub avatar: String,
    pub rank: String,
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<u64>,
}

impl PostView {
    pub fn new(mut post: Post, author: Identity, replies_count: Option<u64>) -> Self {
        post.user_title = Some(author.title);
        Self {
            post,
            username: author.username,
            avatar: author.avatar,
            rank: author.rank,
            identity: author.identity,
            replies_count,
        }
    }
}

/// A reply as returned by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    #[serde(flatten)]
    pub reply: Reply,
    #[serde(flatten)]
    pub author: Identity,
}

/// Collection sizes, as reported by the maintenance tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStats {
    pub users: usize,
    pub posts: usize,
    pub replies: usize,
    pub likes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_post_record_deserializes() {
        let raw = r#"{
            "id": 42, "user_id": 7, "is_anonymous": true, "is_pinned": 1,
            "category": "plaza", "title": "t", "content": "<p>x</p>",
            "images": "[\"a.png\"]", "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let post: Post = serde_json::from_str(raw).unwrap();
        assert_eq!(post.id, "42");
        assert_eq!(post.user_id, Some(EntityId::from("7")));
        assert!(post.is_anonymous);
        assert!(post.is_pinned);
        assert_eq!(post.images, vec!["a.png"]);
        assert_eq!(post.custom_replies_count, None);
    }

    #[test]
    fn flags_serialize_as_integers() {
        let post = Post { is_pinned: true, ..Post::default() };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["is_pinned"], 1);
        assert_eq!(json["is_anonymous"], 0);
    }

    #[test]
    fn post_view_moves_resolved_title_into_user_title() {
        let post = Post { title: "headline".into(), user_title: None, ..Post::default() };
        let author = Identity {
            username: "Ahri".into(),
            avatar: DEFAULT_AVATAR.into(),
            rank: "坚韧黑铁".into(),
            title: "九尾妖狐".into(),
            identity: String::new(),
        };
        let json = serde_json::to_value(PostView::new(post, author, Some(3))).unwrap();
        assert_eq!(json["title"], "headline");
        assert_eq!(json["user_title"], "九尾妖狐");
        assert_eq!(json["username"], "Ahri");
        assert_eq!(json["replies_count"], 3);
    }

    #[test]
    fn profile_drops_password() {
        let user = User {
            id: "1".into(),
            username: "Zephyr".into(),
            password: "secret".into(),
            avatar: None,
            rank: String::new(),
            title: String::new(),
            identity: String::new(),
        };
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password").is_none());
    }
}
