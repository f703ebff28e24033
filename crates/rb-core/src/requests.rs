//! Request bodies accepted by the gateway.
//!
//! Each body names exactly the fields a caller may set. Anything else in the
//! incoming JSON (resolved display fields echoed back by the UI, counters it
//! has no business touching) is ignored rather than merged.

use serde::Deserialize;

use crate::codec::{self, double_option};
use crate::ids::{deserialize_opt_id, EntityId};
use crate::models::{Post, Reply, User};

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// The username, if present and not blank.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// The password to register with, if present and not blank.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// The password exactly as sent, `""` when absent. Login compares this
    /// verbatim; a blank password is never read as the default.
    pub fn supplied_password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Default, Deserialize)]
pub struct NewPost {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub custom_username: Option<String>,
    #[serde(default, with = "codec::flag")]
    pub is_anonymous: bool,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "codec::images::deserialize")]
    pub images: Vec<String>,
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
}

impl NewPost {
    /// A draft owned by the explicit `user_id`, or by `author` when none was given.
    pub fn into_post(self, author: &EntityId) -> Post {
        Post {
            user_id: Some(self.user_id.unwrap_or_else(|| author.clone())),
            custom_username: self.custom_username,
            is_anonymous: self.is_anonymous,
            category: self.category,
            title: self.title,
            content: self.content,
            images: self.images,
            custom_replies_count: self.custom_replies_count,
            user_title: self.user_title,
            user_identity: self.user_identity,
            user_rank: self.user_rank,
            custom_time: self.custom_time,
            region: self.region,
            ..Post::default()
        }
    }
}

/// Body of `POST /posts/:id/replies`.
#[derive(Debug, Default, Deserialize)]
pub struct NewReply {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<EntityId>,
    /// Free-text display name typed by the poster.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub custom_username: Option<String>,
    #[serde(default, with = "codec::flag")]
    pub is_anonymous: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "codec::images::deserialize")]
    pub images: Vec<String>,
    #[serde(default)]
    pub floor_number: Option<u32>,
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
    #[serde(default)]
    pub quoted_reply: Option<serde_json::Value>,
}

impl NewReply {
    /// A free-text `username` without an explicit `user_id` becomes the
    /// reply's custom username and unlinks it from any account.
    pub fn into_reply(self, post_id: EntityId, author: &EntityId) -> Reply {
        let display_name = self.username.filter(|u| !u.is_empty());
        let (user_id, custom_username) = match (self.user_id, display_name) {
            (None, Some(name)) => (None, Some(name)),
            (explicit, _) => (
                Some(explicit.unwrap_or_else(|| author.clone())),
                self.custom_username,
            ),
        };

        Reply {
            user_id,
            custom_username,
            is_anonymous: self.is_anonymous,
            content: self.content,
            images: self.images,
            floor_number: self.floor_number,
            user_title: self.user_title,
            user_identity: self.user_identity,
            user_rank: self.user_rank,
            custom_time: self.custom_time,
            region: self.region,
            quoted_reply: self.quoted_reply,
            ..Reply::new(post_id)
        }
    }
}

/// Body of `PUT /posts/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct PostPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub user_id: Option<Option<EntityId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_username: Option<Option<String>>,
    #[serde(default, deserialize_with = "codec::opt_flag::deserialize")]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "codec::opt_images::deserialize")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "codec::opt_flag::deserialize")]
    pub is_pinned: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_replies_count: Option<Option<u64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_identity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_rank: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    /// Display name the editor picked alongside `user_id`. Never stored.
    #[serde(default, rename = "_selected_username")]
    pub selected_username: Option<String>,
}

macro_rules! merge {
    ($target:ident, $patch:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

impl PostPatch {
    /// When the editor linked a user id that resolves to nobody but also
    /// supplied a display name, keep the name as a custom username instead.
    pub fn promote_selected_username(&mut self, is_known: impl Fn(&EntityId) -> bool) {
        let selected = self.selected_username.take().filter(|s| !s.is_empty());
        let has_custom = matches!(&self.custom_username, Some(Some(name)) if !name.is_empty());
        let dangling = match &self.user_id {
            Some(Some(id)) => !is_known(id),
            _ => false,
        };
        if let (true, false, Some(name)) = (dangling, has_custom, selected) {
            self.custom_username = Some(Some(name));
            self.user_id = Some(None);
        }
    }

    pub fn apply(self, post: &mut Post) {
        let user_id = self.user_id.map(|id| id.filter(|id| !id.is_unassigned()));
        if let Some(id) = user_id {
            post.user_id = id;
        }
        merge!(
            post, self,
            custom_username, is_anonymous, category, title, content, images, views,
            likes, is_pinned, sort_order, custom_replies_count, user_title,
            user_identity, user_rank, custom_time, region,
        );
    }
}

/// Body of `PUT /replies/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct ReplyPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub user_id: Option<Option<EntityId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_username: Option<Option<String>>,
    #[serde(default, deserialize_with = "codec::opt_flag::deserialize")]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "codec::opt_images::deserialize")]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub floor_number: Option<Option<u32>>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_identity: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_rank: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub quoted_reply: Option<Option<serde_json::Value>>,
}

impl ReplyPatch {
    pub fn apply(self, reply: &mut Reply) {
        let user_id = self.user_id.map(|id| id.filter(|id| !id.is_unassigned()));
        if let Some(id) = user_id {
            reply.user_id = id;
        }
        merge!(
            reply, self,
            custom_username, is_anonymous, content, images, floor_number, likes,
            sort_order, user_title, user_identity, user_rank, custom_time, region,
            quoted_reply,
        );
    }
}

/// Body of `PUT /user`. The password is not editable here.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
}

impl UserPatch {
    /// The requested new username, if it differs from `current`.
    pub fn rename_to<'a>(&'a self, current: &str) -> Option<&'a str> {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty() && *name != current)
    }

    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.username.filter(|n| !n.is_empty()) {
            user.username = name;
        }
        merge!(user, self, avatar, rank, title, identity);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyOrder {
    pub id: EntityId,
    pub sort_order: i64,
}

/// Body of `PUT /posts/:id/replies/order`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyOrderRequest {
    #[serde(rename = "replyOrders")]
    pub reply_orders: Vec<ReplyOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_patch_ignores_unknown_fields_and_clears_nulls() {
        let mut post = Post {
            title: "old".into(),
            custom_replies_count: Some(4),
            region: Some("祖安".into()),
            ..Post::default()
        };
        let patch: PostPatch = serde_json::from_value(json!({
            "title": "new",
            "custom_replies_count": null,
            "username": "echoed display field",
            "replies_count": 99,
        }))
        .unwrap();
        patch.apply(&mut post);
        assert_eq!(post.title, "new");
        assert_eq!(post.custom_replies_count, None);
        assert_eq!(post.region.as_deref(), Some("祖安"));
    }

    #[test]
    fn explicit_zero_reply_count_survives() {
        let mut post = Post::default();
        let patch: PostPatch = serde_json::from_value(json!({"custom_replies_count": 0})).unwrap();
        patch.apply(&mut post);
        assert_eq!(post.custom_replies_count, Some(0));
    }

    #[test]
    fn selected_username_promoted_for_unknown_user() {
        let mut patch: PostPatch = serde_json::from_value(json!({
            "user_id": "ghost",
            "_selected_username": "旧账号",
        }))
        .unwrap();
        patch.promote_selected_username(|_| false);
        assert_eq!(patch.custom_username, Some(Some("旧账号".to_string())));
        assert_eq!(patch.user_id, Some(None));
        assert_eq!(patch.selected_username, None);
    }

    #[test]
    fn selected_username_ignored_for_known_user() {
        let mut patch: PostPatch = serde_json::from_value(json!({
            "user_id": 7,
            "_selected_username": "Zephyr",
        }))
        .unwrap();
        patch.promote_selected_username(|id| *id == "7");
        assert_eq!(patch.custom_username, None);
        assert_eq!(patch.user_id, Some(Some(EntityId::from("7"))));
    }

    #[test]
    fn reply_display_name_without_user_id_becomes_custom() {
        let body: NewReply =
            serde_json::from_value(json!({"content": "hi", "username": "过路人"})).unwrap();
        let reply = body.into_reply("p1".into(), &"me".into());
        assert_eq!(reply.user_id, None);
        assert_eq!(reply.custom_username.as_deref(), Some("过路人"));
    }

    #[test]
    fn reply_defaults_to_author() {
        let body: NewReply = serde_json::from_value(json!({"content": "hi"})).unwrap();
        let reply = body.into_reply("p1".into(), &"me".into());
        assert_eq!(reply.user_id, Some(EntityId::from("me")));
        assert_eq!(reply.post_id, "p1");
    }

    #[test]
    fn user_patch_never_touches_password() {
        let mut user = User {
            id: "1".into(),
            username: "a".into(),
            password: "keep".into(),
            avatar: None,
            rank: String::new(),
            title: String::new(),
            identity: String::new(),
        };
        let patch: UserPatch =
            serde_json::from_value(json!({"password": "x", "title": "新头衔"})).unwrap();
        patch.apply(&mut user);
        assert_eq!(user.password, "keep");
        assert_eq!(user.title, "新头衔");
    }

    #[test]
    fn reply_order_requires_array() {
        let bad = serde_json::from_value::<ReplyOrderRequest>(json!({"replyOrders": "nope"}));
        assert!(bad.is_err());
    }
}
