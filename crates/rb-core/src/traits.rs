//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the gateway.
//! Nothing in the core reaches for ambient global state; the storage
//! backend, repository and auth policy are all handed in.

use async_trait::async_trait;

use crate::envelope::{ApiResult, RequestBody};
use crate::ids::EntityId;
use crate::models::{DataStats, Like, Post, Reply, User, UserProfile};

/// Raw string key-value persistence, the shape of browser local storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// Entity persistence contract for users, posts, replies, likes and the
/// current session.
///
/// Lookups return `None`/`false` for missing records; whether that is an
/// error is the caller's decision.
pub trait BoardRepo: Send + Sync {
    // User Operations
    fn list_users(&self) -> Vec<User>;
    fn find_user_by_id(&self, id: &EntityId) -> Option<User>;
    /// Exact, case-sensitive match.
    fn find_user_by_username(&self, username: &str) -> Option<User>;
    fn upsert_user(&self, user: User) -> User;

    // Post Operations
    fn list_posts(&self) -> Vec<Post>;
    fn find_post(&self, id: &EntityId) -> Option<Post>;
    /// Replaces the stored post with the same id, or inserts a new one with
    /// a fresh id and zeroed counters.
    fn upsert_post(&self, post: Post) -> Post;
    /// Also deletes every reply of the post.
    fn delete_post(&self, id: &EntityId) -> bool;

    // Reply Operations
    fn list_replies(&self) -> Vec<Reply>;
    /// In storage order.
    fn replies_for_post(&self, post_id: &EntityId) -> Vec<Reply>;
    fn find_reply(&self, id: &EntityId) -> Option<Reply>;
    fn upsert_reply(&self, reply: Reply) -> Reply;
    fn delete_reply(&self, id: &EntityId) -> bool;

    // Like Operations
    fn list_likes(&self) -> Vec<Like>;
    /// Returns `true` when the pair is liked after the call.
    fn toggle_like(&self, post_id: &EntityId, user_id: &EntityId) -> bool;
    fn count_likes(&self, post_id: &EntityId) -> usize;
    fn delete_like(&self, post_id: &EntityId, user_id: &EntityId) -> bool;

    // Session
    fn session_token(&self) -> Option<String>;
    fn current_user(&self) -> Option<UserProfile>;
    fn start_session(&self, token: &str, user: &UserProfile) -> bool;
    /// Replaces the current-user snapshot, leaving the token alone.
    fn update_current_user(&self, user: &UserProfile) -> bool;
    fn end_session(&self);

    // Maintenance
    fn stats(&self) -> DataStats;
    /// Drops posts, replies, likes and the session; keeps accounts.
    fn clear_posts_data(&self);
    /// Drops everything, accounts included.
    fn clear_all_data(&self);
}

/// Outcome of comparing a supplied password against an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// The account's own password was given.
    Matched,
    /// The global default password was given for an account whose own
    /// password differs. The caller resets the account to the default.
    MasterKey,
    Rejected,
}

/// Session and credential policy.
pub trait AuthProvider: Send + Sync {
    /// A fresh opaque session marker. Not signed, never expires.
    fn issue_token(&self) -> String;

    /// Password given to accounts created without one.
    fn default_password(&self) -> &str;

    fn check_password(&self, stored: &str, supplied: &str) -> PasswordCheck;
}

/// The four-verb contract the UI talks to.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, url: &str) -> ApiResult;
    async fn post(&self, url: &str, body: RequestBody) -> ApiResult;
    async fn put(&self, url: &str, body: RequestBody) -> ApiResult;
    async fn delete(&self, url: &str) -> ApiResult;
}
