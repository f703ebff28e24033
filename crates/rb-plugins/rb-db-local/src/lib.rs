//! # rb-db-local
//!
//! `BoardRepo` over any `KeyValueStore`: each entity collection is one JSON
//! array under its own key, read and rewritten whole on every change.

mod keyed;

pub use keyed::{KeyedStore, StorageKey};

use chrono::Utc;
use log::{debug, info};
use rb_core::ids::EntityId;
use rb_core::models::{DataStats, Like, Post, Reply, User, UserProfile};
use rb_core::traits::{BoardRepo, KeyValueStore};
use std::sync::Arc;

pub struct LocalBoardRepo {
    store: KeyedStore,
}

impl LocalBoardRepo {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: KeyedStore::new(backend),
        }
    }

    fn save_posts(&self, posts: &[Post]) -> bool {
        self.store.write_list(StorageKey::Posts, posts)
    }

    fn save_replies(&self, replies: &[Reply]) -> bool {
        self.store.write_list(StorageKey::Replies, replies)
    }

    fn save_likes(&self, likes: &[Like]) -> bool {
        self.store.write_list(StorageKey::Likes, likes)
    }
}

impl BoardRepo for LocalBoardRepo {
    fn list_users(&self) -> Vec<User> {
        self.store.read_list(StorageKey::Users)
    }

    fn find_user_by_id(&self, id: &EntityId) -> Option<User> {
        self.list_users().into_iter().find(|u| u.id == *id)
    }

    fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.list_users().into_iter().find(|u| u.username == username)
    }

    fn upsert_user(&self, mut user: User) -> User {
        let mut users = self.list_users();
        match users.iter().position(|u| u.id == user.id) {
            Some(idx) if !user.id.is_unassigned() => users[idx] = user.clone(),
            _ => {
                if user.id.is_unassigned() {
                    user.id = EntityId::generate();
                }
                debug!("new user {} ({})", user.id, user.username);
                users.push(user.clone());
            }
        }
        self.store.write_list(StorageKey::Users, &users);
        user
    }

    fn list_posts(&self) -> Vec<Post> {
        self.store.read_list(StorageKey::Posts)
    }

    fn find_post(&self, id: &EntityId) -> Option<Post> {
        self.list_posts().into_iter().find(|p| p.id == *id)
    }

    fn upsert_post(&self, mut post: Post) -> Post {
        let mut posts = self.list_posts();
        let now = Utc::now();
        let existing = if post.id.is_unassigned() {
            None
        } else {
            posts.iter().position(|p| p.id == post.id)
        };

        match existing {
            Some(idx) => {
                post.updated_at = now;
                posts[idx] = post.clone();
            }
            None => {
                post.id = EntityId::generate();
                post.created_at = now;
                post.updated_at = now;
                post.views = 0;
                post.likes = 0;
                post.sort_order = 0;
                post.is_pinned = false;
                debug!("new post {} in {}", post.id, post.category);
                posts.push(post.clone());
            }
        }
        self.save_posts(&posts);
        post
    }

    fn delete_post(&self, id: &EntityId) -> bool {
        let mut posts = self.list_posts();
        let before = posts.len();
        posts.retain(|p| p.id != *id);
        if posts.len() == before {
            return false;
        }
        self.save_posts(&posts);

        let mut replies = self.list_replies();
        let replies_before = replies.len();
        replies.retain(|r| r.post_id != *id);
        if replies.len() != replies_before {
            self.save_replies(&replies);
        }
        debug!("deleted post {id} and {} replies", replies_before - replies.len());
        true
    }

    fn list_replies(&self) -> Vec<Reply> {
        self.store.read_list(StorageKey::Replies)
    }

    fn replies_for_post(&self, post_id: &EntityId) -> Vec<Reply> {
        self.list_replies()
            .into_iter()
            .filter(|r| r.post_id == *post_id)
            .collect()
    }

    fn find_reply(&self, id: &EntityId) -> Option<Reply> {
        self.list_replies().into_iter().find(|r| r.id == *id)
    }

    fn upsert_reply(&self, mut reply: Reply) -> Reply {
        let mut replies = self.list_replies();
        let now = Utc::now();
        let existing = if reply.id.is_unassigned() {
            None
        } else {
            replies.iter().position(|r| r.id == reply.id)
        };

        match existing {
            Some(idx) => {
                reply.updated_at = Some(now);
                replies[idx] = reply.clone();
            }
            None => {
                reply.id = EntityId::generate();
                reply.created_at = now;
                reply.likes = 0;
                reply.sort_order = 0;
                replies.push(reply.clone());
            }
        }
        self.save_replies(&replies);
        reply
    }

    fn delete_reply(&self, id: &EntityId) -> bool {
        let mut replies = self.list_replies();
        let before = replies.len();
        replies.retain(|r| r.id != *id);
        if replies.len() == before {
            return false;
        }
        self.save_replies(&replies)
    }

    fn list_likes(&self) -> Vec<Like> {
        self.store.read_list(StorageKey::Likes)
    }

    fn toggle_like(&self, post_id: &EntityId, user_id: &EntityId) -> bool {
        if self.delete_like(post_id, user_id) {
            return false;
        }
        let mut likes = self.list_likes();
        likes.push(Like {
            post_id: post_id.clone(),
            user_id: user_id.clone(),
            created_at: Utc::now(),
        });
        self.save_likes(&likes);
        true
    }

    fn count_likes(&self, post_id: &EntityId) -> usize {
        self.list_likes()
            .iter()
            .filter(|l| l.post_id == *post_id)
            .count()
    }

    fn delete_like(&self, post_id: &EntityId, user_id: &EntityId) -> bool {
        let mut likes = self.list_likes();
        let before = likes.len();
        likes.retain(|l| !(l.post_id == *post_id && l.user_id == *user_id));
        if likes.len() == before {
            return false;
        }
        self.save_likes(&likes);
        true
    }

    fn session_token(&self) -> Option<String> {
        self.store
            .read::<String>(StorageKey::Token)
            .filter(|t| !t.is_empty())
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.store.read(StorageKey::CurrentUser)
    }

    fn start_session(&self, token: &str, user: &UserProfile) -> bool {
        self.store.write(StorageKey::Token, token) && self.store.write(StorageKey::CurrentUser, user)
    }

    fn update_current_user(&self, user: &UserProfile) -> bool {
        self.store.write(StorageKey::CurrentUser, user)
    }

    fn end_session(&self) {
        self.store.remove(StorageKey::Token);
        self.store.remove(StorageKey::CurrentUser);
    }

    fn stats(&self) -> DataStats {
        DataStats {
            users: self.list_users().len(),
            posts: self.list_posts().len(),
            replies: self.list_replies().len(),
            likes: self.list_likes().len(),
        }
    }

    fn clear_posts_data(&self) {
        for key in [StorageKey::Posts, StorageKey::Replies, StorageKey::Likes] {
            self.store.remove(key);
        }
        self.end_session();
        info!("cleared posts, replies and likes");
    }

    fn clear_all_data(&self) {
        for key in StorageKey::ALL {
            self.store.remove(key);
        }
        info!("cleared all board data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_storage_local::MemoryStore;

    fn repo() -> LocalBoardRepo {
        LocalBoardRepo::new(Arc::new(MemoryStore::new()))
    }

    fn post_in(category: &str) -> Post {
        Post {
            category: category.into(),
            title: "t".into(),
            ..Post::default()
        }
    }

    #[test]
    fn insert_assigns_id_and_zeroes_counters() {
        let repo = repo();
        let draft = Post {
            views: 50,
            likes: 3,
            is_pinned: true,
            sort_order: 9,
            ..post_in("plaza")
        };
        let stored = repo.upsert_post(draft);
        assert!(!stored.id.is_unassigned());
        assert_eq!((stored.views, stored.likes, stored.sort_order), (0, 0, 0));
        assert!(!stored.is_pinned);
        assert_eq!(repo.find_post(&stored.id), Some(stored));
    }

    #[test]
    fn upsert_with_same_record_is_idempotent() {
        let repo = repo();
        let mut stored = repo.upsert_post(post_in("plaza"));
        stored.title = "edited".into();
        repo.upsert_post(stored.clone());
        repo.upsert_post(stored.clone());
        let posts = repo.list_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "edited");
        assert!(posts[0].updated_at >= stored.created_at);
    }

    #[test]
    fn unknown_id_is_treated_as_insert() {
        let repo = repo();
        let draft = Post {
            id: "made-up".into(),
            ..post_in("plaza")
        };
        let stored = repo.upsert_post(draft);
        assert_ne!(stored.id, "made-up");
        assert_eq!(repo.list_posts().len(), 1);
    }

    #[test]
    fn deleting_a_post_cascades_to_its_replies_only() {
        let repo = repo();
        let doomed = repo.upsert_post(post_in("plaza"));
        let kept = repo.upsert_post(post_in("gossip"));
        for _ in 0..3 {
            repo.upsert_reply(Reply::new(doomed.id.clone()));
        }
        repo.upsert_reply(Reply::new(kept.id.clone()));

        assert!(repo.delete_post(&doomed.id));
        assert!(repo.replies_for_post(&doomed.id).is_empty());
        assert_eq!(repo.replies_for_post(&kept.id).len(), 1);
        assert!(!repo.delete_post(&doomed.id));
    }

    #[test]
    fn reply_update_keeps_position_and_stamps_updated_at() {
        let repo = repo();
        let post = repo.upsert_post(post_in("plaza"));
        let first = repo.upsert_reply(Reply::new(post.id.clone()));
        let second = repo.upsert_reply(Reply::new(post.id.clone()));
        let mut edited = first.clone();
        edited.content = "changed".into();
        let saved = repo.upsert_reply(edited);
        assert!(saved.updated_at.is_some());
        let ids: Vec<_> = repo.replies_for_post(&post.id).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn toggling_a_like_twice_restores_state() {
        let repo = repo();
        let post_id = EntityId::from("p");
        let user_id = EntityId::from("u");
        assert!(repo.toggle_like(&post_id, &user_id));
        assert_eq!(repo.count_likes(&post_id), 1);
        assert!(!repo.toggle_like(&post_id, &user_id));
        assert_eq!(repo.count_likes(&post_id), 0);
    }

    #[test]
    fn users_are_found_by_exact_username() {
        let repo = repo();
        let user = repo.upsert_user(User {
            id: EntityId::default(),
            username: "Zephyr".into(),
            password: "1234567".into(),
            avatar: None,
            rank: String::new(),
            title: String::new(),
            identity: String::new(),
        });
        assert!(repo.find_user_by_username("Zephyr").is_some());
        assert!(repo.find_user_by_username("zephyr").is_none());
        assert_eq!(repo.find_user_by_id(&user.id).map(|u| u.username), Some("Zephyr".into()));
    }

    #[test]
    fn numeric_ids_in_storage_match_string_lookups() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_item(
                StorageKey::Users.as_str(),
                r#"[{"id": 1700000000000, "username": "old", "password": "x"}]"#,
            )
            .unwrap();
        let repo = LocalBoardRepo::new(backend);
        assert!(repo.find_user_by_id(&"1700000000000".into()).is_some());
    }

    #[test]
    fn clear_posts_data_keeps_accounts() {
        let repo = repo();
        let profile = UserProfile {
            id: "1".into(),
            username: "Zephyr".into(),
            avatar: None,
            rank: String::new(),
            title: String::new(),
            identity: String::new(),
        };
        repo.upsert_user(User {
            id: "1".into(),
            username: "Zephyr".into(),
            password: "1234567".into(),
            avatar: None,
            rank: String::new(),
            title: String::new(),
            identity: String::new(),
        });
        let post = repo.upsert_post(post_in("plaza"));
        repo.upsert_reply(Reply::new(post.id.clone()));
        repo.toggle_like(&post.id, &profile.id);
        repo.start_session("tok", &profile);

        repo.clear_posts_data();
        assert_eq!(repo.stats(), DataStats { users: 1, posts: 0, replies: 0, likes: 0 });
        assert_eq!(repo.session_token(), None);

        repo.clear_all_data();
        assert_eq!(repo.stats(), DataStats::default());
    }

    #[test]
    fn loosely_typed_records_survive_a_create() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set_item(
                StorageKey::Posts.as_str(),
                r#"[{"id": "a", "title": "kept", "views": 3},
                    {"id": "b", "title": "nulls", "views": null, "likes": null, "content": null},
                    {"id": "c", "title": "odd", "sort_order": "top"}]"#,
            )
            .unwrap();
        let repo = LocalBoardRepo::new(backend.clone());

        let titles = |repo: &LocalBoardRepo| -> Vec<String> {
            repo.list_posts().into_iter().map(|p| p.title).collect()
        };
        assert_eq!(titles(&repo), vec!["kept", "nulls"]);
        assert_eq!(repo.find_post(&"b".into()).map(|p| p.views), Some(0));

        repo.upsert_post(Post {
            title: "new".into(),
            ..Post::default()
        });
        assert_eq!(titles(&repo), vec!["kept", "nulls", "new"]);

        let raw: serde_json::Value =
            serde_json::from_str(&backend.get_item(StorageKey::Posts.as_str()).unwrap().unwrap()).unwrap();
        let stored = raw.as_array().unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.iter().any(|p| p["id"] == "c" && p["sort_order"] == "top"));
    }
}
