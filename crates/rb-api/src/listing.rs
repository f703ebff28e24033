//! Ordering and derived counters for post and reply listings.

use rb_core::models::{Post, Reply};
use std::cmp::Ordering;

/// Gives every reply without a floor the next free number, walking in
/// storage order. The counter always moves past any floor already seen,
/// so explicit floors are never reused by later auto-numbered replies.
pub fn assign_floors(replies: &mut [Reply]) {
    let mut counter: u32 = 1;
    for reply in replies.iter_mut() {
        let floor = *reply.floor_number.get_or_insert(counter);
        counter = counter.max(floor).saturating_add(1);
    }
}

/// `sort_order` asc, then floor asc, then oldest first. Stable.
pub fn sort_replies(replies: &mut [Reply]) {
    replies.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.floor_number.unwrap_or(0).cmp(&b.floor_number.unwrap_or(0)))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Pinned first, then `sort_order` asc, then newest first.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(compare_posts);
}

fn compare_posts(a: &Post, b: &Post) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| a.sort_order.cmp(&b.sort_order))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// The manual override when one is set, else the live count.
pub fn replies_count(post: &Post, replies: &[Reply]) -> u64 {
    post.custom_replies_count
        .unwrap_or_else(|| replies.iter().filter(|r| r.post_id == post.id).count() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rb_core::ids::EntityId;

    fn reply(floor: Option<u32>) -> Reply {
        Reply {
            floor_number: floor,
            ..Reply::new(EntityId::from("p"))
        }
    }

    fn floors(replies: &[Reply]) -> Vec<u32> {
        replies.iter().filter_map(|r| r.floor_number).collect()
    }

    #[test]
    fn auto_floors_skip_past_explicit_ones() {
        let mut replies = vec![reply(None), reply(Some(5)), reply(None)];
        assign_floors(&mut replies);
        assert_eq!(floors(&replies), vec![1, 5, 6]);
    }

    #[test]
    fn explicit_floors_are_kept() {
        let mut replies = vec![reply(Some(3)), reply(None), reply(Some(10)), reply(None), reply(None)];
        assign_floors(&mut replies);
        assert_eq!(floors(&replies), vec![3, 4, 10, 11, 12]);
    }

    #[test]
    fn all_unset_floors_count_from_one() {
        let mut replies: Vec<Reply> = (0..4).map(|_| reply(None)).collect();
        assign_floors(&mut replies);
        assert_eq!(floors(&replies), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reply_sort_is_order_then_floor_then_age() {
        let now = Utc::now();
        let mut a = reply(Some(2));
        a.created_at = now;
        let mut b = reply(Some(1));
        b.created_at = now;
        let mut c = reply(Some(1));
        c.sort_order = -1;
        let mut d = reply(Some(2));
        d.created_at = now - Duration::seconds(5);
        a.content = "a".into();
        b.content = "b".into();
        c.content = "c".into();
        d.content = "d".into();

        let mut replies = vec![a, b, c, d];
        sort_replies(&mut replies);
        let order: Vec<&str> = replies.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn post_sort_puts_pinned_first_then_newest() {
        let now = Utc::now();
        let post = |title: &str, pinned: bool, order: i64, age: i64| Post {
            title: title.into(),
            is_pinned: pinned,
            sort_order: order,
            created_at: now - Duration::minutes(age),
            ..Post::default()
        };
        let mut posts = vec![
            post("old", false, 0, 10),
            post("new", false, 0, 1),
            post("pinned", true, 5, 100),
            post("ordered", false, -1, 50),
        ];
        sort_posts(&mut posts);
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["pinned", "ordered", "new", "old"]);
    }

    #[test]
    fn reply_count_prefers_override_including_zero() {
        let mut post = Post {
            id: "p".into(),
            ..Post::default()
        };
        let replies = vec![reply(None), reply(None)];
        assert_eq!(replies_count(&post, &replies), 2);
        post.custom_replies_count = Some(0);
        assert_eq!(replies_count(&post, &replies), 0);
    }
}
