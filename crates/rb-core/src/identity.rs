//! # IdentityResolver
//!
//! Decides who a post or reply is displayed as. Every gateway response that
//! carries a post or reply goes through [`IdentityResolver::resolve`].
//!
//! Priority, first match wins:
//! 1. anonymous flag: placeholder identity, record overrides discarded
//! 2. non-empty custom username: hero roster supplies avatar/rank/title
//! 3. linked user id: stored users first, then the hero roster
//! 4. nothing: unknown-user defaults

use crate::catalog::DEFAULT_RANK;
use crate::ids::EntityId;
use crate::models::{
    Identity, Post, Reply, User, ANONYMOUS_USERNAME, DEFAULT_AVATAR, UNKNOWN_USERNAME,
};
use crate::roster::{Hero, HeroRoster};

/// Record-level display overrides an editor may set on a post or reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides<'a> {
    pub rank: Option<&'a str>,
    pub title: Option<&'a str>,
    pub identity: Option<&'a str>,
}

/// Anything displayed with an author line.
pub trait Attributed {
    fn is_anonymous(&self) -> bool;
    fn custom_username(&self) -> Option<&str>;
    fn user_id(&self) -> Option<&EntityId>;
    fn overrides(&self) -> Overrides<'_>;
}

impl Attributed for Post {
    fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    fn custom_username(&self) -> Option<&str> {
        self.custom_username.as_deref()
    }

    fn user_id(&self) -> Option<&EntityId> {
        self.user_id.as_ref()
    }

    fn overrides(&self) -> Overrides<'_> {
        Overrides {
            rank: self.user_rank.as_deref(),
            title: self.user_title.as_deref(),
            identity: self.user_identity.as_deref(),
        }
    }
}

impl Attributed for Reply {
    fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    fn custom_username(&self) -> Option<&str> {
        self.custom_username.as_deref()
    }

    fn user_id(&self) -> Option<&EntityId> {
        self.user_id.as_ref()
    }

    fn overrides(&self) -> Overrides<'_> {
        Overrides {
            rank: self.user_rank.as_deref(),
            title: self.user_title.as_deref(),
            identity: self.user_identity.as_deref(),
        }
    }
}

/// Profile fields borrowed from whichever source matched.
struct Source<'a> {
    username: &'a str,
    avatar: Option<&'a str>,
    rank: &'a str,
    title: &'a str,
    identity: &'a str,
}

impl<'a> From<&'a User> for Source<'a> {
    fn from(u: &'a User) -> Self {
        Source {
            username: &u.username,
            avatar: u.avatar.as_deref(),
            rank: &u.rank,
            title: &u.title,
            identity: &u.identity,
        }
    }
}

impl From<&'static Hero> for Source<'static> {
    fn from(h: &'static Hero) -> Self {
        Source {
            username: h.username,
            avatar: Some(h.avatar),
            rank: h.rank,
            title: h.title,
            identity: h.identity,
        }
    }
}

/// Empty strings count as unset, the same as `None`.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn first_of<'a>(candidates: [Option<&'a str>; 2], fallback: &'a str) -> String {
    candidates
        .into_iter()
        .find_map(present)
        .unwrap_or(fallback)
        .to_string()
}

pub struct IdentityResolver<'a> {
    users: &'a [User],
    roster: &'a HeroRoster,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(users: &'a [User], roster: &'a HeroRoster) -> Self {
        Self { users, roster }
    }

    /// Stored users win over heroes sharing the same id.
    fn find_user(&self, id: &EntityId) -> Option<Source<'a>> {
        self.users
            .iter()
            .find(|u| u.id == *id)
            .map(Source::from)
            .or_else(|| self.roster.by_id(id).map(Source::from))
    }

    /// True when `id` names a stored user or a hero.
    pub fn is_known(&self, id: &EntityId) -> bool {
        self.find_user(id).is_some()
    }

    pub fn resolve(&self, subject: &impl Attributed) -> Identity {
        if subject.is_anonymous() {
            return Identity {
                username: ANONYMOUS_USERNAME.to_string(),
                avatar: DEFAULT_AVATAR.to_string(),
                rank: DEFAULT_RANK.to_string(),
                title: String::new(),
                identity: String::new(),
            };
        }

        let overrides = subject.overrides();

        if let Some(name) = present(subject.custom_username()) {
            let hero = self.roster.by_username(name);
            return Identity {
                username: name.to_string(),
                avatar: hero.map_or(DEFAULT_AVATAR, |h| h.avatar).to_string(),
                rank: first_of([overrides.rank, hero.map(|h| h.rank)], DEFAULT_RANK),
                title: first_of([overrides.title, hero.map(|h| h.title)], ""),
                identity: first_of([overrides.identity, hero.map(|h| h.identity)], ""),
            };
        }

        if let Some(id) = subject.user_id().filter(|id| !id.is_unassigned()) {
            let source = self.find_user(id);
            let source = source.as_ref();
            return Identity {
                username: first_of([source.map(|s| s.username), None], UNKNOWN_USERNAME),
                avatar: first_of([source.and_then(|s| s.avatar), None], DEFAULT_AVATAR),
                rank: first_of([overrides.rank, source.map(|s| s.rank)], DEFAULT_RANK),
                title: first_of([overrides.title, source.map(|s| s.title)], ""),
                identity: first_of([overrides.identity, source.map(|s| s.identity)], ""),
            };
        }

        Identity {
            username: UNKNOWN_USERNAME.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            rank: DEFAULT_RANK.to_string(),
            title: String::new(),
            identity: String::new(),
        }
    }
}
