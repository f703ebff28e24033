//! URL matching for the gateway.

use rb_core::ids::EntityId;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// Every path the gateway knows, independent of verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CurrentUser,
    Users,
    Register,
    Login,
    Posts,
    Post(EntityId),
    PostReplies(EntityId),
    PostLike(EntityId),
    ReplyOrder(EntityId),
    Reply(EntityId),
    UploadImage,
    Categories,
    AllCategories,
    Regions,
    Ranks,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let route = match segments.as_slice() {
            ["user"] => Route::CurrentUser,
            ["users"] => Route::Users,
            ["register"] => Route::Register,
            ["login"] => Route::Login,
            ["posts"] => Route::Posts,
            ["posts", id] => Route::Post(id_segment(id)?),
            ["posts", id, "replies"] => Route::PostReplies(id_segment(id)?),
            ["posts", id, "like"] => Route::PostLike(id_segment(id)?),
            ["posts", id, "replies", "order"] => Route::ReplyOrder(id_segment(id)?),
            ["replies", id] => Route::Reply(id_segment(id)?),
            ["upload-image"] => Route::UploadImage,
            ["categories"] => Route::Categories,
            ["categories", "all"] => Route::AllCategories,
            ["regions"] => Route::Regions,
            ["ranks"] => Route::Ranks,
            _ => return None,
        };
        Some(route)
    }
}

fn id_segment(raw: &str) -> Option<EntityId> {
    (!raw.is_empty()).then(|| EntityId::from(raw))
}

/// Splits `url` into its path and decoded query parameters.
pub fn split_url(url: &str) -> (&str, HashMap<String, String>) {
    match url.split_once('?') {
        Some((path, query)) => (
            path,
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        ),
        None => (url, HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_routes() {
        assert_eq!(Route::parse("/posts/42"), Some(Route::Post("42".into())));
        assert_eq!(
            Route::parse("/posts/42/replies/order"),
            Some(Route::ReplyOrder("42".into()))
        );
        assert_eq!(Route::parse("/posts/阿狸/like"), Some(Route::PostLike("阿狸".into())));
        assert_eq!(Route::parse("/categories/all"), Some(Route::AllCategories));
    }

    #[test]
    fn unknown_and_malformed_paths() {
        assert_eq!(Route::parse("/threads"), None);
        assert_eq!(Route::parse("/posts//replies"), None);
        assert_eq!(Route::parse("/posts/1/replies/2"), None);
    }

    #[test]
    fn query_is_decoded() {
        let (path, query) = split_url("/posts?category=plaza%5Fnews&x=a+b");
        assert_eq!(path, "/posts");
        assert_eq!(query.get("category").map(String::as_str), Some("plaza_news"));
        assert_eq!(query.get("x").map(String::as_str), Some("a b"));
    }
}
