//! # MockApiGateway
//!
//! Answers the UI's four HTTP verbs locally. Every call waits out the
//! configured latency, is matched against the route table, and ends in
//! either an `ApiResponse` or an `ApiError` envelope. All durable state
//! lives behind `BoardRepo`; this type holds none of its own.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use rb_core::catalog::{self, DEFAULT_RANK, RANK_NAMES, REGIONS};
use rb_core::envelope::{ApiError, ApiResponse, ApiResult, RequestBody};
use rb_core::error::{AppError, Result};
use rb_core::identity::IdentityResolver;
use rb_core::ids::EntityId;
use rb_core::models::{DataStats, Post, PostView, Reply, ReplyView, User, UserProfile, DEFAULT_AVATAR};
use rb_core::requests::{Credentials, NewPost, NewReply, PostPatch, ReplyOrderRequest, ReplyPatch, UserPatch};
use rb_core::roster::HeroRoster;
use rb_core::traits::{ApiClient, AuthProvider, BoardRepo, PasswordCheck};

use crate::config::GatewayConfig;
use crate::listing;
use crate::routes::{split_url, Method, Route};
use crate::upload;

pub struct MockApiGateway {
    repo: Box<dyn BoardRepo>,
    auth: Box<dyn AuthProvider>,
    roster: &'static HeroRoster,
    config: GatewayConfig,
}

impl MockApiGateway {
    pub fn new(repo: Box<dyn BoardRepo>, auth: Box<dyn AuthProvider>, config: GatewayConfig) -> Self {
        Self {
            repo,
            auth,
            roster: HeroRoster::builtin(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // --- Maintenance ---------------------------------------------------------

    pub fn stats(&self) -> DataStats {
        self.repo.stats()
    }

    pub fn clear_posts_data(&self) {
        self.repo.clear_posts_data();
    }

    pub fn clear_all_data(&self) {
        self.repo.clear_all_data();
    }

    pub fn logout(&self) {
        self.repo.end_session();
        info!("session cleared");
    }

    // --- Dispatch ------------------------------------------------------------

    async fn handle(&self, method: Method, url: &str, body: RequestBody) -> ApiResult {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        match self.dispatch(method, url, body) {
            Ok(response) => {
                debug!("{method} {url} -> {}", response.status);
                Ok(response)
            }
            Err(err) => {
                warn!("{method} {url} -> {} ({err})", err.status_code());
                Err(ApiError::from(err))
            }
        }
    }

    fn dispatch(&self, method: Method, url: &str, body: RequestBody) -> Result<ApiResponse> {
        if matches!(method, Method::Put | Method::Delete) {
            self.session_user()?;
        }

        let (path, query) = split_url(url);
        let unknown = || AppError::not_found("route", format!("{method} {path}"));
        let route = Route::parse(path).ok_or_else(unknown)?;

        match (method, route) {
            (Method::Get, Route::CurrentUser) => self.current_user(),
            (Method::Get, Route::Users) => self.list_users(),
            (Method::Get, Route::Posts) => self.list_posts(query.get("category").map(String::as_str)),
            (Method::Get, Route::Post(id)) => self.post_detail(&id),
            (Method::Get, Route::PostReplies(id)) => self.list_replies(&id),
            (Method::Get, Route::PostLike(id)) => self.toggle_like(&id),
            (Method::Get, Route::Categories) => self.category_tree(),
            (Method::Get, Route::AllCategories) => self.all_categories(),
            (Method::Get, Route::Regions) => Ok(ApiResponse::ok(json!(REGIONS))),
            (Method::Get, Route::Ranks) => Ok(ApiResponse::ok(json!(RANK_NAMES))),

            (Method::Post, Route::Register) => self.register(parse(&body)?),
            (Method::Post, Route::Login) => self.login(parse(&body)?),
            (Method::Post, Route::Posts) => self.create_post(parse(&body)?),
            (Method::Post, Route::PostReplies(id)) => self.create_reply(id, parse(&body)?),
            (Method::Post, Route::UploadImage) => self.upload_images(body),

            (Method::Put, Route::CurrentUser) => self.update_user(parse(&body)?),
            (Method::Put, Route::Post(id)) => self.update_post(&id, parse(&body)?),
            (Method::Put, Route::Reply(id)) => self.update_reply(&id, parse(&body)?),
            (Method::Put, Route::ReplyOrder(id)) => self.reorder_replies(&id, parse(&body)?),

            (Method::Delete, Route::Post(id)) => self.delete_post(&id),
            (Method::Delete, Route::Reply(id)) => self.delete_reply(&id),

            _ => Err(unknown()),
        }
    }

    // --- Session -------------------------------------------------------------

    /// The logged-in user's snapshot, or 401.
    fn session_user(&self) -> Result<UserProfile> {
        self.repo
            .current_user()
            .filter(|u| !u.id.is_unassigned())
            .ok_or_else(|| AppError::unauthorized("login required"))
    }

    fn open_session(&self, user: &User) -> Value {
        let token = self.auth.issue_token();
        let profile = UserProfile::from(user);
        self.repo.start_session(&token, &profile);
        json!({ "token": token, "user": profile })
    }

    fn current_user(&self) -> Result<ApiResponse> {
        if self.repo.session_token().is_none() {
            return Err(AppError::unauthorized("no active session"));
        }
        Ok(ApiResponse::ok(to_data(&self.session_user()?)?))
    }

    fn register(&self, creds: Credentials) -> Result<ApiResponse> {
        let username = creds
            .username()
            .ok_or_else(|| AppError::validation("username is required"))?;
        if self.repo.find_user_by_username(username).is_some() {
            return Err(AppError::validation(format!("username {username} is already taken")));
        }
        if self.roster.is_reserved(username) {
            return Err(AppError::validation(format!("username {username} is reserved")));
        }

        let password = creds.password().unwrap_or(self.auth.default_password());
        let user = self.repo.upsert_user(self.fresh_user(username, password));
        info!("registered {} ({})", user.username, user.id);
        Ok(ApiResponse::created(self.open_session(&user)))
    }

    fn login(&self, creds: Credentials) -> Result<ApiResponse> {
        let username = creds
            .username()
            .ok_or_else(|| AppError::validation("username is required"))?;
        let default_password = self.auth.default_password();
        let supplied = creds.supplied_password();

        let (mut user, provisioned) = match self.repo.find_user_by_username(username) {
            Some(user) => (user, false),
            None => match self.roster.by_username(username) {
                Some(hero) => (hero.to_user(default_password), true),
                None => (self.fresh_user(username, default_password), true),
            },
        };
        // Records written without a password carry the configured default.
        if user.password.is_empty() {
            user.password = default_password.to_string();
        }

        let mut dirty = provisioned;
        match self.auth.check_password(&user.password, supplied) {
            PasswordCheck::Matched => {}
            PasswordCheck::MasterKey => {
                warn!("{username} logged in with the default password; resetting theirs");
                user.password = default_password.to_string();
                dirty = true;
            }
            PasswordCheck::Rejected => return Err(AppError::unauthorized("wrong password")),
        }

        if dirty {
            user = self.repo.upsert_user(user);
        }
        if provisioned {
            info!("provisioned {} ({}) on first login", user.username, user.id);
        }
        Ok(ApiResponse::ok(self.open_session(&user)))
    }

    fn fresh_user(&self, username: &str, password: &str) -> User {
        User {
            id: EntityId::default(),
            username: username.to_string(),
            password: password.to_string(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
            rank: DEFAULT_RANK.to_string(),
            title: String::new(),
            identity: String::new(),
        }
    }

    // --- Users ---------------------------------------------------------------

    fn list_users(&self) -> Result<ApiResponse> {
        let mut profiles: Vec<UserProfile> = self.repo.list_users().iter().map(UserProfile::from).collect();
        profiles.extend(self.roster.profiles());
        Ok(ApiResponse::ok(to_data(&profiles)?))
    }

    fn update_user(&self, patch: UserPatch) -> Result<ApiResponse> {
        let session = self.session_user()?;
        let mut user = self
            .repo
            .find_user_by_id(&session.id)
            .ok_or_else(|| AppError::not_found("user", session.id.as_str()))?;

        if let Some(name) = patch.rename_to(&user.username) {
            if self
                .repo
                .find_user_by_username(name)
                .is_some_and(|other| other.id != user.id)
            {
                return Err(AppError::validation(format!("username {name} is already taken")));
            }
            if self.roster.is_reserved(name) {
                return Err(AppError::validation(format!("username {name} is reserved")));
            }
        }

        patch.apply(&mut user);
        let user = self.repo.upsert_user(user);
        let profile = UserProfile::from(&user);
        self.repo.update_current_user(&profile);
        Ok(ApiResponse::ok(to_data(&profile)?))
    }

    // --- Posts ---------------------------------------------------------------

    fn list_posts(&self, category: Option<&str>) -> Result<ApiResponse> {
        let mut posts = self.repo.list_posts();
        if let Some(key) = category.filter(|c| !c.is_empty()) {
            let keys = catalog::category_filter(key);
            posts.retain(|p| keys.contains(&p.category.as_str()));
        }
        listing::sort_posts(&mut posts);

        let users = self.repo.list_users();
        let replies = self.repo.list_replies();
        let resolver = IdentityResolver::new(&users, self.roster);
        let views: Vec<PostView> = posts
            .into_iter()
            .map(|post| {
                let count = listing::replies_count(&post, &replies);
                let author = resolver.resolve(&post);
                PostView::new(post, author, Some(count))
            })
            .collect();
        Ok(ApiResponse::ok(to_data(&views)?))
    }

    fn post_detail(&self, id: &EntityId) -> Result<ApiResponse> {
        let mut post = self.find_post(id)?;
        post.views += 1;
        let post = self.repo.upsert_post(post);
        Ok(ApiResponse::ok(to_data(&self.post_view(post, true))?))
    }

    fn create_post(&self, draft: NewPost) -> Result<ApiResponse> {
        let author = self.session_user()?;
        let post = self.repo.upsert_post(draft.into_post(&author.id));
        debug!("{} posted {} in {}", author.username, post.id, post.category);
        Ok(ApiResponse::created(to_data(&self.post_view(post, false))?))
    }

    fn update_post(&self, id: &EntityId, mut patch: PostPatch) -> Result<ApiResponse> {
        let mut post = self.find_post(id)?;
        {
            let users = self.repo.list_users();
            let resolver = IdentityResolver::new(&users, self.roster);
            patch.promote_selected_username(|user_id| resolver.is_known(user_id));
        }
        patch.apply(&mut post);
        let post = self.repo.upsert_post(post);
        Ok(ApiResponse::ok(to_data(&self.post_view(post, true))?))
    }

    fn delete_post(&self, id: &EntityId) -> Result<ApiResponse> {
        if !self.repo.delete_post(id) {
            return Err(AppError::not_found("post", id.as_str()));
        }
        Ok(success())
    }

    fn toggle_like(&self, id: &EntityId) -> Result<ApiResponse> {
        let user = self.session_user()?;
        let mut post = self.find_post(id)?;
        let liked = self.repo.toggle_like(id, &user.id);
        post.likes = self.repo.count_likes(id) as u64;
        self.repo.upsert_post(post);
        Ok(ApiResponse::ok(json!({ "liked": liked })))
    }

    fn find_post(&self, id: &EntityId) -> Result<Post> {
        self.repo
            .find_post(id)
            .ok_or_else(|| AppError::not_found("post", id.as_str()))
    }

    fn post_view(&self, post: Post, with_count: bool) -> PostView {
        let users = self.repo.list_users();
        let author = IdentityResolver::new(&users, self.roster).resolve(&post);
        let count = with_count.then(|| listing::replies_count(&post, &self.repo.replies_for_post(&post.id)));
        PostView::new(post, author, count)
    }

    // --- Replies -------------------------------------------------------------

    fn list_replies(&self, post_id: &EntityId) -> Result<ApiResponse> {
        let mut replies = self.repo.replies_for_post(post_id);
        listing::assign_floors(&mut replies);
        listing::sort_replies(&mut replies);

        let users = self.repo.list_users();
        let resolver = IdentityResolver::new(&users, self.roster);
        let views: Vec<ReplyView> = replies
            .into_iter()
            .map(|reply| ReplyView {
                author: resolver.resolve(&reply),
                reply,
            })
            .collect();
        Ok(ApiResponse::ok(to_data(&views)?))
    }

    fn create_reply(&self, post_id: EntityId, draft: NewReply) -> Result<ApiResponse> {
        let author = self.session_user()?;
        self.find_post(&post_id)?;
        let reply = self.repo.upsert_reply(draft.into_reply(post_id, &author.id));
        Ok(ApiResponse::created(to_data(&self.reply_view(reply))?))
    }

    fn update_reply(&self, id: &EntityId, patch: ReplyPatch) -> Result<ApiResponse> {
        let mut reply = self
            .repo
            .find_reply(id)
            .ok_or_else(|| AppError::not_found("reply", id.as_str()))?;
        patch.apply(&mut reply);
        let reply = self.repo.upsert_reply(reply);
        Ok(ApiResponse::ok(to_data(&self.reply_view(reply))?))
    }

    /// Ids that are unknown or belong to another post are skipped.
    fn reorder_replies(&self, post_id: &EntityId, request: ReplyOrderRequest) -> Result<ApiResponse> {
        let replies = self.repo.replies_for_post(post_id);
        for order in request.reply_orders {
            if let Some(reply) = replies.iter().find(|r| r.id == order.id) {
                let mut reply = reply.clone();
                reply.sort_order = order.sort_order;
                self.repo.upsert_reply(reply);
            }
        }
        Ok(success())
    }

    fn delete_reply(&self, id: &EntityId) -> Result<ApiResponse> {
        if !self.repo.delete_reply(id) {
            return Err(AppError::not_found("reply", id.as_str()));
        }
        Ok(success())
    }

    fn reply_view(&self, reply: Reply) -> ReplyView {
        let users = self.repo.list_users();
        let author = IdentityResolver::new(&users, self.roster).resolve(&reply);
        ReplyView { reply, author }
    }

    // --- Static data & uploads -----------------------------------------------

    fn category_tree(&self) -> Result<ApiResponse> {
        let mut tree = Map::new();
        for node in catalog::category_tree() {
            tree.insert(node.key.to_string(), to_data(&node)?);
        }
        Ok(ApiResponse::ok(Value::Object(tree)))
    }

    fn all_categories(&self) -> Result<ApiResponse> {
        let mut all = Map::new();
        for category in catalog::categories() {
            all.insert(category.key.to_string(), to_data(category)?);
        }
        Ok(ApiResponse::ok(Value::Object(all)))
    }

    fn upload_images(&self, body: RequestBody) -> Result<ApiResponse> {
        let files = match body {
            RequestBody::Files(files) if !files.is_empty() => files,
            _ => return Err(AppError::validation("no files uploaded")),
        };
        let images = files
            .iter()
            .map(|file| upload::to_data_url(file, self.config.max_upload_bytes))
            .collect::<Result<Vec<_>>>()?;
        Ok(ApiResponse::ok(json!({ "images": images })))
    }
}

#[async_trait]
impl ApiClient for MockApiGateway {
    async fn get(&self, url: &str) -> ApiResult {
        self.handle(Method::Get, url, RequestBody::Empty).await
    }

    async fn post(&self, url: &str, body: RequestBody) -> ApiResult {
        self.handle(Method::Post, url, body).await
    }

    async fn put(&self, url: &str, body: RequestBody) -> ApiResult {
        self.handle(Method::Put, url, body).await
    }

    async fn delete(&self, url: &str) -> ApiResult {
        self.handle(Method::Delete, url, RequestBody::Empty).await
    }
}

fn parse<T: DeserializeOwned>(body: &RequestBody) -> Result<T> {
    Ok(serde_json::from_value(body.json())?)
}

fn to_data<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("encoding response: {e}")))
}

fn success() -> ApiResponse {
    ApiResponse::ok(json!({ "success": true }))
}
