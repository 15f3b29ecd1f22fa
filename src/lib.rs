use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod cache;
pub mod comments;
pub mod config;
pub mod error;
pub mod follows;
pub mod forms;
pub mod groups;
pub mod pagination;
pub mod posts;
pub mod response;
pub mod store;

use cache::PageCache;
use config::settings::Settings;
use store::DynStore;

#[derive(Clone)]
pub struct AppState {
    store: DynStore,
    settings: Settings,
    page_cache: Arc<PageCache>,
}

impl AppState {
    pub fn new(store: DynStore, settings: Settings) -> Self {
        let page_cache = Arc::new(PageCache::new(settings.index_cache_ttl));
        Self {
            store,
            settings,
            page_cache,
        }
    }

    pub fn page_cache(&self) -> &Arc<PageCache> {
        &self.page_cache
    }
}

impl FromRef<AppState> for DynStore {
    fn from_ref(app_state: &AppState) -> DynStore {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

impl FromRef<AppState> for Arc<PageCache> {
    fn from_ref(app_state: &AppState) -> Arc<PageCache> {
        app_state.page_cache.clone()
    }
}

pub fn router(app_state: AppState) -> Router {
    let auth_router = Router::new()
        .route(
            "/login/",
            get(auth::handler::login_page).post(auth::handler::login),
        )
        .route("/signup/", post(auth::handler::signup))
        .route("/me/", get(auth::handler::get_me));

    Router::new()
        .route("/", get(posts::handler::index))
        .route("/group/", post(groups::handler::create_group))
        .route("/group/:slug/", get(groups::handler::group_posts))
        .route("/profile/:username/", get(follows::handler::profile))
        .route(
            "/profile/:username/follow/",
            post(follows::handler::profile_follow),
        )
        .route(
            "/profile/:username/unfollow/",
            post(follows::handler::profile_unfollow),
        )
        .route("/follow/", get(follows::handler::follow_index))
        .route(
            "/create/",
            get(posts::handler::post_create_form).post(posts::handler::post_create),
        )
        .route("/posts/:post_id/", get(posts::handler::post_detail))
        .route(
            "/posts/:post_id/edit/",
            get(posts::handler::post_edit_form).post(posts::handler::post_edit),
        )
        .route("/posts/:post_id/delete/", post(posts::handler::post_delete))
        .route("/posts/:post_id/comment/", post(comments::handler::add_comment))
        .nest("/auth", auth_router)
        .with_state(app_state)
}
