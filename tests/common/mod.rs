//! Shared fixtures: an app over the in-memory store, users with tokens,
//! and request/response helpers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, Response, StatusCode},
    Router,
};
use posting_backend::{
    auth::{jwt, NewUser, User},
    cache::PageCache,
    config::settings::Settings,
    groups::{Group, NewGroup},
    posts::{NewPost, Post},
    router,
    store::{DynStore, MemoryStore, Store},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub fn test_settings() -> Settings {
    Settings {
        port: 0,
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://localhost/unused".to_string(),
        database_max_connections: 1,
        jwt_secret: JWT_SECRET.to_string(),
        index_cache_ttl: Duration::from_secs(60),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: DynStore,
    pub cache: Arc<PageCache>,
}

impl TestApp {
    pub fn new() -> Self {
        let store: DynStore = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), test_settings());
        let cache = state.page_cache().clone();

        Self {
            router: router(state),
            store,
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn group(&self, slug: &str, title: &str) -> Group {
        self.store
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: "Test description".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.store
            .create_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                group_id: group.map(|g| g.id),
                image: None,
            })
            .await
            .unwrap()
    }
}

pub fn token(user: &User) -> String {
    jwt::create_token(user.id, JWT_SECRET).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_empty(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Asserts a redirect and returns its target.
pub fn redirect_target(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

pub fn page_len(context: &Value) -> usize {
    context["data"]["page_obj"]["items"].as_array().unwrap().len()
}

pub fn unknown_id() -> String {
    Uuid::new_v4().to_string()
}
