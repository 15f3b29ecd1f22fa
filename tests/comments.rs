mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_empty, post_json, redirect_target, token, unknown_id, TestApp};
use posting_backend::store::Store;
use serde_json::json;

#[tokio::test]
async fn signed_in_users_comment_and_land_on_the_post() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;
    let comment_url = format!("/posts/{}/comment/", post.id);

    let response = app
        .send(post_json(
            &comment_url,
            Some(&token(&user)),
            json!({ "text": "Test comment" }),
        ))
        .await;
    assert_eq!(redirect_target(&response), format!("/posts/{}/", post.id));

    let comments = app.store.list_comments(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "Test comment");
    assert_eq!(comments[0].author_id, user.id);

    let detail = body_json(app.send(get(&format!("/posts/{}/", post.id), None)).await).await;
    assert_eq!(detail["data"]["comments"][0]["id"], comments[0].id.to_string());
    assert_eq!(detail["data"]["comments"][0]["author"]["username"], "test_user");
}

#[tokio::test]
async fn anonymous_comments_are_refused_with_login_redirect() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;
    let comment_url = format!("/posts/{}/comment/", post.id);

    let response = app
        .send(post_json(&comment_url, None, json!({ "text": "Test comment" })))
        .await;

    assert_eq!(
        redirect_target(&response),
        format!("/auth/login/?next=/posts/{}/comment/", post.id)
    );
    assert!(app.store.list_comments(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_comments_are_dropped_silently() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;
    let comment_url = format!("/posts/{}/comment/", post.id);
    let token = token(&user);

    let blank = app
        .send(post_json(&comment_url, Some(&token), json!({ "text": "  " })))
        .await;
    assert_eq!(redirect_target(&blank), format!("/posts/{}/", post.id));

    let missing_body = app.send(post_empty(&comment_url, Some(&token))).await;
    assert_eq!(redirect_target(&missing_body), format!("/posts/{}/", post.id));

    assert!(app.store.list_comments(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn comments_on_unknown_posts_are_not_found() {
    let app = TestApp::new();
    let user = app.user("test_user").await;

    let response = app
        .send(post_json(
            &format!("/posts/{}/comment/", unknown_id()),
            Some(&token(&user)),
            json!({ "text": "Hello?" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_detail_lists_comments_oldest_first() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;
    let comment_url = format!("/posts/{}/comment/", post.id);
    let token = token(&user);

    for text in ["first", "second", "third"] {
        app.send(post_json(&comment_url, Some(&token), json!({ "text": text })))
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let detail = body_json(app.send(get(&format!("/posts/{}/", post.id), None)).await).await;
    let texts: Vec<&str> = detail["data"]["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}
