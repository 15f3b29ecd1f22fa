mod common;

use axum::http::StatusCode;
use common::{body_json, get, page_len, post_empty, post_json, redirect_target, token, TestApp};
use posting_backend::store::{PostFilter, Store};
use serde_json::json;

#[tokio::test]
async fn creating_a_post_redirects_to_the_author_profile() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let group = app.group("test_group_slug", "Test group").await;
    let before = app.store.count_posts(PostFilter::All).await.unwrap();

    let response = app
        .send(post_json(
            "/create/",
            Some(&token(&user)),
            json!({ "text": "Added post", "group": group.id, "image": "posts/small.gif" }),
        ))
        .await;

    assert_eq!(redirect_target(&response), "/profile/test_user/");
    assert_eq!(
        app.store.count_posts(PostFilter::All).await.unwrap(),
        before + 1
    );

    let rows = app.store.list_posts(PostFilter::All, 1, 0).await.unwrap();
    let post = &rows[0];
    assert_eq!(post.text, "Added post");
    assert_eq!(post.group_id, Some(group.id));
    assert_eq!(post.author_id, user.id);
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
}

#[tokio::test]
async fn blank_posts_re_render_the_form_with_errors() {
    let app = TestApp::new();
    let user = app.user("test_user").await;

    let response = app
        .send(post_json("/create/", Some(&token(&user)), json!({ "text": "   " })))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_edit"], false);
    assert!(body["data"]["errors"]["text"].is_array());
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 0);
}

#[tokio::test]
async fn posts_cannot_name_a_missing_group() {
    let app = TestApp::new();
    let user = app.user("test_user").await;

    let response = app
        .send(post_json(
            "/create/",
            Some(&token(&user)),
            json!({ "text": "Fine text", "group": uuid::Uuid::new_v4() }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["errors"]["group"].is_array());
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_group_choices_are_field_errors() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;
    let token = token(&user);

    let created = app
        .send(post_json(
            "/create/",
            Some(&token),
            json!({ "text": "Fine text", "group": "not-a-uuid" }),
        ))
        .await;

    assert_eq!(created.status(), StatusCode::OK);
    let body = body_json(created).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["errors"]["group"].is_array());
    assert_eq!(body["data"]["form"]["group"], "not-a-uuid");
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 1);

    let edited = app
        .send(post_json(
            &format!("/posts/{}/edit/", post.id),
            Some(&token),
            json!({ "text": "Edited post", "group": "not-a-uuid" }),
        ))
        .await;

    assert_eq!(edited.status(), StatusCode::OK);
    let body = body_json(edited).await;
    assert_eq!(body["data"]["is_edit"], true);
    assert!(body["data"]["errors"]["group"].is_array());
    let stored = app.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Test post");
}

#[tokio::test]
async fn an_empty_group_choice_means_no_group() {
    let app = TestApp::new();
    let user = app.user("test_user").await;

    let response = app
        .send(post_json(
            "/create/",
            Some(&token(&user)),
            json!({ "text": "Ungrouped", "group": "" }),
        ))
        .await;

    assert_eq!(redirect_target(&response), "/profile/test_user/");
    let rows = app.store.list_posts(PostFilter::All, 1, 0).await.unwrap();
    assert_eq!(rows[0].group_id, None);
}

#[tokio::test]
async fn create_form_offers_the_group_choices() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    app.group("b", "Beta").await;
    app.group("a", "Alpha").await;

    let body = body_json(app.send(get("/create/", Some(&token(&user)))).await).await;

    assert_eq!(body["data"]["is_edit"], false);
    assert_eq!(body["data"]["form"]["text"], "");
    let titles: Vec<&str> = body["data"]["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn authors_can_edit_their_posts() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let group = app.group("test_group_slug", "Test group").await;
    let group_2 = app.group("test_group_slug_2", "Test group 2").await;
    let post = app.post(&user, "Test post", Some(&group)).await;
    let token = token(&user);

    let form = body_json(
        app.send(get(&format!("/posts/{}/edit/", post.id), Some(&token)))
            .await,
    )
    .await;
    assert_eq!(form["data"]["is_edit"], true);
    assert_eq!(form["data"]["form"]["text"], "Test post");

    let response = app
        .send(post_json(
            &format!("/posts/{}/edit/", post.id),
            Some(&token),
            json!({ "text": "Edited post", "group": group_2.id }),
        ))
        .await;

    assert_eq!(redirect_target(&response), format!("/posts/{}/", post.id));
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 1);

    let stored = app.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Edited post");
    assert_eq!(stored.group_id, Some(group_2.id));
}

#[tokio::test]
async fn invalid_edits_re_render_without_saving() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let post = app.post(&user, "Test post", None).await;

    let response = app
        .send(post_json(
            &format!("/posts/{}/edit/", post.id),
            Some(&token(&user)),
            json!({ "text": "" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_edit"], true);
    assert!(body["data"]["errors"]["text"].is_array());

    let stored = app.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Test post");
}

#[tokio::test]
async fn strangers_are_deflected_from_editing() {
    let app = TestApp::new();
    let author = app.user("author").await;
    let stranger = app.user("stranger").await;
    let post = app.post(&author, "Original", None).await;
    let edit_url = format!("/posts/{}/edit/", post.id);
    let detail_url = format!("/posts/{}/", post.id);

    let response = app.send(get(&edit_url, Some(&token(&stranger)))).await;
    assert_eq!(redirect_target(&response), detail_url);

    let response = app
        .send(post_json(
            &edit_url,
            Some(&token(&stranger)),
            json!({ "text": "Hijacked" }),
        ))
        .await;
    assert_eq!(redirect_target(&response), detail_url);

    let stored = app.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Original");
}

#[tokio::test]
async fn only_authors_delete_posts() {
    let app = TestApp::new();
    let author = app.user("author").await;
    let stranger = app.user("stranger").await;
    let post = app.post(&author, "Short lived", None).await;
    let delete_url = format!("/posts/{}/delete/", post.id);

    let response = app.send(post_empty(&delete_url, Some(&token(&stranger)))).await;
    assert_eq!(redirect_target(&response), format!("/posts/{}/", post.id));
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 1);

    let response = app.send(post_empty(&delete_url, Some(&token(&author)))).await;
    assert_eq!(redirect_target(&response), "/profile/author/");
    assert_eq!(app.store.count_posts(PostFilter::All).await.unwrap(), 0);

    let response = app.send(post_empty(&delete_url, Some(&token(&author)))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_carry_the_expected_context() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let group = app.group("test_group_slug", "Test group").await;
    app.group("test_group_slug_2", "Test group 2").await;
    let post = app.post(&user, "Test post", Some(&group)).await;

    let index = body_json(app.send(get("/", None)).await).await;
    assert_eq!(index["data"]["title"], "Latest updates on the site");
    assert_eq!(index["data"]["index"], true);
    let first = &index["data"]["page_obj"]["items"][0];
    assert_eq!(first["id"], post.id.to_string());
    assert_eq!(first["author"]["username"], "test_user");
    assert_eq!(first["group"]["slug"], "test_group_slug");

    let group_page = body_json(app.send(get("/group/test_group_slug/", None)).await).await;
    assert_eq!(
        group_page["data"]["title"],
        "Posts of the \"Test group\" community"
    );
    assert_eq!(group_page["data"]["group"]["slug"], "test_group_slug");
    assert_eq!(page_len(&group_page), 1);

    let empty_group = body_json(app.send(get("/group/test_group_slug_2/", None)).await).await;
    assert_eq!(page_len(&empty_group), 0);

    let detail = body_json(app.send(get(&format!("/posts/{}/", post.id), None)).await).await;
    assert_eq!(detail["data"]["post"]["text"], "Test post");
    assert_eq!(detail["data"]["author_posts_count"], 1);
    assert_eq!(detail["data"]["form"]["text"], "");
}

#[tokio::test]
async fn paginates_thirteen_posts_as_ten_and_three() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let group = app.group("test_group_slug", "Test group").await;
    for i in 0..13 {
        app.post(&user, &format!("Test post {i}"), Some(&group)).await;
    }

    for base in ["/", "/group/test_group_slug/", "/profile/test_user/"] {
        let first = body_json(app.send(get(base, None)).await).await;
        assert_eq!(page_len(&first), 10, "{base}");
        assert_eq!(first["data"]["page_obj"]["num_pages"], 2);

        let second = body_json(app.send(get(&format!("{base}?page=2"), None)).await).await;
        assert_eq!(page_len(&second), 3, "{base}?page=2");

        let beyond = body_json(app.send(get(&format!("{base}?page=99"), None)).await).await;
        assert_eq!(page_len(&beyond), 3, "{base}?page=99");
        assert_eq!(beyond["data"]["page_obj"]["number"], 2);

        let garbage = body_json(app.send(get(&format!("{base}?page=abc"), None)).await).await;
        assert_eq!(page_len(&garbage), 10, "{base}?page=abc");
    }
}

#[tokio::test]
async fn signed_in_users_create_groups() {
    let app = TestApp::new();
    let user = app.user("test_user").await;
    let token = token(&user);

    let response = app
        .send(post_json(
            "/group/",
            Some(&token),
            json!({ "title": "Rust Lovers", "description": "All about Rust" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["slug"], "rust-lovers");

    let response = app.send(get("/group/rust-lovers/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let duplicate = app
        .send(post_json(
            "/group/",
            Some(&token),
            json!({ "title": "Other", "slug": "rust-lovers" }),
        ))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}
