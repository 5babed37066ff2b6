mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{build_app, get_request, json_request, multipart_request, png, send, sign_up_and_login, Part, TestApp};

fn image_ids(cut: &Value) -> Vec<String> {
    cut["images"]
        .as_array()
        .map(|imgs| imgs.iter().filter_map(|i| i["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

async fn create_fade(app: &TestApp, token: &str) -> anyhow::Result<Value> {
    let parts = vec![
        Part::Text("description", "Fade"),
        Part::Text("price", "15.00"),
        Part::Text("minutes", "20"),
        Part::File("images", "front.png", png()),
        Part::File("images", "side.png", png()),
    ];
    let (status, cut) = send(app, multipart_request("POST", "/haircut", Some(token), parts)?).await?;
    assert_eq!(status, StatusCode::CREATED, "{cut}");
    Ok(cut)
}

#[tokio::test]
async fn create_with_images_then_fetch_publicly() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "ana").await?;
    let cut = create_fade(&app, &token).await?;
    assert_eq!(cut["price"], "15.00");
    assert_eq!(cut["minutes"], 20);
    assert_eq!(image_ids(&cut).len(), 2);
    assert_eq!(cut["images"][0]["default"], true);

    let uri = format!("/haircut/{}", cut["id"].as_str().unwrap_or_default());
    let (status, fetched) = send(&app, get_request(&uri, None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(image_ids(&fetched).len(), 2);
    let urls = fetched["images_display"].as_array().cloned().unwrap_or_default();
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().all(|u| u.as_str().unwrap_or_default().starts_with("/media/img/haircut/")));
    assert_eq!(app.store.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn update_replaces_or_keeps_images() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "bruno").await?;
    let cut = create_fade(&app, &token).await?;
    let originals = image_ids(&cut);
    let uri = format!("/haircut/{}", cut["id"].as_str().unwrap_or_default());

    // no image set: rows untouched
    let patch = json!({"minutes": 25});
    let (status, updated) = send(&app, json_request("PATCH", &uri, Some(&token), &patch)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["minutes"], 25);
    assert_eq!(updated["description"], "Fade");
    assert_eq!(image_ids(&updated), originals);

    // one new image replaces both
    let parts = vec![Part::File("images", "new.png", png())];
    let (status, replaced) = send(&app, multipart_request("PUT", &uri, Some(&token), parts)?).await?;
    assert_eq!(status, StatusCode::OK);
    let now = image_ids(&replaced);
    assert_eq!(now.len(), 1);
    assert!(!originals.contains(&now[0]));
    assert_eq!(app.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_image_rolls_back_the_create() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "carla").await?;
    let parts = vec![
        Part::Text("description", "Buzz"),
        Part::Text("price", "9.50"),
        Part::File("images", "ok.png", png()),
        Part::File("images", "notes.txt", b"not an image".to_vec()),
    ];
    let (status, err) = send(&app, multipart_request("POST", "/haircut", Some(&token), parts)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());

    let (status, all) = send(&app, get_request("/haircut?not_paginator=1", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([]));
    assert!(app.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn duplicate_description_is_a_validation_error() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "dario").await?;
    create_fade(&app, &token).await?;
    let body = json!({"description": "Fade", "price": 12});
    let (status, err) = send(&app, json_request("POST", "/haircut", Some(&token), &body)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap_or_default().contains("already exists"));
    Ok(())
}

#[tokio::test]
async fn writes_need_a_token_reads_do_not() -> anyhow::Result<()> {
    let app = build_app().await?;
    let body = json!({"description": "Fade", "price": 15});
    let (status, _) = send(&app, json_request("POST", "/haircut", None, &body)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, page) = send(&app, get_request("/haircut", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);
    assert_eq!(page["page"], 1);
    Ok(())
}

#[tokio::test]
async fn list_search_and_paging() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "elena").await?;
    for (description, minutes) in [("Classic Fade", 20), ("Beard Trim", 15), ("Kids Cut", 30)] {
        let body = json!({"description": description, "price": "10.00", "minutes": minutes});
        let (status, _) = send(&app, json_request("POST", "/haircut", Some(&token), &body)?).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, page) = send(&app, get_request("/haircut?page=2&per_page=2", None)?).await?;
    assert_eq!(page["count"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["results"].as_array().map(Vec::len), Some(1));

    let (_, found) = send(&app, get_request("/haircut?search=fade,classic&not_paginator=true", None)?).await?;
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["description"], "Classic Fade");

    let (_, by_minutes) = send(&app, get_request("/haircut?search=15&not_paginator=true", None)?).await?;
    assert_eq!(by_minutes[0]["description"], "Beard Trim");
    Ok(())
}

#[tokio::test]
async fn delete_removes_haircut_and_images() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "fabio").await?;
    let cut = create_fade(&app, &token).await?;
    let uri = format!("/haircut/{}", cut["id"].as_str().unwrap_or_default());

    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&token), &json!({}))?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, err) = send(&app, get_request(&uri, None)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err["error"].is_string());
    assert!(app.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, get_request("/health", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}
