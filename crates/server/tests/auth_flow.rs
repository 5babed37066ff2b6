mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{build_app, get_request, json_request, send, sign_up_and_login, PASSWORD};

#[tokio::test]
async fn sign_up_normalizes_email_and_hides_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    let body = json!({"username": "x", "email": "X@Y.com", "password": PASSWORD, "is_superuser": true});
    let (status, user) = send(&app, json_request("POST", "/user", None, &body)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "x@y.com");
    assert_eq!(user["is_superuser"], false);
    assert_eq!(user["status_display"], "active");
    assert!(user.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn sign_up_rejects_weak_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    let body = json!({"username": "ana", "email": "ana@example.com", "password": "12345678"});
    let (status, err) = send(&app, json_request("POST", "/user", None, &body)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages = err["error"].as_array().cloned().unwrap_or_else(|| vec![err["error"].clone()]);
    assert!(messages.iter().any(|m| m.as_str().unwrap_or_default().contains("too common")));
    Ok(())
}

#[tokio::test]
async fn token_payload_carries_claims() -> anyhow::Result<()> {
    let app = build_app().await?;
    sign_up_and_login(&app, "bruno").await?;

    // the email address works as a login name too
    let login = json!({"username": "bruno@example.com", "password": PASSWORD});
    let (status, claims) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(claims["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(claims["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(claims["danger"].is_null());
    assert_eq!(claims["warn"], json!([]));
    assert_eq!(claims["is_barber"], false);

    let bad = json!({"username": "bruno", "password": "Wr0ng#Pass"});
    let (status, _) = send(&app, json_request("POST", "/auth/token", None, &bad)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "carla").await?;

    let (status, err) = send(&app, get_request("/user", None)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());

    let (status, _) = send(&app, get_request("/user", Some("not-a-jwt"))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, page) = send(&app, get_request("/user", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["username"], "carla");
    Ok(())
}

#[tokio::test]
async fn refresh_issues_a_new_access_token() -> anyhow::Result<()> {
    let app = build_app().await?;
    sign_up_and_login(&app, "dario").await?;
    let login = json!({"username": "dario", "password": PASSWORD});
    let (_, claims) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;

    let body = json!({"refresh": claims["refresh"]});
    let (status, refreshed) = send(&app, json_request("POST", "/auth/token/refresh", None, &body)?).await?;
    assert_eq!(status, StatusCode::OK);
    let token = refreshed["token"].as_str().unwrap_or_default().to_string();
    let (status, _) = send(&app, get_request("/user", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);

    // an access token is not a refresh token
    let body = json!({"refresh": claims["token"]});
    let (status, _) = send(&app, json_request("POST", "/auth/token/refresh", None, &body)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn change_password_with_unknown_email_is_rejected() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "elena").await?;

    let body = json!({"email": "nobody@example.com", "password": "An0ther#Secret"});
    let (status, err) = send(&app, json_request("POST", "/auth/change-password", None, &body)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "email invalid"}));

    // nothing changed: the old token and password still work
    let (status, _) = send(&app, get_request("/user", Some(&token))?).await?;
    assert_eq!(status, StatusCode::OK);
    let login = json!({"username": "elena", "password": PASSWORD});
    let (status, _) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn change_password_revokes_outstanding_tokens() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = sign_up_and_login(&app, "fabio").await?;

    let body = json!({"email": "FABIO@example.com", "password": "An0ther#Secret"});
    let (status, out) = send(&app, json_request("POST", "/auth/change-password", None, &body)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out, json!({"email": "fabio@example.com", "password": ""}));

    let (status, _) = send(&app, get_request("/user", Some(&token))?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let login = json!({"username": "fabio", "password": "An0ther#Secret"});
    let (status, _) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_deactivates_the_account() -> anyhow::Result<()> {
    let app = build_app().await?;
    let admin_token = sign_up_and_login(&app, "gina").await?;
    let body = json!({"username": "hugo", "email": "hugo@example.com", "password": PASSWORD});
    let (_, hugo) = send(&app, json_request("POST", "/user", None, &body)?).await?;
    let uri = format!("/user/{}", hugo["id"].as_str().unwrap_or_default());

    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&admin_token), &json!({}))?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = send(&app, get_request(&uri, Some(&admin_token))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], 0);
    assert_eq!(fetched["status_display"], "inactive");

    let login = json!({"username": "hugo", "password": PASSWORD});
    let (status, _) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn usernames_differing_only_in_case_are_taken() -> anyhow::Result<()> {
    let app = build_app().await?;
    let first = json!({"username": "Ana", "email": "ana@example.com", "password": PASSWORD});
    let (status, _) = send(&app, json_request("POST", "/user", None, &first)?).await?;
    assert_eq!(status, StatusCode::CREATED);

    let second = json!({"username": "ana", "email": "ana.b@example.com", "password": "Other#Pass9"});
    let (status, err) = send(&app, json_request("POST", "/user", None, &second)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "user with this username already exists.");

    // any casing logs into the one account
    let login = json!({"username": "ana", "password": PASSWORD});
    let (status, claims) = send(&app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(claims["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}
