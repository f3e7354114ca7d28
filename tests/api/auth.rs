use crate::helpers::{json_body, spawn_app};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn register_returns_201_with_a_token_and_a_profile() {
    let app = spawn_app().await;

    let response = app
        .post_register(&json!({
            "name": "Rahim Uddin",
            "email": "Rahim@Example.com",
            "password": "s3cret-pass",
            "bloodGroup": "O+",
            "district": "Dhaka",
            "subDistrict": "Mirpur"
        }))
        .await;

    assert_eq!(201, response.status().as_u16());
    let body = json_body(response).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    let user = &body["user"];
    assert_eq!(user["email"], "rahim@example.com");
    assert_eq!(user["name"], "Rahim Uddin");
    assert_eq!(user["bloodGroup"], "O+");
    assert_eq!(user["role"], "donor");
    assert_eq!(user["status"], "active");
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn registering_the_same_email_twice_is_a_conflict() {
    let app = spawn_app().await;
    let body = json!({ "email": "a@x.com", "password": "pw" });

    let first = app.post_register(&body).await;
    assert_eq!(201, first.status().as_u16());

    let second = app.post_register(&body).await;
    assert_eq!(400, second.status().as_u16());
    assert_eq!(json_body(second).await["message"], "User already exists");
}

#[tokio::test]
async fn email_uniqueness_ignores_case() {
    let app = spawn_app().await;
    app.post_register(&json!({ "email": "a@x.com", "password": "pw" }))
        .await;

    let response = app
        .post_register(&json!({ "email": "A@X.COM", "password": "pw" }))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn register_returns_400_for_invalid_bodies() {
    let app = spawn_app().await;
    let test_cases = vec![
        (json!({ "password": "pw" }), "missing the email"),
        (json!({ "email": "a@x.com" }), "missing the password"),
        (json!({ "email": "not-an-email", "password": "pw" }), "invalid email"),
        (json!({ "email": "a@x.com", "password": "" }), "empty password"),
        (
            json!({ "email": "a@x.com", "password": "pw", "bloodGroup": "C+" }),
            "unknown blood group",
        ),
        (
            json!({ "email": "a@x.com", "password": "pw", "role": "admin" }),
            "self-assigned role",
        ),
    ];

    for (body, description) in test_cases {
        let response = app.post_register(&body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn login_round_trip_issues_a_token_for_the_same_user() {
    let app = spawn_app().await;
    let user = app.register_user("Rahim").await;

    let response = app
        .post_login(&json!({ "email": user.email, "password": user.password }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], user.id.to_string());

    let token = body["token"].as_str().unwrap();
    let me = json_body(app.get("/api/users/me", Some(token)).await).await;
    assert_eq!(me["id"], user.id.to_string());
}

#[tokio::test]
async fn login_with_a_wrong_password_is_rejected() {
    let app = spawn_app().await;
    let user = app.register_user("Rahim").await;

    let response = app
        .post_login(&json!({ "email": user.email, "password": "not-the-password" }))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(json_body(response).await["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_an_unknown_email_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .post_login(&json!({ "email": "nobody@example.com", "password": "pw" }))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(json_body(response).await["message"], "Invalid credentials");
}

#[tokio::test]
async fn federated_login_creates_the_account_once() {
    let app = spawn_app().await;
    let identity = json!({
        "email": "sadia@example.com",
        "displayName": "Sadia Islam",
        "externalId": "google-oauth2|1234"
    });

    let first = json_body(app.post_google_login(&identity).await).await;
    let second = json_body(app.post_google_login(&identity).await).await;

    assert_eq!(first["user"]["name"], "Sadia Islam");
    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert!(second["token"].as_str().is_some());
}

#[tokio::test]
async fn federated_only_accounts_cannot_log_in_with_a_password() {
    let app = spawn_app().await;
    app.post_google_login(&json!({
        "email": "sadia@example.com",
        "displayName": "Sadia Islam",
        "externalId": "google-oauth2|1234"
    }))
    .await;

    let response = app
        .post_login(&json!({ "email": "sadia@example.com", "password": "" }))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn federated_login_links_an_existing_password_account() {
    let app = spawn_app().await;
    let user = app.register_user("Rahim").await;

    let response = app
        .post_google_login(&json!({
            "email": user.email,
            "displayName": "Someone Else",
            "externalId": "google-oauth2|5678"
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_eq!(body["user"]["name"], "Rahim");

    // The password keeps working after linking.
    let login = app
        .post_login(&json!({ "email": user.email, "password": user.password }))
        .await;
    assert_eq!(200, login.status().as_u16());
}

#[tokio::test]
async fn protected_routes_reject_missing_or_invalid_tokens() {
    let app = spawn_app().await;
    let forged = format!("{}.{}.{}", Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    for token in [None, Some("garbage"), Some(forged.as_str())] {
        let response = app.get("/api/users/me", token).await;
        assert_eq!(401, response.status().as_u16());
        assert_eq!(json_body(response).await["message"], "Unauthorized access");
    }
}

#[tokio::test]
async fn blocked_users_are_refused_even_with_a_valid_token() {
    let app = spawn_app().await;
    let user = app.register_user("Rahim").await;
    app.set_status(user.id, blood_bank::domains::UserStatus::Blocked)
        .await;

    let response = app.get("/api/users/me", Some(&user.token)).await;

    assert_eq!(403, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "Your account has been blocked"
    );
}
