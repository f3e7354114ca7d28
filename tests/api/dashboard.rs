use crate::helpers::{json_body, spawn_app};
use serde_json::json;

#[tokio::test]
async fn stats_require_authentication() {
    let app = spawn_app().await;

    let response = app.get("/api/dashboard/stats", None).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn stats_count_users_requests_and_sum_funds() {
    let app = spawn_app().await;
    let first = app.register_user("First").await;
    let second = app.register_user("Second").await;
    app.create_request(&first.token, json!({})).await;
    app.create_request(&second.token, json!({})).await;
    app.create_request(&second.token, json!({})).await;
    app.post_json("/api/funds", &json!({ "amount": 100.25 }), Some(&first.token))
        .await;
    app.post_json("/api/funds", &json!({ "amount": 50 }), Some(&second.token))
        .await;

    let response = app.get("/api/dashboard/stats", Some(&first.token)).await;

    assert_eq!(200, response.status().as_u16());
    let stats = json_body(response).await;
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalRequests"], 3);
    assert_eq!(stats["totalFunds"], 150.25);
}

#[tokio::test]
async fn stats_on_an_empty_store_are_zero() {
    let app = spawn_app().await;
    let user = app.register_user("Only").await;

    let stats = json_body(app.get("/api/dashboard/stats", Some(&user.token)).await).await;

    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(stats["totalRequests"], 0);
    assert_eq!(stats["totalFunds"], 0.0);
}
