use crate::helpers::{json_body, spawn_app};
use serde_json::json;

#[tokio::test]
async fn funds_require_authentication() {
    let app = spawn_app().await;

    assert_eq!(401, app.get("/api/funds", None).await.status().as_u16());
    assert_eq!(
        401,
        app.post_json("/api/funds", &json!({ "amount": 10 }), None)
            .await
            .status()
            .as_u16()
    );
}

#[tokio::test]
async fn contributions_are_recorded_against_the_caller() {
    let app = spawn_app().await;
    let user = app.register_user("Generous").await;

    let response = app
        .post_json("/api/funds", &json!({ "amount": 500.5 }), Some(&user.token))
        .await;

    assert_eq!(201, response.status().as_u16());
    let fund = json_body(response).await;
    assert_eq!(fund["amount"], 500.5);
    assert_eq!(fund["contributorId"], user.id.to_string());
    assert_eq!(fund["contributorName"], "Generous");
    assert_eq!(fund["contributorEmail"], user.email);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = spawn_app().await;
    let user = app.register_user("Stingy").await;

    for body in [
        json!({ "amount": 0 }),
        json!({ "amount": -5 }),
        json!({ "amount": "ten" }),
        json!({}),
    ] {
        let response = app.post_json("/api/funds", &body, Some(&user.token)).await;
        assert_eq!(400, response.status().as_u16(), "accepted {}", body);
    }
}

#[tokio::test]
async fn funds_are_listed_newest_first() {
    let app = spawn_app().await;
    let user = app.register_user("Generous").await;
    for amount in [10, 20, 30] {
        app.post_json("/api/funds", &json!({ "amount": amount }), Some(&user.token))
            .await;
    }

    let funds = json_body(app.get("/api/funds", Some(&user.token)).await).await;

    let amounts: Vec<f64> = funds
        .as_array()
        .unwrap()
        .iter()
        .map(|fund| fund["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts, vec![30.0, 20.0, 10.0]);
}
