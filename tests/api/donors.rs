use crate::helpers::{json_body, spawn_app};
use blood_bank::domains::UserStatus;
use serde_json::json;

#[tokio::test]
async fn search_returns_only_active_donors() {
    let app = spawn_app().await;
    let active = app
        .register_user_with(json!({ "name": "Active", "bloodGroup": "A+", "district": "Dhaka" }))
        .await;
    let blocked = app
        .register_user_with(json!({ "name": "Blocked", "bloodGroup": "A+", "district": "Dhaka" }))
        .await;
    app.set_status(blocked.id, UserStatus::Blocked).await;

    let response = app.get("/api/donors/search?bloodGroup=A%2B", None).await;

    assert_eq!(200, response.status().as_u16());
    let donors = json_body(response).await;
    let donors = donors.as_array().unwrap();
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["id"], active.id.to_string());
    assert!(donors[0].get("passwordHash").is_none());
}

#[tokio::test]
async fn district_search_is_a_case_insensitive_substring() {
    let app = spawn_app().await;
    let north = app
        .register_user_with(json!({ "name": "North", "district": "Dhaka North" }))
        .await;
    app.register_user_with(json!({ "name": "Sylhet", "district": "Sylhet" }))
        .await;
    app.register_user("Nowhere").await;

    let donors = json_body(app.get("/api/donors/search?district=dhaka", None).await).await;

    let donors = donors.as_array().unwrap();
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["id"], north.id.to_string());
}

#[tokio::test]
async fn filters_combine() {
    let app = spawn_app().await;
    let wanted = app
        .register_user_with(json!({
            "name": "Wanted",
            "bloodGroup": "O-",
            "district": "Dhaka",
            "subDistrict": "Mirpur"
        }))
        .await;
    app.register_user_with(json!({
        "name": "Wrong group",
        "bloodGroup": "O+",
        "district": "Dhaka",
        "subDistrict": "Mirpur"
    }))
    .await;
    app.register_user_with(json!({
        "name": "Wrong area",
        "bloodGroup": "O-",
        "district": "Dhaka",
        "subDistrict": "Dhanmondi"
    }))
    .await;

    let donors = json_body(
        app.get(
            "/api/donors/search?bloodGroup=O-&district=DHAKA&subDistrict=mir",
            None,
        )
        .await,
    )
    .await;

    let donors = donors.as_array().unwrap();
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["id"], wanted.id.to_string());
}

#[tokio::test]
async fn unknown_blood_groups_are_rejected() {
    let app = spawn_app().await;

    let response = app.get("/api/donors/search?bloodGroup=X", None).await;

    assert_eq!(400, response.status().as_u16());
}
