use crate::helpers::{donation_request_body, json_body, spawn_app};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn creating_a_request_requires_authentication() {
    let app = spawn_app().await;

    let response = app
        .post_json("/api/donation-requests", &donation_request_body(), None)
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn created_requests_start_pending_and_carry_the_requester() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;

    let request = app.create_request(&requester.token, json!({})).await;

    assert_eq!(request["status"], "pending");
    assert_eq!(request["requesterId"], requester.id.to_string());
    assert_eq!(request["requesterName"], "Requester");
    assert_eq!(request["requesterEmail"], requester.email);
    assert_eq!(request["bloodGroup"], "B-");
    assert_eq!(request["donationDate"], "2026-11-02");
    assert_eq!(request["donationTime"], "10:30:00");
    assert_eq!(request["donor"], Value::Null);
}

#[tokio::test]
async fn invalid_request_bodies_are_rejected() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let test_cases = vec![
        (json!({ "bloodGroup": "Z+" }), "unknown blood group"),
        (json!({ "donationDate": "02/11/2026" }), "malformed date"),
        (json!({ "donationTime": "half past ten" }), "malformed time"),
        (json!({ "hospitalName": "  " }), "blank hospital"),
        (json!({ "status": "done" }), "client-chosen status"),
    ];

    for (overrides, description) in test_cases {
        let mut body = donation_request_body();
        for (key, value) in overrides.as_object().unwrap() {
            body[key] = value.clone();
        }
        let response = app
            .post_json("/api/donation-requests", &body, Some(&requester.token))
            .await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not reject a request with {}.",
            description
        );
    }
}

#[tokio::test]
async fn requests_are_publicly_readable() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let request = app.create_request(&requester.token, json!({})).await;
    let id = request["id"].as_str().unwrap();

    let response = app.get(&format!("/api/donation-requests/{}", id), None).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(json_body(response).await["id"], id);
}

#[tokio::test]
async fn missing_requests_are_404() {
    let app = spawn_app().await;

    let unknown = app
        .get(&format!("/api/donation-requests/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(404, unknown.status().as_u16());
    assert_eq!(
        json_body(unknown).await["message"],
        "Donation request not found"
    );

    let not_a_uuid = app.get("/api/donation-requests/not-a-uuid", None).await;
    assert_eq!(404, not_a_uuid.status().as_u16());
}

#[tokio::test]
async fn public_listing_filters_by_status_blood_group_and_district() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    app.create_request(&requester.token, json!({ "bloodGroup": "A+" }))
        .await;
    app.create_request(
        &requester.token,
        json!({ "bloodGroup": "O-", "recipientDistrict": "Sylhet" }),
    )
    .await;
    app.create_request(&requester.token, json!({ "bloodGroup": "O-" }))
        .await;

    let all = json_body(app.get("/api/donation-requests", None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let o_negative = json_body(
        app.get("/api/donation-requests?bloodGroup=O-", None)
            .await,
    )
    .await;
    assert_eq!(o_negative.as_array().unwrap().len(), 2);

    let in_sylhet = json_body(
        app.get("/api/donation-requests?bloodGroup=O-&district=sYl", None)
            .await,
    )
    .await;
    let in_sylhet = in_sylhet.as_array().unwrap();
    assert_eq!(in_sylhet.len(), 1);
    assert_eq!(in_sylhet[0]["recipientDistrict"], "Sylhet");

    let done = json_body(app.get("/api/donation-requests?status=done", None).await).await;
    assert!(done.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn my_requests_are_paginated_newest_first() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let someone_else = app.register_user("Someone Else").await;
    app.create_request(&someone_else.token, json!({})).await;

    let mut created = Vec::new();
    for i in 0..25 {
        let request = app
            .create_request(&requester.token, json!({ "message": format!("#{}", i) }))
            .await;
        created.push(request["id"].as_str().unwrap().to_string());
    }
    created.reverse();

    let first = json_body(app.get("/api/donation-requests/my", Some(&requester.token)).await).await;
    assert_eq!(first["totalPages"], 3);
    assert_eq!(first["currentPage"], 1);
    let first_ids: Vec<&str> = first["requests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|request| request["id"].as_str().unwrap())
        .collect();
    assert_eq!(first_ids, created[..10]);

    let last = json_body(
        app.get("/api/donation-requests/my?page=3", Some(&requester.token))
            .await,
    )
    .await;
    assert_eq!(last["currentPage"], 3);
    assert_eq!(last["requests"].as_array().unwrap().len(), 5);

    let beyond = json_body(
        app.get("/api/donation-requests/my?page=4", Some(&requester.token))
            .await,
    )
    .await;
    assert!(beyond["requests"].as_array().unwrap().is_empty());
    assert_eq!(beyond["totalPages"], 3);
}

#[tokio::test]
async fn my_requests_reject_page_zero() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;

    for query in ["page=0", "page=-1", "page=abc"] {
        let response = app
            .get(
                &format!("/api/donation-requests/my?{}", query),
                Some(&requester.token),
            )
            .await;
        assert_eq!(400, response.status().as_u16(), "accepted {}", query);
    }
}

#[tokio::test]
async fn my_requests_reject_pages_beyond_any_offset() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;

    let response = app
        .get(
            &format!("/api/donation-requests/my?page={}", u64::MAX),
            Some(&requester.token),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
    // The worker survived and keeps serving.
    let follow_up = app
        .get("/api/donation-requests/my", Some(&requester.token))
        .await;
    assert_eq!(200, follow_up.status().as_u16());
}

#[tokio::test]
async fn my_requests_without_records_have_no_pages() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;

    let body = json_body(app.get("/api/donation-requests/my", Some(&requester.token)).await).await;

    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["currentPage"], 1);
    assert!(body["requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn requesters_update_their_own_requests() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let request = app.create_request(&requester.token, json!({})).await;

    let response = app
        .put_json(
            &format!("/api/donation-requests/{}", request["id"].as_str().unwrap()),
            &json!({ "hospitalName": "Square Hospital", "status": "canceled" }),
            Some(&requester.token),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let updated = json_body(response).await;
    assert_eq!(updated["hospitalName"], "Square Hospital");
    assert_eq!(updated["status"], "canceled");
    assert_eq!(updated["recipientName"], "Karim Ahmed");
}

#[tokio::test]
async fn other_users_cannot_update_or_delete_a_request() {
    let app = spawn_app().await;
    let owner = app.register_user("Owner").await;
    let intruder = app.register_user("Intruder").await;
    let request = app.create_request(&owner.token, json!({})).await;
    let path = format!("/api/donation-requests/{}", request["id"].as_str().unwrap());

    let update = app
        .put_json(&path, &json!({ "hospitalName": "Elsewhere" }), Some(&intruder.token))
        .await;
    assert_eq!(403, update.status().as_u16());

    let delete = app.delete(&path, Some(&intruder.token)).await;
    assert_eq!(403, delete.status().as_u16());

    // Still there and untouched.
    let stored = json_body(app.get(&path, None).await).await;
    assert_eq!(stored["hospitalName"], "Dhaka Medical College Hospital");
}

#[tokio::test]
async fn owners_and_admins_delete_requests() {
    let app = spawn_app().await;
    let owner = app.register_user("Owner").await;
    let admin = app.register_admin().await;
    let mine = app.create_request(&owner.token, json!({})).await;
    let theirs = app.create_request(&owner.token, json!({})).await;

    for (request, token) in [(&mine, &owner.token), (&theirs, &admin.token)] {
        let id = request["id"].as_str().unwrap();
        let path = format!("/api/donation-requests/{}", id);

        let response = app.delete(&path, Some(token)).await;
        assert_eq!(200, response.status().as_u16());
        assert_eq!(json_body(response).await["id"], id);

        assert_eq!(404, app.get(&path, None).await.status().as_u16());
    }
}

#[tokio::test]
async fn deleting_requires_authentication() {
    let app = spawn_app().await;
    let owner = app.register_user("Owner").await;
    let request = app.create_request(&owner.token, json!({})).await;

    let response = app
        .delete(
            &format!("/api/donation-requests/{}", request["id"].as_str().unwrap()),
            None,
        )
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn donating_moves_the_request_in_progress() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let donor = app.register_user("Donor").await;
    let request = app.create_request(&requester.token, json!({})).await;
    let path = format!(
        "/api/donation-requests/{}/donate",
        request["id"].as_str().unwrap()
    );

    let response = app.post_json(&path, &json!({}), Some(&donor.token)).await;

    assert_eq!(200, response.status().as_u16());
    let updated = json_body(response).await;
    assert_eq!(updated["status"], "inprogress");
    assert_eq!(updated["donor"]["id"], donor.id.to_string());
    assert_eq!(updated["donor"]["name"], "Donor");
    assert_eq!(updated["donor"]["email"], donor.email);
}

#[tokio::test]
async fn only_pending_requests_accept_a_donor() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let first = app.register_user("First").await;
    let second = app.register_user("Second").await;
    let request = app.create_request(&requester.token, json!({})).await;
    let path = format!(
        "/api/donation-requests/{}/donate",
        request["id"].as_str().unwrap()
    );

    app.post_json(&path, &json!({}), Some(&first.token)).await;
    let response = app.post_json(&path, &json!({}), Some(&second.token)).await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "Donation request is not pending"
    );
}

#[tokio::test]
async fn requests_with_a_donor_cannot_be_reset_to_pending() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let donor = app.register_user("Donor").await;
    let request = app.create_request(&requester.token, json!({})).await;
    let path = format!("/api/donation-requests/{}", request["id"].as_str().unwrap());
    app.post_json(&format!("{}/donate", path), &json!({}), Some(&donor.token))
        .await;

    let response = app
        .put_json(&path, &json!({ "status": "pending" }), Some(&requester.token))
        .await;

    assert_eq!(400, response.status().as_u16());
    let stored = json_body(app.get(&path, None).await).await;
    assert_eq!(stored["status"], "inprogress");
    assert_eq!(stored["donor"]["id"], donor.id.to_string());
}

#[tokio::test]
async fn owner_edits_keep_the_assigned_donor() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let donor = app.register_user("Donor").await;
    let request = app.create_request(&requester.token, json!({})).await;
    let path = format!("/api/donation-requests/{}", request["id"].as_str().unwrap());
    app.post_json(&format!("{}/donate", path), &json!({}), Some(&donor.token))
        .await;

    let response = app
        .put_json(
            &path,
            &json!({ "hospitalName": "Square Hospital", "status": "done" }),
            Some(&requester.token),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let stored = json_body(app.get(&path, None).await).await;
    assert_eq!(stored["hospitalName"], "Square Hospital");
    assert_eq!(stored["status"], "done");
    assert_eq!(stored["donor"]["id"], donor.id.to_string());
}

#[tokio::test]
async fn requesters_cannot_donate_to_themselves() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let request = app.create_request(&requester.token, json!({})).await;

    let response = app
        .post_json(
            &format!(
                "/api/donation-requests/{}/donate",
                request["id"].as_str().unwrap()
            ),
            &json!({}),
            Some(&requester.token),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn my_requests_can_be_filtered_by_status() {
    let app = spawn_app().await;
    let requester = app.register_user("Requester").await;
    let donor = app.register_user("Donor").await;
    let request = app.create_request(&requester.token, json!({})).await;
    app.create_request(&requester.token, json!({})).await;
    app.post_json(
        &format!(
            "/api/donation-requests/{}/donate",
            request["id"].as_str().unwrap()
        ),
        &json!({}),
        Some(&donor.token),
    )
    .await;

    let body = json_body(
        app.get(
            "/api/donation-requests/my?status=inprogress",
            Some(&requester.token),
        )
        .await,
    )
    .await;

    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["id"], request["id"]);
    assert_eq!(body["totalPages"], 1);
}
