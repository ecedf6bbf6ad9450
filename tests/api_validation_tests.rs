// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.
//!
//! Every case here is rejected before the store is touched, so the offline
//! mock is enough: a 500 would mean validation let the request through.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fitness_tracker::models::Role;
use serde_json::json;
use tower::ServiceExt;

mod common;

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

const POST_ID: &str = "6f1c1a52-9a3e-4d1b-8c1e-2f0a7b3c4d5e";

#[tokio::test]
async fn test_vote_zero_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "voter@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/forum/posts/{}/vote", POST_ID),
            Some(&token),
            json!({"email": "voter@example.com", "vote": 0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid vote value. Must be 1 or -1.");
}

#[tokio::test]
async fn test_vote_out_of_range_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "voter@example.com", Role::Member);

    for vote in [json!(2), json!(-2), json!("1"), json!(1.5)] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/forum/posts/{}/vote", POST_ID),
                Some(&token),
                json!({"email": "voter@example.com", "vote": vote}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "vote {}", vote);
    }
}

#[tokio::test]
async fn test_vote_bad_post_id_rejected_first() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "voter@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "POST",
            "/forum/posts/not-an-id/vote",
            Some(&token),
            json!({"email": "bad", "vote": 0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Invalid post ID.");
}

#[tokio::test]
async fn test_vote_bad_email_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "voter@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/forum/posts/{}/vote", POST_ID),
            Some(&token),
            json!({"email": "voter@example", "vote": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Invalid email format.");
}

#[tokio::test]
async fn test_vote_as_someone_else_forbidden() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "voter@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/forum/posts/{}/vote", POST_ID),
            Some(&token),
            json!({"email": "someone.else@example.com", "vote": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_forum_page_must_be_positive() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "reader@example.com", Role::Member);

    for uri in ["/forum/posts?page=0", "/forum/posts?page=-1", "/forum/posts?page=abc"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_forum_post_requires_title_and_content() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "writer@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "POST",
            "/forum/posts",
            Some(&token),
            json!({"title": "Leg day", "content": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn test_create_slot_requires_all_fields() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "coach@example.com", Role::Trainer);

    let cases = [
        json!({"slotName": "Morning", "slotTime": "07:00"}),
        json!({"slotName": "Morning", "slotTime": "07:00", "days": []}),
        json!({"slotName": "", "slotTime": "07:00", "days": ["Mon"]}),
        json!({"slotName": "Morning", "days": ["Mon"]}),
    ];

    for case in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/trainer/slots", Some(&token), case.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", case);
        let body = common::body_json(response).await;
        assert_eq!(body["message"], "All fields are required");
    }
}

#[tokio::test]
async fn test_delete_slot_bad_id() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "coach@example.com", Role::Trainer);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/slots/not-a-slot")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_requires_positive_price_and_email() {
    let (app, _) = common::create_test_app();

    let valid = json!({
        "trainerId": "t-1",
        "slotId": "s-1",
        "packageName": "Premium",
        "price": 99.0,
        "userEmail": "member@example.com"
    });

    let mut zero_price = valid.clone();
    zero_price["price"] = json!(0);
    let mut bad_email = valid.clone();
    bad_email["userEmail"] = json!("member");
    let mut no_slot = valid.clone();
    no_slot.as_object_mut().unwrap().remove("slotId");
    let mut bad_date = valid.clone();
    bad_date["bookingDate"] = json!("next tuesday");

    for case in [zero_price, bad_email, no_slot, bad_date] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/trainer/booking", None, case.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", case);
    }

    // The well-formed booking gets past validation to the (offline) store.
    let response = app
        .oneshot(json_request("POST", "/trainer/booking", None, valid))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_payment_intent_amount_validation() {
    let (app, _) = common::create_test_app();

    for amount in [json!(-5), json!(0), json!(0.001), json!("ten")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/create-payment-intent",
                None,
                json!({"amount": amount}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {}", amount);
    }
}

#[tokio::test]
async fn test_payment_provider_failure_is_500() {
    let (app, _) = common::create_test_app();

    // The test config points the provider at a closed local port.
    let response = app
        .oneshot(json_request(
            "POST",
            "/create-payment-intent",
            None,
            json!({"amount": 25.5}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Payment provider request failed");
}

#[tokio::test]
async fn test_profile_of_another_user_forbidden() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "me@example.com", Role::Member);

    for uri in ["/users/you@example.com", "/activity-log/you@example.com"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_profile_update_for_someone_else_forbidden() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "me@example.com", Role::Member);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/profile",
            Some(&token),
            json!({"email": "you@example.com", "name": "Mallory"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_update_rejects_unknown_role() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(&state, "admin@example.com", Role::Admin);

    for role in ["Admin", "trainer", "owner"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/users/member@example.com",
                Some(&token),
                json!({"role": role}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "role {}", role);
    }
}

#[tokio::test]
async fn test_subscribe_and_token_require_valid_email() {
    let (app, _) = common::create_test_app();

    for uri in ["/subscribe", "/jwt", "/users", "/applytrainer"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                uri,
                None,
                json!({"email": "not-an-email", "name": "Pat"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_path_ids_must_be_well_formed() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/trainers/12345")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Invalid ID format");
}
