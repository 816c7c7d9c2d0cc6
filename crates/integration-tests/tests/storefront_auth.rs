//! Integration tests for the authentication flow.
//!
//! These tests require a running storefront; they skip themselves when
//! `STOREFRONT_BASE_URL` is not set. See the crate docs for setup.

use reqwest::StatusCode;
use serde_json::{Value, json};

use ivma_integration_tests::{TestContext, register_body, unique_email};

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let email = unique_email();

    let first = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&register_body(&email))
        .send()
        .await
        .expect("register request");
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same address, different case: still a conflict.
    let second = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&register_body(&email.to_uppercase()))
        .send()
        .await
        .expect("register request");
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body: Value = second.json().await.expect("JSON body");
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "EMAIL_ALREADY_REGISTERED");
}

#[tokio::test]
async fn wrong_password_is_indistinguishable_from_unknown_email() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let email = unique_email();
    ctx.client
        .post(ctx.url("/auth/register"))
        .json(&register_body(&email))
        .send()
        .await
        .expect("register request");

    let wrong_password = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({"email": email, "password": "not-the-password"}))
        .send()
        .await
        .expect("login request");

    let unknown_email = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({"email": unique_email(), "password": "whatever-pass"}))
        .send()
        .await
        .expect("login request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Identical bodies: no account enumeration.
    let a: Value = wrong_password.json().await.expect("JSON body");
    let b: Value = unknown_email.json().await.expect("JSON body");
    assert_eq!(a, b);
}

#[tokio::test]
async fn unverified_login_with_correct_password_is_flagged() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let email = unique_email();
    ctx.client
        .post(ctx.url("/auth/register"))
        .json(&register_body(&email))
        .send()
        .await
        .expect("register request");

    let response = ctx
        .client
        .post(ctx.url("/auth/login"))
        .json(&json!({"email": email, "password": "Abcdef1!pass"}))
        .send()
        .await
        .expect("login request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(body["code"], "EMAIL_NOT_VERIFIED");
}

#[tokio::test]
async fn me_requires_a_session() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let response = ctx
        .client
        .get(ctx.url("/auth/me"))
        .send()
        .await
        .expect("me request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn resend_verification_is_generic_for_unknown_accounts() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let response = ctx
        .client
        .post(ctx.url("/auth/resend-verification"))
        .json(&json!({"email": unique_email()}))
        .send()
        .await
        .expect("resend request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_succeeds_without_a_session() {
    let Some(ctx) = TestContext::from_env() else {
        eprintln!("STOREFRONT_BASE_URL not set, skipping");
        return;
    };

    let response = ctx
        .client
        .post(ctx.url("/auth/logout"))
        .send()
        .await
        .expect("logout request");

    assert_eq!(response.status(), StatusCode::OK);
}
