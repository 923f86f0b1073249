mod common;
mod support;

use actix_web::test;
use common::assert_problem_details_structure;
use messgate::auth::session::verify_session_token;
use serde_json::json;
use support::create_test_app;
use support::state::build_test_state;

#[actix_web::test]
async fn test_device_password_opens_scan_session() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let security = state.app.security.clone();
    let app = create_test_app(state.app).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/api/session/login")
        .set_json(json!({ "device": "gate-1", "password": "scan-pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["scope"], "scan");
    assert!(body.get("session_id").is_some());
    assert!(body.get("expires_at").is_some());

    // The returned token must verify under the same security config and
    // carry the device label and session id it reported.
    let token = body["token"].as_str().expect("token should be a string");
    let claims = verify_session_token(token, &security)?;
    assert_eq!(claims.dev, "gate-1");
    assert_eq!(claims.sid.to_string(), body["session_id"]);

    Ok(())
}

#[actix_web::test]
async fn test_admin_password_opens_admin_session() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let app = create_test_app(state.app).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/api/session/login")
        .set_json(json!({ "device": "office", "password": "admin-pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["scope"], "admin");

    Ok(())
}

#[actix_web::test]
async fn test_wrong_password_is_unauthorized() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let app = create_test_app(state.app).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/api/session/login")
        .set_json(json!({ "device": "gate-1", "password": "not-the-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_structure(resp, 401, "UNAUTHORIZED_STAFF").await;
    Ok(())
}

#[actix_web::test]
async fn test_empty_device_label_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let app = create_test_app(state.app).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/api/session/login")
        .set_json(json!({ "device": "   ", "password": "scan-pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let problem = assert_problem_details_structure(resp, 400, "INVALID_DEVICE").await;
    assert_eq!(problem["detail"], "Device label cannot be empty");
    Ok(())
}

#[actix_web::test]
async fn test_status_reports_session_and_meal_windows() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let app = create_test_app(state.app).with_prod_routes().build().await?;

    let login = test::TestRequest::post()
        .uri("/api/session/login")
        .set_json(json!({ "device": "gate-2", "password": "scan-pw" }))
        .to_request();
    let login_body: serde_json::Value =
        test::read_body_json(test::call_service(&app, login).await).await;
    let token = login_body["token"].as_str().expect("token");

    let req = test::TestRequest::get()
        .uri("/api/session/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["device"], "gate-2");
    assert_eq!(body["scope"], "scan");
    assert_eq!(body["session_id"], login_body["session_id"]);
    assert!(body.get("server_time").is_some());
    // current_meal is None outside serving hours, a meal name inside; the
    // windows themselves are always reported.
    assert!(body.get("current_meal").is_some());
    assert!(body["meal_windows"].get("breakfast").is_some());
    assert!(body["meal_windows"].get("lunch").is_some());
    assert!(body["meal_windows"].get("dinner").is_some());

    Ok(())
}
