use axum::http::{Method, StatusCode};
use prehospital_core::models::user::Role;
use serde_json::json;

mod common;

use common::{Session, form, marker, request, test_app, test_app_with};

#[tokio::test]
async fn create_persists_form_and_injuries() {
    let app = test_app();
    let medic_id = app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let encoded = json!([marker(1, "front", 30.0, 30.0), marker(2, "back", 55.5, 12.25)]).to_string();
    let body = app.create_form(&session, form("Juan Dela Cruz", json!(encoded))).await;

    assert!(body["form_code"].as_str().unwrap().starts_with("PHC-"));
    assert_eq!(body["status"], "completed");
    assert_eq!(body["created_by"], medic_id);
    assert_eq!(body["patient_name"], "Juan Dela Cruz");
    assert_eq!(body["injuries"].as_array().unwrap().len(), 2);
    assert_eq!(body["injuries"][0]["view"], "front");
    assert_eq!(body["injuries"][1]["x"], 55.5);

    let id = body["id"].as_i64().unwrap();
    let (status, fetched) = app
        .send(request(Method::GET, &format!("/forms/{id}"), Some(&session), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["injuries"], body["injuries"]);
}

#[tokio::test]
async fn mutating_requests_need_the_csrf_token() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;
    let no_csrf = Session {
        token: session.token.clone(),
        csrf: "stale".to_string(),
    };

    let (status, _) = app
        .send(request(Method::POST, "/forms", Some(&no_csrf), Some(form("A", json!([])))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(request(Method::GET, "/forms", Some(&no_csrf), None))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_submission_reports_every_field() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let submission = json!({
        "patient_age": 200,
        "gcs_score": 2,
        "injuries": [marker(1, "front", 120.0, 10.0)],
    });
    let (status, body) = app
        .send(request(Method::POST, "/forms", Some(&session), Some(submission)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for expected in ["incident_date", "patient_name", "patient_age", "gcs_score", "injuries[1]"] {
        assert!(fields.contains(&expected), "missing {expected} in {fields:?}");
    }
}

#[tokio::test]
async fn drafts_skip_required_fields() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let body = app
        .create_form(&session, json!({ "status": "draft", "injuries": "" }))
        .await;
    assert_eq!(body["status"], "draft");
    assert!(body["patient_name"].is_null());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/forms")
        .header("authorization", format!("Bearer {}", session.token))
        .header("x-csrf-token", &session.csrf)
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn too_many_injuries_is_rejected_before_any_write() {
    let app = test_app_with(&[("PREHOSPITAL_MAX_INJURIES", "2")]);
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let injuries = json!([
        marker(1, "front", 10.0, 10.0),
        marker(2, "front", 20.0, 20.0),
        marker(3, "back", 30.0, 30.0),
    ]);
    let (status, body) = app
        .send(request(Method::POST, "/forms", Some(&session), Some(form("Over", injuries))))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("too many injuries"));

    let (_, list) = app.send(request(Method::GET, "/forms", Some(&session), None)).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn daily_submission_limit_counts_only_saved_forms() {
    let app = test_app_with(&[("PREHOSPITAL_MAX_SUBMISSIONS_PER_DAY", "1")]);
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let (status, _) = app
        .send(request(Method::POST, "/forms", Some(&session), Some(json!({}))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_form(&session, form("First", json!([]))).await;

    let (status, body) = app
        .send(request(Method::POST, "/forms", Some(&session), Some(form("Second", json!([])))))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("daily limit"));

    let (_, list) = app.send(request(Method::GET, "/forms", Some(&session), None)).await;
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn users_list_only_their_own_forms_and_admins_see_all() {
    let app = test_app();
    app.add_user("alpha", Role::User).await;
    app.add_user("bravo", Role::User).await;
    app.add_user("chief", Role::Admin).await;
    let alpha = app.login("alpha").await;
    let bravo = app.login("bravo").await;
    let chief = app.login("chief").await;

    app.create_form(&alpha, form("Patient A", json!([]))).await;
    app.create_form(&bravo, form("Patient B", json!([]))).await;
    app.create_form(&bravo, form("Patient C", json!([]))).await;

    let (_, list) = app.send(request(Method::GET, "/forms", Some(&alpha), None)).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["patient_name"], "Patient A");

    let (_, list) = app
        .send(request(Method::GET, "/forms?created_by=1", Some(&bravo), None))
        .await;
    assert_eq!(list["total"], 2);

    let (_, list) = app.send(request(Method::GET, "/forms", Some(&chief), None)).await;
    assert_eq!(list["total"], 3);

    let (_, list) = app
        .send(request(Method::GET, "/forms?search=patient%20c&per_page=1", Some(&chief), None))
        .await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["per_page"], 1);
    assert_eq!(list["items"][0]["created_by_name"], "bravo (test)");
}

#[tokio::test]
async fn bad_list_query_is_a_bad_request() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let (status, _) = app
        .send(request(Method::GET, "/forms?status=lost", Some(&session), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_owner_or_admin_may_update() {
    let app = test_app();
    app.add_user("alpha", Role::User).await;
    app.add_user("bravo", Role::User).await;
    app.add_user("chief", Role::Admin).await;
    let alpha = app.login("alpha").await;
    let bravo = app.login("bravo").await;
    let chief = app.login("chief").await;

    let created = app
        .create_form(&alpha, form("Patient A", json!([marker(1, "front", 10.0, 10.0)])))
        .await;
    let uri = format!("/forms/{}", created["id"]);

    let (status, _) = app
        .send(request(Method::PUT, &uri, Some(&bravo), Some(form("Hijack", json!([])))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(request(Method::GET, &uri, Some(&bravo), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let replacement = json!([marker(2, "back", 40.0, 60.0), marker(3, "back", 45.0, 65.0)]);
    let (status, updated) = app
        .send(request(Method::PUT, &uri, Some(&alpha), Some(form("Patient A", replacement))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["form_code"], created["form_code"]);
    let numbers: Vec<i64> = updated["injuries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 3]);

    let (status, updated) = app
        .send(request(Method::PUT, &uri, Some(&chief), Some(form("Reviewed", json!([])))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["patient_name"], "Reviewed");
    assert_eq!(updated["injuries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn delete_removes_form_for_owner() {
    let app = test_app();
    app.add_user("alpha", Role::User).await;
    app.add_user("bravo", Role::User).await;
    let alpha = app.login("alpha").await;
    let bravo = app.login("bravo").await;

    let created = app
        .create_form(&alpha, form("Patient A", json!([marker(1, "front", 10.0, 10.0)])))
        .await;
    let uri = format!("/forms/{}", created["id"]);

    let (status, _) = app.send(request(Method::DELETE, &uri, Some(&bravo), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(request(Method::DELETE, &uri, Some(&alpha), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.send(request(Method::GET, &uri, Some(&alpha), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn missing_or_non_numeric_ids() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;

    let (status, _) = app
        .send(request(Method::GET, "/forms/999", Some(&session), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(request(Method::GET, "/forms/abc", Some(&session), None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_audit_write_leaves_no_partial_save() {
    let app = test_app();
    app.add_user("medic", Role::User).await;
    let session = app.login("medic").await;
    let created = app
        .create_form(&session, form("Kept", json!([marker(1, "front", 20.0, 20.0)])))
        .await;
    let uri = format!("/forms/{}", created["id"]);

    app.state
        .db
        .lock()
        .await
        .execute_batch("DROP TABLE activity_log")
        .unwrap();

    let (status, _) = app
        .send(request(Method::POST, "/forms", Some(&session), Some(form("Lost", json!([])))))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app
        .send(request(Method::PUT, &uri, Some(&session), Some(form("Changed", json!([])))))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.send(request(Method::DELETE, &uri, Some(&session), None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, list) = app.send(request(Method::GET, "/forms", Some(&session), None)).await;
    assert_eq!(list["total"], 1);
    let (status, kept) = app.send(request(Method::GET, &uri, Some(&session), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["patient_name"], "Kept");
    assert_eq!(kept["injuries"].as_array().unwrap().len(), 1);

    // Only the first, committed submission counts toward the daily allowance.
    let used: i64 = app
        .state
        .db
        .lock()
        .await
        .query_row(
            "SELECT COALESCE(SUM(count), 0) FROM rate_limits WHERE action = 'form_submit'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(used, 1);
}
