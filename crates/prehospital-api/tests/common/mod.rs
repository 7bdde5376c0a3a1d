#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use prehospital_api::app;
use prehospital_api::config::Config;
use prehospital_api::state::AppState;
use prehospital_auth::password::hash_password_with;
use prehospital_core::models::user::Role;
use prehospital_storage::db;
use prehospital_storage::users::{self, NewUser};

pub const SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub struct Session {
    pub token: String,
    pub csrf: String,
}

pub fn config_with(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .or_else(|| (key == "PREHOSPITAL_SESSION_SECRET").then(|| SECRET.to_string()))
    })
    .unwrap()
}

pub fn test_app() -> TestApp {
    test_app_with(&[])
}

pub fn test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let conn = db::open_memory_database().unwrap();
    let state = AppState::new(conn, &config_with(overrides)).unwrap();
    TestApp {
        router: app(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn add_user(&self, username: &str, role: Role) -> i64 {
        let conn = self.state.db.lock().await;
        users::create_user(
            &conn,
            &NewUser {
                username: username.to_string(),
                full_name: format!("{username} (test)"),
                password_hash: hash_password_with(PASSWORD, 1_000),
                role,
            },
            jiff::Timestamp::now(),
        )
        .unwrap()
        .id
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send_full(req).await;
        (status, body)
    }

    pub async fn send_full(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    pub async fn try_login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(request(
            Method::POST,
            "/session",
            None,
            Some(json!({ "username": username, "password": password })),
        ))
        .await
    }

    pub async fn login(&self, username: &str) -> Session {
        let (status, body) = self.try_login(username, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        Session {
            token: body["token"].as_str().unwrap().to_string(),
            csrf: body["csrf_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a form as `session` and return the response body.
    pub async fn create_form(&self, session: &Session, form: Value) -> Value {
        let (status, body) = self
            .send(request(Method::POST, "/forms", Some(session), Some(form)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }
}

/// Build a request carrying the session's bearer token and CSRF header.
pub fn request(
    method: Method,
    uri: &str,
    session: Option<&Session>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder
            .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
            .header("x-csrf-token", &session.csrf);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn form(patient: &str, injuries: Value) -> Value {
    json!({
        "incident_date": "2026-10-18",
        "incident_location": "Km 12, National Highway",
        "patient_name": patient,
        "patient_age": 34,
        "blood_pressure": "120/80",
        "pulse_rate": 88,
        "level_of_consciousness": ["alert"],
        "injuries": injuries,
    })
}

pub fn marker(id: u32, view: &str, x: f64, y: f64) -> Value {
    json!({ "id": id, "type": "laceration", "view": view, "x": x, "y": y })
}
