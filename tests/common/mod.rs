#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use campus_api::auth::{generate_jwt, Claims};
use campus_api::database::models::{RecurringSchedule, SessionLinks};
use campus_api::database::MemorySessionStore;
use campus_api::middleware::JwtTenantResolver;
use campus_api::services::{MaterializerSettings, SessionMaterializer};
use campus_api::{app, AppState};

pub const SECRET: &str = "integration-secret";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn links(teacher: Option<Uuid>) -> SessionLinks {
    SessionLinks {
        assignment_id: Some(Uuid::new_v4()),
        teacher_id: teacher,
        room_id: Some(Uuid::new_v4()),
    }
}

/// Weekly schedule active for the inclusive window [from, to]
pub fn schedule(tenant: Uuid, day_of_week: i16, from: &str, to: &str) -> RecurringSchedule {
    RecurringSchedule::weekly(tenant, Uuid::new_v4(), Uuid::new_v4(), day_of_week)
        .with_window(Some(date(from)), Some(date(to)))
}

pub fn materializer(store: Arc<MemorySessionStore>) -> SessionMaterializer {
    SessionMaterializer::new(store, MaterializerSettings::default())
}

pub struct TestApp {
    pub store: Arc<MemorySessionStore>,
    pub router: Router,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemorySessionStore::new());
    let settings = MaterializerSettings {
        max_range_days: Some(366),
        ..Default::default()
    };
    let state = AppState::new(store.clone(), Arc::new(JwtTenantResolver::new(SECRET)), settings);
    TestApp {
        store,
        router: app(state),
    }
}

pub fn token_for(tenant: Option<Uuid>, role: &str) -> String {
    generate_jwt(&Claims::new("tester", tenant, role, 1), SECRET).expect("token")
}

/// Send a request through the router in-process and decode the JSON body
pub async fn send(router: &Router, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::empty()).expect("request");

    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
