#![allow(dead_code)]

use attendanced::api::{build_router, AppState};
use attendanced::db::Database;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _dir: TempDir,
}

pub fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::open(dir.path()).expect("open db");
    TestApp {
        router: build_router(AppState::new(db.clone())),
        db,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let req = builder.body(body).expect("build request");
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router response");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-json body: {}", String::from_utf8_lossy(&bytes))
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn create_student(&self, roll_no: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/api/students", json!({ "roll_no": roll_no, "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create student failed: {}", body);
        body.get("id").and_then(|v| v.as_i64()).expect("student id")
    }

    pub async fn mark(&self, student_id: i64, date: &str, status: &str) -> serde_json::Value {
        let (code, body) = self
            .post(
                "/api/attendance",
                json!({ "student_id": student_id, "date": date, "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "mark attendance failed: {}", body);
        body
    }
}
