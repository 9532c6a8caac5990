use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{attendance, core, reports, students};
use super::types::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(core::health_handler))
        .route(
            "/api/students",
            get(students::list_students_handler).post(students::create_student_handler),
        )
        .route("/api/students/:id", delete(students::delete_student_handler))
        .route("/api/attendance", post(attendance::mark_attendance_handler))
        .route(
            "/api/attendance/:date",
            get(attendance::attendance_for_date_handler),
        )
        .route(
            "/api/student-attendance/:student_id",
            get(attendance::student_summary_handler),
        )
        .route("/api/reports", get(reports::attendance_report_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
