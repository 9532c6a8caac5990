use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde_json::json;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{AppState, CreateStudentRequest, Student};

const DUPLICATE_ROLL_NO: &str = "Roll number already exists";

pub(crate) fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string())
        .and_then(|s| if s.is_empty() { None } else { Some(s) })
}

fn required(v: Option<String>, key: &str) -> ApiResult<String> {
    non_blank(v).ok_or_else(|| ApiError::Validation(format!("missing {}", key)))
}

pub(crate) fn student_from_row(r: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get(0)?,
        roll_no: r.get(1)?,
        name: r.get(2)?,
        email: r.get(3)?,
        phone: r.get(4)?,
        created_at: r.get(5)?,
    })
}

pub fn list_students(conn: &Connection) -> ApiResult<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT id, roll_no, name, email, phone, created_at
         FROM students
         ORDER BY id",
    )?;
    let students = stmt
        .query_map([], student_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(students)
}

pub fn get_student(conn: &Connection, id: i64) -> ApiResult<Option<Student>> {
    let student = conn
        .query_row(
            "SELECT id, roll_no, name, email, phone, created_at
             FROM students
             WHERE id = ?",
            [id],
            student_from_row,
        )
        .optional()?;
    Ok(student)
}

pub fn create_student(conn: &Connection, req: CreateStudentRequest) -> ApiResult<Student> {
    let roll_no = required(req.roll_no, "roll_no")?;
    let name = required(req.name, "name")?;
    let email = non_blank(req.email);
    let phone = non_blank(req.phone);

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM students WHERE roll_no = ?",
            [&roll_no],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::DuplicateKey(DUPLICATE_ROLL_NO.to_string()));
    }

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    conn.execute(
        "INSERT INTO students(roll_no, name, email, phone, created_at)
         VALUES(?, ?, ?, ?, ?)",
        (&roll_no, &name, email.as_deref(), phone.as_deref(), &created_at),
    )?;

    Ok(Student {
        id: conn.last_insert_rowid(),
        roll_no,
        name,
        email,
        phone,
        created_at,
    })
}

/// Attendance rows go with the student via `ON DELETE CASCADE`.
pub fn delete_student(conn: &Connection, id: i64) -> ApiResult<()> {
    let deleted = conn.execute("DELETE FROM students WHERE id = ?", [id])?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }
    Ok(())
}

pub async fn list_students_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    let conn = state.db.conn();
    Ok(Json(list_students(&conn)?))
}

pub async fn create_student_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let Json(req) = payload?;
    let conn = state.db.conn();
    let student = create_student(&conn, req)?;
    info!(id = student.id, roll_no = %student.roll_no, "student created");
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn delete_student_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Path(id) = id?;
    let conn = state.db.conn();
    delete_student(&conn, id)?;
    info!(id, "student deleted");
    Ok(Json(json!({ "message": "Student deleted" })))
}
