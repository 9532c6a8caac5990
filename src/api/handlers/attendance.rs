use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use tracing::info;

use super::students::{get_student, non_blank};
use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{AppState, AttendanceRecord, MarkAttendanceRequest, StudentSummary};
use crate::calc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date and return it in canonical zero-padded form.
///
/// The year must be exactly four digits and no surrounding whitespace is
/// allowed; month and day may drop their leading zero.
pub fn parse_date(raw: &str) -> ApiResult<String> {
    let invalid = || ApiError::Validation(format!("invalid date {:?}, expected YYYY-MM-DD", raw));
    let four_digit_year = raw
        .split('-')
        .next()
        .is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()));
    if !four_digit_year {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| invalid())
}

fn record_from_row(r: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: r.get(0)?,
        student_id: r.get(1)?,
        student_name: r.get(2)?,
        date: r.get(3)?,
        status: r.get(4)?,
        remarks: r.get(5)?,
        marked_at: r.get(6)?,
    })
}

fn query_records<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> ApiResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "SELECT a.id, a.student_id, s.name, a.date, a.status, a.remarks, a.marked_at
         FROM attendance a
         LEFT JOIN students s ON s.id = a.student_id
         WHERE {}
         ORDER BY a.id",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params, record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Replace whatever is recorded for (student, date) with a fresh record.
///
/// The delete and insert share one transaction so a date never ends up
/// without a record for a student that had one.
pub fn mark_attendance(conn: &Connection, req: MarkAttendanceRequest) -> ApiResult<AttendanceRecord> {
    let student_id = req
        .student_id
        .ok_or_else(|| ApiError::Validation("missing student_id".to_string()))?;
    let raw_date = req
        .date
        .ok_or_else(|| ApiError::Validation("missing date".to_string()))?;
    let date = parse_date(&raw_date)?;
    let status = req.status.unwrap_or_default();
    let remarks = non_blank(req.remarks);

    let Some(student) = get_student(conn, student_id)? else {
        return Err(ApiError::NotFound("Student not found".to_string()));
    };

    let marked_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM attendance WHERE student_id = ? AND date = ?",
        (student_id, &date),
    )?;
    tx.execute(
        "INSERT INTO attendance(student_id, date, status, remarks, marked_at)
         VALUES(?, ?, ?, ?, ?)",
        (student_id, &date, status, remarks.as_deref(), &marked_at),
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(AttendanceRecord {
        id,
        student_id,
        student_name: Some(student.name),
        date,
        status,
        remarks,
        marked_at,
    })
}

pub fn attendance_for_date(conn: &Connection, raw_date: &str) -> ApiResult<Vec<AttendanceRecord>> {
    let date = parse_date(raw_date)?;
    query_records(conn, "a.date = ?", [&date])
}

pub fn student_summary(conn: &Connection, student_id: i64) -> ApiResult<StudentSummary> {
    let Some(student) = get_student(conn, student_id)? else {
        return Err(ApiError::NotFound("Student not found".to_string()));
    };
    let records = query_records(conn, "a.student_id = ?", [student_id])?;
    let tally = calc::tally(records.iter().map(|r| r.status));

    Ok(StudentSummary {
        student,
        tally,
        percentage: tally.percentage(),
        records,
    })
}

pub async fn mark_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AttendanceRecord>)> {
    let Json(req) = payload?;
    let conn = state.db.conn();
    let record = mark_attendance(&conn, req)?;
    info!(
        student_id = record.student_id,
        date = %record.date,
        status = %record.status,
        "attendance marked"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn attendance_for_date_handler(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    let conn = state.db.conn();
    Ok(Json(attendance_for_date(&conn, &date)?))
}

pub async fn student_summary_handler(
    State(state): State<AppState>,
    student_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<StudentSummary>> {
    let Path(student_id) = student_id?;
    let conn = state.db.conn();
    Ok(Json(student_summary(&conn, student_id)?))
}
