use axum::{extract::State, Json};
use rusqlite::Connection;

use super::students::student_from_row;
use crate::api::error::ApiResult;
use crate::api::types::{AppState, ReportRow};
use crate::calc::{AttendanceStatus, AttendanceTally};

/// Per-student attendance counts for the whole roster, in roster order.
pub fn attendance_report(conn: &Connection) -> ApiResult<Vec<ReportRow>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.roll_no, s.name, s.email, s.phone, s.created_at,
                a.status, COUNT(a.id)
         FROM students s
         LEFT JOIN attendance a ON a.student_id = s.id
         GROUP BY s.id, a.status
         ORDER BY s.id",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                student_from_row(r)?,
                r.get::<_, Option<AttendanceStatus>>(6)?,
                r.get::<_, i64>(7)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out: Vec<ReportRow> = Vec::new();
    for (student, status, count) in rows {
        if out.last().map(|row| row.student.id) != Some(student.id) {
            out.push(ReportRow {
                student,
                tally: AttendanceTally::default(),
                percentage: 0.0,
            });
        }
        let Some(row) = out.last_mut() else { continue };
        if let Some(status) = status {
            row.tally.add(status, count.max(0) as usize);
        }
    }
    for row in &mut out {
        row.percentage = row.tally.percentage();
    }
    Ok(out)
}

pub async fn attendance_report_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReportRow>>> {
    let conn = state.db.conn();
    Ok(Json(attendance_report(&conn)?))
}
