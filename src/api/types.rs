use serde::{Deserialize, Serialize};

use crate::calc::{AttendanceStatus, AttendanceTally};
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateStudentRequest {
    pub roll_no: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MarkAttendanceRequest {
    pub student_id: Option<i64>,
    pub date: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub id: i64,
    pub roll_no: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    pub date: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub marked_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub student: Student,
    #[serde(flatten)]
    pub tally: AttendanceTally,
    pub percentage: f64,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub student: Student,
    #[serde(flatten)]
    pub tally: AttendanceTally,
    pub percentage: f64,
}
