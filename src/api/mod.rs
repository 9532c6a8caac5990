mod error;
mod handlers;
mod router;
mod types;

pub use error::{ApiError, ApiResult};
pub use handlers::{attendance, reports, students};
pub use router::build_router;
pub use types::{
    AppState, AttendanceRecord, CreateStudentRequest, MarkAttendanceRequest, ReportRow, Student,
    StudentSummary,
};
