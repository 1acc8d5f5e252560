use crate::domain::model::{AttendanceRecord, AttendanceStatus};
use serde::Serialize;

/// Attendance dashboard figures for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub total_classes: usize,
    pub attended: usize,
    pub late: usize,
    pub absent: usize,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let count = |status: AttendanceStatus| records.iter().filter(|r| r.status == status).count();

        Self {
            total_classes: records.len(),
            attended: count(AttendanceStatus::Present),
            late: count(AttendanceStatus::Late),
            absent: count(AttendanceStatus::Absent),
        }
    }

    /// Rounded percent of classes attended; 0 when there is no history.
    pub fn attendance_rate_percent(&self) -> u32 {
        if self.total_classes == 0 {
            return 0;
        }
        ((self.attended as f64 / self.total_classes as f64) * 100.0).round() as u32
    }
}
