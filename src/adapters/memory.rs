use crate::domain::model::{
    AttendanceRecord, NewAttendance, NewSubmission, SubmissionStatus, Task, TaskSubmission,
};
use crate::domain::ports::{AttendanceStore, TaskStore};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Attendance log for single-process deployments (kiosk, CLI session).
/// Insertion order is chronological, so history reads backwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttendanceStore {
    records: Arc<Mutex<Vec<AttendanceRecord>>>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for MemoryAttendanceStore {
    async fn append(&self, attendance: NewAttendance) -> Result<AttendanceRecord> {
        let mut records = self.records.lock().await;

        let record = AttendanceRecord {
            id: format!("att-{:04}", records.len() + 1),
            user_id: attendance.user_id,
            location_id: attendance.location_id,
            location_name: attendance.location_name,
            latitude: attendance.latitude,
            longitude: attendance.longitude,
            network_id: attendance.network_id,
            method: attendance.method,
            status: attendance.status,
            check_in_time: Utc::now(),
        };

        records.push(record.clone());
        Ok(record)
    }

    async fn history_for(&self, user_id: &str) -> Result<Vec<AttendanceRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Task board and submission log, optionally seeded with a course plan.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<Mutex<Vec<Task>>>,
    submissions: Arc<Mutex<Vec<TaskSubmission>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks)),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Records a grade for an existing submission. Backend-side
    /// operation; exposed here for seeding and tests.
    pub async fn grade(&self, submission_id: &str, score: u32) -> Result<()> {
        let mut submissions = self.submissions.lock().await;
        let submission = submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
            .ok_or_else(|| crate::utils::error::CheckError::StoreError {
                message: format!("Submission not found: {}", submission_id),
            })?;

        submission.status = SubmissionStatus::Graded;
        submission.score = Some(score);
        Ok(())
    }
}

impl TaskStore for MemoryTaskStore {
    async fn tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.lock().await;

        // Earliest deadline first; undated tasks at the end.
        let mut ordered = tasks.clone();
        ordered.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        Ok(ordered)
    }

    async fn submissions_for(&self, user_id: &str) -> Result<Vec<TaskSubmission>> {
        let submissions = self.submissions.lock().await;
        Ok(submissions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn submit(&self, submission: NewSubmission) -> Result<TaskSubmission> {
        let mut submissions = self.submissions.lock().await;

        let stored = TaskSubmission {
            id: format!("sub-{:04}", submissions.len() + 1),
            task_id: submission.task_id,
            user_id: submission.user_id,
            submission_text: submission.submission_text,
            attachment_url: submission.attachment_url,
            status: SubmissionStatus::Submitted,
            score: None,
            submitted_at: Utc::now(),
        };

        submissions.push(stored.clone());
        Ok(stored)
    }
}
