use crate::domain::model::{
    AttendanceRecord, NewAttendance, NewSubmission, SubmissionStatus, Task, TaskSubmission,
};
use crate::domain::ports::{AttendanceStore, ReportSink, TaskStore};
use crate::utils::error::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl ReportSink for LocalStorage {
    async fn write_bundle(&self, name: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(name);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.to_string_lossy().into_owned())
    }
}

/// Attendance log persisted as a JSON document. Loads on every read and
/// rewrites on every append; fine for the single-user CLI this backs.
#[derive(Debug, Clone)]
pub struct JsonAttendanceStore {
    path: PathBuf,
}

impl JsonAttendanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<AttendanceRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &[AttendanceRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(records)?)?;
        Ok(())
    }
}

impl AttendanceStore for JsonAttendanceStore {
    async fn append(&self, attendance: NewAttendance) -> Result<AttendanceRecord> {
        let mut records = self.load()?;

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
        self.save(&records)?;
        Ok(record)
    }

    async fn history_for(&self, user_id: &str) -> Result<Vec<AttendanceRecord>> {
        Ok(self
            .load()?
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Task store whose course plan comes from the roster while submissions
/// persist as a JSON document next to the attendance log.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    tasks: Vec<Task>,
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(tasks: Vec<Task>, path: impl Into<PathBuf>) -> Self {
        Self {
            tasks,
            path: path.into(),
        }
    }

    fn load(&self) -> Result<Vec<TaskSubmission>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, submissions: &[TaskSubmission]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(submissions)?)?;
        Ok(())
    }
}

impl TaskStore for JsonTaskStore {
    async fn tasks(&self) -> Result<Vec<Task>> {
        // Earliest deadline first; undated tasks at the end.
        let mut ordered = self.tasks.clone();
        ordered.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        Ok(ordered)
    }

    async fn submissions_for(&self, user_id: &str) -> Result<Vec<TaskSubmission>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect())
    }

    async fn submit(&self, submission: NewSubmission) -> Result<TaskSubmission> {
        let mut submissions = self.load()?;

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
        self.save(&submissions)?;
        Ok(stored)
    }
}
