use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair in degrees. Immutable value; equality is
/// exact float equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

fn default_active() -> bool {
    true
}

/// An administratively defined point with an allowed check-in radius.
/// Maintained by the administration backend; read-only here. The serde
/// aliases accept rows in the backend's column naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    #[serde(default, alias = "wifi_ssid")]
    pub network_id: Option<String>,
    #[serde(default = "default_active", alias = "is_active")]
    pub active: bool,
}

impl CampusLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    Location,
    Wifi,
    Both,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationMethod::Location => "location",
            VerificationMethod::Wifi => "wifi",
            VerificationMethod::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

/// Outcome of one presence check. Transient: recomputed on every check,
/// never persisted.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub nearest: CampusLocation,
    pub distance_meters: f64,
    pub within_range: bool,
    pub network_id: Option<String>,
    pub method: VerificationMethod,
}

impl VerificationResult {
    /// Rounded meters for user-facing output.
    pub fn distance_rounded(&self) -> i64 {
        self.distance_meters.round() as i64
    }

    pub fn out_of_range_message(&self) -> String {
        format!(
            "You are ~{}m away from {}. Please move closer to campus.",
            self.distance_rounded(),
            self.nearest.name
        )
    }
}

/// Insert payload for the attendance store; the store assigns id and
/// check-in time.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: String,
    pub location_id: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network_id: Option<String>,
    pub method: VerificationMethod,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub location_id: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network_id: Option<String>,
    pub method: VerificationMethod,
    pub status: AttendanceStatus,
    pub check_in_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub course_name: Option<String>,
    pub max_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub task_id: String,
    pub user_id: String,
    pub submission_text: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSubmission {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub submission_text: Option<String>,
    pub attachment_url: Option<String>,
    pub status: SubmissionStatus,
    pub score: Option<u32>,
    pub submitted_at: DateTime<Utc>,
}

/// Display state of a task for one student, derived from their latest
/// submission and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Overdue,
    Submitted,
    Graded { score: u32, max_score: u32 },
}

impl TaskState {
    pub fn label(&self) -> String {
        match self {
            TaskState::Pending => "Pending".to_string(),
            TaskState::Overdue => "Overdue".to_string(),
            TaskState::Submitted => "Submitted".to_string(),
            TaskState::Graded { score, max_score } => format!("Graded: {}/{}", score, max_score),
        }
    }
}

impl Task {
    /// A graded submission with a score wins; any submission counts as
    /// submitted; otherwise a past due date means overdue.
    pub fn state(&self, submission: Option<&TaskSubmission>, now: DateTime<Utc>) -> TaskState {
        if let Some(submission) = submission {
            if submission.status == SubmissionStatus::Graded {
                if let Some(score) = submission.score {
                    return TaskState::Graded {
                        score,
                        max_score: self.max_score,
                    };
                }
            }
            return TaskState::Submitted;
        }

        match self.due_date {
            Some(due) if due < now => TaskState::Overdue,
            _ => TaskState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_due(due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: "task-1".to_string(),
            title: "Lab report".to_string(),
            description: None,
            due_date: due,
            course_name: Some("Physics".to_string()),
            max_score: 100,
        }
    }

    fn submission(status: SubmissionStatus, score: Option<u32>) -> TaskSubmission {
        TaskSubmission {
            id: "sub-1".to_string(),
            task_id: "task-1".to_string(),
            user_id: "student-1".to_string(),
            submission_text: Some("answer".to_string()),
            attachment_url: None,
            status,
            score,
            submitted_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_task_state_pending_without_due_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(task_due(None).state(None, now), TaskState::Pending);
    }

    #[test]
    fn test_task_state_overdue_after_due_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(task_due(Some(due)).state(None, now), TaskState::Overdue);
    }

    #[test]
    fn test_task_state_submission_beats_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
        let sub = submission(SubmissionStatus::Submitted, None);
        assert_eq!(
            task_due(Some(due)).state(Some(&sub), now),
            TaskState::Submitted
        );
    }

    #[test]
    fn test_task_state_graded_requires_score() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

        let graded = submission(SubmissionStatus::Graded, Some(87));
        assert_eq!(
            task_due(None).state(Some(&graded), now),
            TaskState::Graded {
                score: 87,
                max_score: 100
            }
        );

        // Graded without a score renders as a plain submission.
        let ungraded = submission(SubmissionStatus::Graded, None);
        assert_eq!(task_due(None).state(Some(&ungraded), now), TaskState::Submitted);
    }

    #[test]
    fn test_graded_label_shows_score_over_max() {
        let state = TaskState::Graded {
            score: 8,
            max_score: 10,
        };
        assert_eq!(state.label(), "Graded: 8/10");
    }

    #[test]
    fn test_campus_row_accepts_backend_column_names() {
        let json = serde_json::json!({
            "id": "main",
            "name": "Main Campus",
            "latitude": 10.0,
            "longitude": 20.0,
            "radius_meters": 100.0,
            "wifi_ssid": "CAMPUS-WIFI",
            "is_active": false
        });

        let campus: CampusLocation = serde_json::from_value(json).unwrap();
        assert_eq!(campus.network_id.as_deref(), Some("CAMPUS-WIFI"));
        assert!(!campus.active);
    }

    #[test]
    fn test_campus_row_active_defaults_to_true() {
        let json = serde_json::json!({
            "id": "main",
            "name": "Main Campus",
            "latitude": 10.0,
            "longitude": 20.0,
            "radius_meters": 100.0
        });

        let campus: CampusLocation = serde_json::from_value(json).unwrap();
        assert!(campus.active);
        assert!(campus.network_id.is_none());
    }
}
