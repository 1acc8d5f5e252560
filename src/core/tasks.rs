use crate::domain::model::{NewSubmission, Task, TaskState, TaskSubmission};
use crate::domain::ports::{IdentityProvider, TaskStore};
use crate::utils::error::{CheckError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One task joined with the student's latest submission.
#[derive(Debug, Clone)]
pub struct TaskOverview {
    pub task: Task,
    pub submission: Option<TaskSubmission>,
    pub state: TaskState,
}

/// Task board operations for the signed-in student.
pub struct TaskService<T, I> {
    store: T,
    identity: I,
}

impl<T, I> TaskService<T, I>
where
    T: TaskStore,
    I: IdentityProvider,
{
    pub fn new(store: T, identity: I) -> Self {
        Self { store, identity }
    }

    /// All tasks with their display state derived against `now`.
    pub async fn tasks_with_status(&self, now: DateTime<Utc>) -> Result<Vec<TaskOverview>> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(CheckError::NotSignedIn)?;

        let tasks = self.store.tasks().await?;
        let submissions = self.store.submissions_for(&user_id).await?;
        let latest = latest_by_task(&submissions);

        let overview = tasks
            .into_iter()
            .map(|task| {
                let submission = latest.get(&task.id).cloned();
                let state = task.state(submission.as_ref(), now);
                TaskOverview {
                    task,
                    submission,
                    state,
                }
            })
            .collect();
        Ok(overview)
    }

    /// Stores a submission. At least one of text and attachment is
    /// required; whitespace-only input counts as absent.
    pub async fn submit(
        &self,
        task_id: &str,
        submission_text: Option<&str>,
        attachment_url: Option<&str>,
    ) -> Result<TaskSubmission> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(CheckError::NotSignedIn)?;

        let submission_text = normalize(submission_text);
        let attachment_url = normalize(attachment_url);

        if submission_text.is_none() && attachment_url.is_none() {
            return Err(CheckError::SubmissionError {
                message: "Please provide either submission text or attachment URL".to_string(),
            });
        }

        if let Some(url) = &attachment_url {
            if crate::utils::validation::validate_url("attachment_url", url).is_err() {
                return Err(CheckError::SubmissionError {
                    message: format!("Attachment URL must be an http(s) link: {}", url),
                });
            }
        }

        let stored = self
            .store
            .submit(NewSubmission {
                task_id: task_id.to_string(),
                user_id,
                submission_text,
                attachment_url,
            })
            .await?;

        tracing::info!(
            "💾 Submission stored: {} for task {}",
            stored.id,
            stored.task_id
        );
        Ok(stored)
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Latest submission per task. Stores append chronologically, so the
/// last insert wins.
fn latest_by_task(submissions: &[TaskSubmission]) -> HashMap<String, TaskSubmission> {
    let mut latest: HashMap<String, TaskSubmission> = HashMap::new();
    for submission in submissions {
        latest.insert(submission.task_id.clone(), submission.clone());
    }
    latest
}
