use crate::domain::model::{CampusLocation, Task};
use crate::domain::ports::{CampusDirectory, FixRequest};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// The roster file: app identity, fix contract overrides, campus
/// locations and the course plan. The roster doubles as the campus
/// directory for deployments without an administration backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub app: AppConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default, rename = "campus")]
    pub campuses: Vec<CampusLocation>,
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub timeout_seconds: Option<u64>,
    pub max_fix_age_seconds: Option<u64>,
    pub high_accuracy: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339 timestamp, quoted in the TOML file.
    pub due_date: Option<DateTime<Utc>>,
    pub course_name: Option<String>,
    pub max_score: Option<u32>,
}

impl RosterConfig {
    /// 從 TOML 檔案載入名冊
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析名冊
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CheckError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CAMPUS_WIFI})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證名冊的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("app.name", &self.app.name)?;

        if let Some(timeout) = self.location.timeout_seconds {
            crate::utils::validation::validate_positive_number(
                "location.timeout_seconds",
                timeout as usize,
                1,
            )?;
        }

        for campus in &self.campuses {
            let field = |name: &str| format!("campus[{}].{}", campus.id, name);

            crate::utils::validation::validate_non_empty_string(&field("id"), &campus.id)?;
            crate::utils::validation::validate_non_empty_string(&field("name"), &campus.name)?;
            crate::utils::validation::validate_latitude(&field("latitude"), campus.latitude)?;
            crate::utils::validation::validate_longitude(&field("longitude"), campus.longitude)?;
            crate::utils::validation::validate_radius(&field("radius_meters"), campus.radius_meters)?;
        }

        for task in &self.tasks {
            let field = |name: &str| format!("task[{}].{}", task.id, name);

            crate::utils::validation::validate_non_empty_string(&field("id"), &task.id)?;
            crate::utils::validation::validate_non_empty_string(&field("title"), &task.title)?;
            if let Some(max_score) = task.max_score {
                crate::utils::validation::validate_positive_number(
                    &field("max_score"),
                    max_score as usize,
                    1,
                )?;
            }
        }

        Ok(())
    }

    /// Fix contract for the location provider; unset fields keep the
    /// port defaults (10 s timeout, fresh fix, high accuracy).
    pub fn fix_request(&self) -> FixRequest {
        let defaults = FixRequest::default();
        FixRequest {
            high_accuracy: self.location.high_accuracy.unwrap_or(defaults.high_accuracy),
            timeout: self
                .location
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_fix_age: self
                .location
                .max_fix_age_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_fix_age),
        }
    }

    /// Course plan entries as domain tasks; max_score defaults to 100.
    pub fn course_plan(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .map(|t| Task {
                id: t.id.clone(),
                title: t.title.clone(),
                description: t.description.clone(),
                due_date: t.due_date,
                course_name: t.course_name.clone(),
                max_score: t.max_score.unwrap_or(100),
            })
            .collect()
    }
}

impl CampusDirectory for RosterConfig {
    async fn active_campuses(&self) -> Result<Vec<CampusLocation>> {
        Ok(self
            .campuses
            .iter()
            .filter(|c| c.active)
            .cloned()
            .collect())
    }
}

impl Validate for RosterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
