use crate::domain::model::CampusLocation;
use crate::domain::ports::CampusDirectory;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Campus roster served by the administration backend as a JSON array.
/// Rows flagged inactive are dropped here so callers only ever see
/// campuses students may check in against.
#[derive(Debug, Clone)]
pub struct RemoteCampusDirectory {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteCampusDirectory {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl CampusDirectory for RemoteCampusDirectory {
    async fn active_campuses(&self) -> Result<Vec<CampusLocation>> {
        tracing::debug!("📡 Fetching campus roster from: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<CampusLocation> = response.json().await?;
        let total = rows.len();

        // 過濾停用的校區
        let active: Vec<CampusLocation> = rows.into_iter().filter(|c| c.active).collect();

        tracing::debug!("📊 Campus roster: {} rows, {} active", total, active.len());
        Ok(active)
    }
}
