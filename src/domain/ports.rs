use crate::domain::model::{
    AttendanceRecord, CampusLocation, Coordinate, NewAttendance, NewSubmission, Task,
    TaskSubmission,
};
use crate::utils::error::{LocationError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Constraints a device fix must satisfy. Providers enforce these; the
/// workflow never retries or relaxes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Maximum age of a cached fix. Zero means a fresh reading.
    pub max_fix_age: Duration,
}

impl Default for FixRequest {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_fix_age: Duration::ZERO,
        }
    }
}

/// A positioning fix as delivered by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters, when the device reports one.
    pub accuracy_meters: Option<f64>,
}

/// Device positioning. Implementations decide how a fix is obtained
/// (GPS chip, fused provider, operator-entered coordinates).
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(
        &self,
        request: &FixRequest,
    ) -> std::result::Result<Fix, LocationError>;
}

/// Network attachment observation. Returns the identifier of the
/// network the device is on, or `None` when unknown or off-network.
#[async_trait]
pub trait NetworkObserver: Send + Sync {
    async fn current_network(&self) -> Option<String>;
}

/// The signed-in student, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

pub trait CampusDirectory: Send + Sync {
    /// Active campuses only; rows flagged inactive never reach callers.
    fn active_campuses(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<CampusLocation>>> + Send;
}

pub trait AttendanceStore: Send + Sync {
    fn append(
        &self,
        attendance: NewAttendance,
    ) -> impl std::future::Future<Output = Result<AttendanceRecord>> + Send;
    fn history_for(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<AttendanceRecord>>> + Send;
}

pub trait TaskStore: Send + Sync {
    fn tasks(&self) -> impl std::future::Future<Output = Result<Vec<Task>>> + Send;
    fn submissions_for(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<TaskSubmission>>> + Send;
    fn submit(
        &self,
        submission: NewSubmission,
    ) -> impl std::future::Future<Output = Result<TaskSubmission>> + Send;
}

pub trait ReportSink: Send + Sync {
    /// Writes a finished bundle and returns where it landed.
    fn write_bundle(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fix_request_demands_fresh_accurate_fix() {
        let request = FixRequest::default();
        assert!(request.high_accuracy);
        assert_eq!(request.timeout, Duration::from_secs(10));
        assert_eq!(request.max_fix_age, Duration::ZERO);
    }
}
