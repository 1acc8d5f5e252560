use crate::domain::geo;
use crate::domain::model::{
    AttendanceRecord, AttendanceStatus, NewAttendance, VerificationMethod, VerificationResult,
};
use crate::domain::ports::{
    AttendanceStore, CampusDirectory, Fix, FixRequest, IdentityProvider, LocationProvider,
    NetworkObserver,
};
use crate::utils::error::{CheckError, Result};

/// Check-in progress as an immutable value. Every transition produces a
/// new state; there is no shared mutable phase flag.
#[derive(Debug, Clone)]
pub enum CheckInState {
    Idle,
    LocatingDevice,
    Located {
        fix: Fix,
    },
    Verified {
        fix: Fix,
        verification: VerificationResult,
    },
    OutOfRange {
        fix: Fix,
        verification: VerificationResult,
    },
    AttendanceRecorded {
        record: AttendanceRecord,
    },
}

impl CheckInState {
    pub fn phase(&self) -> &'static str {
        match self {
            CheckInState::Idle => "idle",
            CheckInState::LocatingDevice => "locating",
            CheckInState::Located { .. } => "located",
            CheckInState::Verified { .. } => "verified",
            CheckInState::OutOfRange { .. } => "out_of_range",
            CheckInState::AttendanceRecorded { .. } => "recorded",
        }
    }

    /// Terminal states absorb further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckInState::OutOfRange { .. } | CheckInState::AttendanceRecorded { .. }
        )
    }

    pub fn verification(&self) -> Option<&VerificationResult> {
        match self {
            CheckInState::Verified { verification, .. }
            | CheckInState::OutOfRange { verification, .. } => Some(verification),
            _ => None,
        }
    }
}

/// Presence-verified attendance, generic over the device and data ports.
/// Stateless between calls; concurrent runs do not interfere.
pub struct CheckInWorkflow<L, N, D, I, S> {
    location: L,
    network: N,
    directory: D,
    identity: I,
    store: S,
    fix_request: FixRequest,
}

impl<L, N, D, I, S> CheckInWorkflow<L, N, D, I, S>
where
    L: LocationProvider,
    N: NetworkObserver,
    D: CampusDirectory,
    I: IdentityProvider,
    S: AttendanceStore,
{
    pub fn new(location: L, network: N, directory: D, identity: I, store: S) -> Self {
        Self {
            location,
            network,
            directory,
            identity,
            store,
            fix_request: FixRequest::default(),
        }
    }

    pub fn with_fix_request(mut self, fix_request: FixRequest) -> Self {
        self.fix_request = fix_request;
        self
    }

    /// Performs one transition. Terminal states come back unchanged.
    pub async fn advance(&self, state: CheckInState) -> Result<CheckInState> {
        match state {
            CheckInState::Idle => {
                tracing::info!("🚀 Starting presence check");
                Ok(CheckInState::LocatingDevice)
            }
            CheckInState::LocatingDevice => {
                // 定位是唯一的等待點，超時由 provider 負責
                tracing::info!(
                    "📡 Requesting device position (timeout {:?})",
                    self.fix_request.timeout
                );
                let fix = self.location.current_position(&self.fix_request).await?;
                tracing::debug!(
                    "✅ Fix acquired: ({}, {}), accuracy {:?}",
                    fix.coordinate.latitude,
                    fix.coordinate.longitude,
                    fix.accuracy_meters
                );
                Ok(CheckInState::Located { fix })
            }
            CheckInState::Located { fix } => {
                let verification = self.verify_against_directory(&fix).await?;
                if verification.within_range {
                    tracing::info!(
                        "✅ Within range of {}: ~{}m of {}m allowed",
                        verification.nearest.name,
                        verification.distance_rounded(),
                        verification.nearest.radius_meters
                    );
                    Ok(CheckInState::Verified { fix, verification })
                } else {
                    tracing::warn!("🔶 {}", verification.out_of_range_message());
                    Ok(CheckInState::OutOfRange { fix, verification })
                }
            }
            CheckInState::Verified { fix, verification } => {
                let record = self.record(&fix, &verification).await?;
                Ok(CheckInState::AttendanceRecorded { record })
            }
            terminal => Ok(terminal),
        }
    }

    /// Locates the device and verifies it against the active campus set.
    /// Stops before any write; `OutOfRange` is a normal outcome here.
    pub async fn verify_location(&self) -> Result<CheckInState> {
        let mut state = CheckInState::Idle;
        loop {
            state = self.advance(state).await?;
            if matches!(
                state,
                CheckInState::Verified { .. } | CheckInState::OutOfRange { .. }
            ) {
                return Ok(state);
            }
        }
    }

    /// Writes the attendance record for an in-range verification. Any
    /// other state is rejected; verification cannot be skipped.
    pub async fn record_attendance(&self, state: &CheckInState) -> Result<AttendanceRecord> {
        match state {
            CheckInState::Verified { fix, verification } => self.record(fix, verification).await,
            _ => Err(CheckError::NotVerified),
        }
    }

    /// Full run: locate, verify, and record when in range.
    pub async fn check_in(&self) -> Result<CheckInState> {
        let started = std::time::Instant::now();

        let mut state = CheckInState::Idle;
        while !state.is_terminal() {
            state = self.advance(state).await?;
        }

        tracing::info!(
            "📊 Check-in finished as '{}' in {:?}",
            state.phase(),
            started.elapsed()
        );
        Ok(state)
    }

    async fn verify_against_directory(&self, fix: &Fix) -> Result<VerificationResult> {
        let campuses = self.directory.active_campuses().await?;
        tracing::debug!("📊 {} active campus locations loaded", campuses.len());

        let (nearest, distance_meters) =
            geo::find_nearest(fix.coordinate, &campuses).ok_or(CheckError::NoCampusConfigured)?;

        let within_range = geo::is_within_range(fix.coordinate, &nearest);

        // 網路訊號只是輔助憑證，讀不到也不影響結果
        let observed_network = self.network.current_network().await;
        let method = match (&nearest.network_id, &observed_network) {
            (Some(expected), Some(observed)) if expected == observed => VerificationMethod::Both,
            _ => VerificationMethod::Location,
        };

        Ok(VerificationResult {
            nearest,
            distance_meters,
            within_range,
            network_id: observed_network,
            method,
        })
    }

    async fn record(
        &self,
        fix: &Fix,
        verification: &VerificationResult,
    ) -> Result<AttendanceRecord> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(CheckError::NotSignedIn)?;

        let record = self
            .store
            .append(NewAttendance {
                user_id,
                location_id: verification.nearest.id.clone(),
                location_name: verification.nearest.name.clone(),
                latitude: fix.coordinate.latitude,
                longitude: fix.coordinate.longitude,
                network_id: verification.network_id.clone(),
                method: verification.method,
                status: AttendanceStatus::Present,
            })
            .await?;

        tracing::info!(
            "💾 Attendance recorded: {} at {} via {}",
            record.id,
            record.location_name,
            record.method.as_str()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::device::{
        FixedPosition, ReportedNetwork, StaticIdentity, UnavailablePosition,
    };
    use crate::adapters::memory::MemoryAttendanceStore;
    use crate::domain::model::{CampusLocation, Coordinate};
    use crate::utils::error::LocationError;

    #[derive(Clone)]
    struct StaticDirectory {
        campuses: Vec<CampusLocation>,
    }

    impl CampusDirectory for StaticDirectory {
        async fn active_campuses(&self) -> Result<Vec<CampusLocation>> {
            Ok(self.campuses.clone())
        }
    }

    fn campus(id: &str, latitude: f64, longitude: f64, radius_meters: f64) -> CampusLocation {
        CampusLocation {
            id: id.to_string(),
            name: format!("{} Campus", id),
            latitude,
            longitude,
            radius_meters,
            network_id: None,
            active: true,
        }
    }

    fn main_campus() -> CampusLocation {
        let mut c = campus("main", 0.0, 0.0, 100.0);
        c.name = "Main Campus".to_string();
        c.network_id = Some("CAMPUS-WIFI".to_string());
        c
    }

    #[tokio::test]
    async fn test_in_range_check_in_records_present() {
        let store = MemoryAttendanceStore::new();
        let workflow = CheckInWorkflow::new(
            // ~55.6m north of center, inside the 100m radius
            FixedPosition::new(Coordinate::new(0.0005, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            store.clone(),
        );

        let state = workflow.check_in().await.unwrap();

        let record = match state {
            CheckInState::AttendanceRecorded { record } => record,
            other => panic!("expected AttendanceRecorded, got {}", other.phase()),
        };
        assert_eq!(record.user_id, "student-1");
        assert_eq!(record.location_id, "main");
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.method, VerificationMethod::Location);

        let history = store.history_for("student-1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
    }

    #[tokio::test]
    async fn test_out_of_range_is_a_terminal_outcome_not_an_error() {
        let store = MemoryAttendanceStore::new();
        let workflow = CheckInWorkflow::new(
            // ~1112m north of center, well past the 100m radius
            FixedPosition::new(Coordinate::new(0.01, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            store.clone(),
        );

        let state = workflow.check_in().await.unwrap();

        assert!(state.is_terminal());
        let verification = state.verification().expect("out-of-range keeps the result");
        assert!(!verification.within_range);
        assert_eq!(
            verification.out_of_range_message(),
            "You are ~1112m away from Main Campus. Please move closer to campus."
        );
        assert!(store.history_for("student-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matching_network_upgrades_method_to_both() {
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.0005, 0.0)),
            ReportedNetwork::new("CAMPUS-WIFI"),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let state = workflow.verify_location().await.unwrap();
        let verification = state.verification().unwrap();

        assert!(verification.within_range);
        assert_eq!(verification.method, VerificationMethod::Both);
        assert_eq!(verification.network_id.as_deref(), Some("CAMPUS-WIFI"));
    }

    #[tokio::test]
    async fn test_foreign_network_stays_location_only() {
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.0005, 0.0)),
            ReportedNetwork::new("COFFEE-SHOP"),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let state = workflow.verify_location().await.unwrap();
        let verification = state.verification().unwrap();

        assert_eq!(verification.method, VerificationMethod::Location);
        assert_eq!(verification.network_id.as_deref(), Some("COFFEE-SHOP"));
    }

    #[tokio::test]
    async fn test_nearest_campus_wins_even_when_out_of_range() {
        let workflow = CheckInWorkflow::new(
            // 0.4 degrees east of "a": ~44.5km to a, ~66.7km to b
            FixedPosition::new(Coordinate::new(0.0, 0.4)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![campus("a", 0.0, 0.0, 100.0), campus("b", 0.0, 1.0, 100.0)],
            },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let state = workflow.verify_location().await.unwrap();
        let verification = state.verification().unwrap();

        assert_eq!(verification.nearest.id, "a");
        assert!((verification.distance_meters - 44_478.0).abs() < 50.0);
    }

    #[tokio::test]
    async fn test_empty_directory_is_a_configuration_error() {
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.0, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory { campuses: vec![] },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let err = workflow.check_in().await.unwrap_err();
        assert!(matches!(err, CheckError::NoCampusConfigured));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_location_unavailable() {
        let workflow = CheckInWorkflow::new(
            UnavailablePosition::new("location access disabled"),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let err = workflow.check_in().await.unwrap_err();
        assert!(matches!(
            err,
            CheckError::LocationUnavailable(LocationError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_recording_requires_a_verified_state() {
        let store = MemoryAttendanceStore::new();
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.01, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            store.clone(),
        );

        let err = workflow
            .record_attendance(&CheckInState::Idle)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::NotVerified));

        // An out-of-range verification never turns into a record either.
        let out_of_range = workflow.verify_location().await.unwrap();
        let err = workflow.record_attendance(&out_of_range).await.unwrap_err();
        assert!(matches!(err, CheckError::NotVerified));
        assert!(store.history_for("student-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_user_cannot_record() {
        let store = MemoryAttendanceStore::new();
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.0005, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_out(),
            store.clone(),
        );

        let err = workflow.check_in().await.unwrap_err();
        assert!(matches!(err, CheckError::NotSignedIn));
        assert!(store.history_for("student-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_states_absorb_advance() {
        let workflow = CheckInWorkflow::new(
            FixedPosition::new(Coordinate::new(0.01, 0.0)),
            ReportedNetwork::none(),
            StaticDirectory {
                campuses: vec![main_campus()],
            },
            StaticIdentity::signed_in("student-1"),
            MemoryAttendanceStore::new(),
        );

        let terminal = workflow.check_in().await.unwrap();
        assert_eq!(terminal.phase(), "out_of_range");

        let after = workflow.advance(terminal.clone()).await.unwrap();
        assert_eq!(after.phase(), "out_of_range");
    }
}
