use crate::domain::model::Coordinate;
use crate::domain::ports::{Fix, FixRequest, IdentityProvider, LocationProvider, NetworkObserver};
use crate::utils::error::LocationError;
use async_trait::async_trait;

/// Position supplied up front (CLI flags, kiosk calibration). The fix is
/// immediate, so the request constraints are trivially met.
#[derive(Debug, Clone)]
pub struct FixedPosition {
    coordinate: Coordinate,
    accuracy_meters: Option<f64>,
}

impl FixedPosition {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_meters: None,
        }
    }

    pub fn with_accuracy(coordinate: Coordinate, accuracy_meters: f64) -> Self {
        Self {
            coordinate,
            accuracy_meters: Some(accuracy_meters),
        }
    }
}

#[async_trait]
impl LocationProvider for FixedPosition {
    async fn current_position(&self, _request: &FixRequest) -> Result<Fix, LocationError> {
        Ok(Fix {
            coordinate: self.coordinate,
            accuracy_meters: self.accuracy_meters,
        })
    }
}

/// A positioning source that never answers. Stands in for devices with
/// no location hardware or with access switched off.
#[derive(Debug, Clone)]
pub struct UnavailablePosition {
    reason: String,
}

impl UnavailablePosition {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for UnavailablePosition {
    async fn current_position(&self, _request: &FixRequest) -> Result<Fix, LocationError> {
        Err(LocationError::Unsupported(self.reason.clone()))
    }
}

/// Network identifier as reported by the operator or a platform probe.
/// `ReportedNetwork::none()` models an off-network device.
#[derive(Debug, Clone, Default)]
pub struct ReportedNetwork {
    network_id: Option<String>,
}

impl ReportedNetwork {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: Some(network_id.into()),
        }
    }

    pub fn none() -> Self {
        Self { network_id: None }
    }
}

#[async_trait]
impl NetworkObserver for ReportedNetwork {
    async fn current_network(&self) -> Option<String> {
        self.network_id.clone()
    }
}

/// Identity fixed at startup. A kiosk binds this to the badge reader;
/// the CLI binds it to --student-id.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        self.user_id.clone()
    }
}
