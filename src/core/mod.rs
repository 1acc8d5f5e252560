pub mod checkin;
pub mod report;
pub mod stats;
pub mod tasks;

pub use crate::domain::model::{AttendanceRecord, CampusLocation, Coordinate, VerificationResult};
pub use crate::domain::ports::{
    AttendanceStore, CampusDirectory, IdentityProvider, LocationProvider, NetworkObserver,
    ReportSink, TaskStore,
};
pub use crate::utils::error::Result;
