use crate::core::stats::AttendanceSummary;
use crate::domain::model::{AttendanceRecord, TaskSubmission};
use crate::domain::ports::{AttendanceStore, IdentityProvider, ReportSink, TaskStore};
use crate::utils::error::{CheckError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Exports the signed-in student's attendance and submissions as a ZIP
/// bundle: `attendance.csv`, `summary.json` and (when any exist)
/// `submissions.json`.
pub struct ReportExporter<A, T, I, R> {
    attendance: A,
    tasks: T,
    identity: I,
    sink: R,
}

impl<A, T, I, R> ReportExporter<A, T, I, R>
where
    A: AttendanceStore,
    T: TaskStore,
    I: IdentityProvider,
    R: ReportSink,
{
    pub fn new(attendance: A, tasks: T, identity: I, sink: R) -> Self {
        Self {
            attendance,
            tasks,
            identity,
            sink,
        }
    }

    pub async fn export(&self) -> Result<String> {
        let user_id = self
            .identity
            .current_user()
            .ok_or(CheckError::NotSignedIn)?;

        let records = self.attendance.history_for(&user_id).await?;
        let submissions = self.tasks.submissions_for(&user_id).await?;
        let summary = AttendanceSummary::from_records(&records);

        tracing::info!(
            "🔄 Building report bundle for {}: {} records, {} submissions",
            user_id,
            records.len(),
            submissions.len()
        );

        let bundle = build_bundle(&user_id, &records, &summary, &submissions)?;

        let filename = format!(
            "attendance_{}_{}.zip",
            user_id,
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.sink.write_bundle(&filename, &bundle).await?;

        tracing::info!("📦 Report bundle saved: {}", path);
        Ok(path)
    }
}

fn build_bundle(
    user_id: &str,
    records: &[AttendanceRecord],
    summary: &AttendanceSummary,
    submissions: &[TaskSubmission],
) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("attendance.csv", FileOptions::default())?;
    zip.write_all(&attendance_csv(records)?)?;

    zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
    let summary_json = serde_json::json!({
        "user_id": user_id,
        "total_classes": summary.total_classes,
        "attended": summary.attended,
        "late": summary.late,
        "absent": summary.absent,
        "attendance_rate_percent": summary.attendance_rate_percent(),
        "generated_at": chrono::Utc::now().to_rfc3339(),
    });
    zip.write_all(serde_json::to_string_pretty(&summary_json)?.as_bytes())?;

    if !submissions.is_empty() {
        zip.start_file::<_, ()>("submissions.json", FileOptions::default())?;
        let json_data = serde_json::to_string_pretty(submissions)?;
        zip.write_all(json_data.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn attendance_csv(records: &[AttendanceRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        writer.serialize(record)?;
    }

    writer.into_inner().map_err(|e| CheckError::StoreError {
        message: format!("CSV buffer error: {}", e),
    })
}
