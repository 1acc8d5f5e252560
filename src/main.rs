use campus_check::adapters::device::{FixedPosition, ReportedNetwork, StaticIdentity};
use campus_check::adapters::storage::{JsonAttendanceStore, JsonTaskStore};
use campus_check::core::checkin::CheckInState;
use campus_check::core::stats::AttendanceSummary;
use campus_check::domain::model::Coordinate;
use campus_check::domain::ports::AttendanceStore;
use campus_check::utils::error::Result;
use campus_check::utils::logger;
use campus_check::utils::validation::{validate_path, Validate};
use campus_check::{
    CheckInWorkflow, Cli, Commands, LocalStorage, ReportExporter, RosterConfig, TaskService,
};
use chrono::Utc;
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_service_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting campus-check CLI");
    if cli.verbose {
        tracing::debug!("CLI options: {:?}", cli);
    }

    // 載入名冊
    let roster = match RosterConfig::from_file(&cli.config) {
        Ok(roster) => roster,
        Err(e) => {
            eprintln!("❌ Failed to load roster file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證名冊
    if let Err(e) = roster.validate() {
        tracing::error!("❌ Roster validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "✅ Roster '{}' loaded: {} campus locations, {} planned tasks",
        roster.app.name,
        roster.campuses.len(),
        roster.tasks.len()
    );

    if let Err(e) = run(cli, roster).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            campus_check::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
            campus_check::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
            campus_check::utils::error::ErrorSeverity::High => 1, // 處理錯誤
            campus_check::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: Cli, roster: RosterConfig) -> Result<()> {
    validate_path("data_dir", &cli.data_dir)?;

    // 本地資料檔：出席紀錄與作業繳交各一份 JSON
    let data_dir = Path::new(&cli.data_dir);
    let attendance = JsonAttendanceStore::new(data_dir.join("attendance.json"));
    let tasks = JsonTaskStore::new(roster.course_plan(), data_dir.join("submissions.json"));

    match cli.command {
        Commands::CheckIn {
            lat,
            lon,
            ssid,
            student_id,
            verify_only,
        } => {
            let fix_request = roster.fix_request();
            let network = match ssid {
                Some(ssid) => ReportedNetwork::new(ssid),
                None => ReportedNetwork::none(),
            };
            let workflow = CheckInWorkflow::new(
                FixedPosition::new(Coordinate::new(lat, lon)),
                network,
                roster,
                StaticIdentity::signed_in(student_id),
                attendance,
            )
            .with_fix_request(fix_request);

            if verify_only {
                match workflow.verify_location().await? {
                    CheckInState::Verified { verification, .. } => {
                        println!(
                            "✅ Within range of {} (~{}m of {}m allowed)",
                            verification.nearest.name,
                            verification.distance_rounded(),
                            verification.nearest.radius_meters
                        );
                        println!("  Method: {}", verification.method.as_str());
                    }
                    CheckInState::OutOfRange { verification, .. } => {
                        println!("🔶 {}", verification.out_of_range_message());
                    }
                    _ => {}
                }
                return Ok(());
            }

            match workflow.check_in().await? {
                CheckInState::AttendanceRecorded { record } => {
                    println!("✅ Attendance recorded: {} at {}", record.id, record.location_name);
                    println!(
                        "  Method: {}, status: {}",
                        record.method.as_str(),
                        record.status.as_str()
                    );
                }
                // 超出範圍是正常結果，不是錯誤
                CheckInState::OutOfRange { verification, .. } => {
                    println!("🔶 {}", verification.out_of_range_message());
                }
                _ => {}
            }
            Ok(())
        }
        Commands::History { student_id, limit } => {
            let history = attendance.history_for(&student_id).await?;
            if history.is_empty() {
                println!("📋 No attendance records for {}", student_id);
                return Ok(());
            }

            println!(
                "📋 Attendance history for {} ({} of {} shown):",
                student_id,
                history.len().min(limit),
                history.len()
            );
            for record in history.iter().take(limit) {
                println!(
                    "  {}  {}  {}  {} ({})",
                    record.check_in_time.format("%Y-%m-%d %H:%M"),
                    record.id,
                    record.location_name,
                    record.status.as_str(),
                    record.method.as_str()
                );
            }
            Ok(())
        }
        Commands::Stats { student_id } => {
            let history = attendance.history_for(&student_id).await?;
            let summary = AttendanceSummary::from_records(&history);

            println!("📊 Attendance stats for {}:", student_id);
            println!("  Total classes: {}", summary.total_classes);
            println!("  Present: {}", summary.attended);
            println!("  Late: {}", summary.late);
            println!("  Absent: {}", summary.absent);
            println!("  Attendance rate: {}%", summary.attendance_rate_percent());
            Ok(())
        }
        Commands::Tasks { student_id } => {
            let service = TaskService::new(tasks, StaticIdentity::signed_in(student_id));
            let overview = service.tasks_with_status(Utc::now()).await?;
            if overview.is_empty() {
                println!("📋 No tasks in the course plan");
                return Ok(());
            }

            println!("📋 Course tasks:");
            for entry in overview {
                let due = entry
                    .task
                    .due_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "no deadline".to_string());
                println!(
                    "  [{}] {}  due: {}  {}",
                    entry.task.id,
                    entry.task.title,
                    due,
                    entry.state.label()
                );
            }
            Ok(())
        }
        Commands::Submit {
            student_id,
            task_id,
            text,
            attachment,
        } => {
            let service = TaskService::new(tasks, StaticIdentity::signed_in(student_id));
            let stored = service
                .submit(&task_id, text.as_deref(), attachment.as_deref())
                .await?;

            println!("✅ Submission stored: {} for task {}", stored.id, stored.task_id);
            Ok(())
        }
        Commands::Export { student_id, output } => {
            validate_path("output", &output)?;

            let exporter = ReportExporter::new(
                attendance,
                tasks,
                StaticIdentity::signed_in(student_id),
                LocalStorage::new(output),
            );
            let output_path = exporter.export().await?;

            println!("✅ Report bundle exported");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
    }
}
