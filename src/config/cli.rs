use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "campus-check")]
#[command(about = "Location-verified student attendance and task tracking")]
pub struct Cli {
    /// Roster file with campus locations and the course plan
    #[arg(long, global = true, default_value = "roster.toml")]
    pub config: String,

    /// Directory holding the attendance and submission logs
    #[arg(long, global = true, default_value = "./data")]
    pub data_dir: String,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON logs
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify presence at the nearest campus and record attendance
    CheckIn {
        /// Reported device latitude in degrees
        #[arg(long)]
        lat: f64,
        /// Reported device longitude in degrees
        #[arg(long)]
        lon: f64,
        /// Network identifier the device is attached to
        #[arg(long)]
        ssid: Option<String>,
        /// Student identifier
        #[arg(long)]
        student_id: String,
        /// Verify only; do not record attendance
        #[arg(long)]
        verify_only: bool,
    },
    /// Show recent attendance history
    History {
        /// Student identifier
        #[arg(long)]
        student_id: String,
        /// Maximum records shown
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Attendance statistics
    Stats {
        /// Student identifier
        #[arg(long)]
        student_id: String,
    },
    /// List course tasks with their status
    Tasks {
        /// Student identifier
        #[arg(long)]
        student_id: String,
    },
    /// Submit a task
    Submit {
        /// Student identifier
        #[arg(long)]
        student_id: String,
        /// Task identifier from the course plan
        #[arg(long)]
        task_id: String,
        /// Submission text
        #[arg(long)]
        text: Option<String>,
        /// Attachment URL (http or https)
        #[arg(long)]
        attachment: Option<String>,
    },
    /// Export the attendance report bundle
    Export {
        /// Student identifier
        #[arg(long)]
        student_id: String,
        /// Output directory for the bundle
        #[arg(long, default_value = "./output")]
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_in_flags() {
        let cli = Cli::try_parse_from([
            "campus-check",
            "check-in",
            "--lat",
            "13.7563",
            "--lon",
            "100.5018",
            "--ssid",
            "MAIN-WIFI",
            "--student-id",
            "student-1",
        ])
        .unwrap();

        match cli.command {
            Commands::CheckIn {
                lat,
                lon,
                ssid,
                student_id,
                verify_only,
            } => {
                assert_eq!(lat, 13.7563);
                assert_eq!(lon, 100.5018);
                assert_eq!(ssid.as_deref(), Some("MAIN-WIFI"));
                assert_eq!(student_id, "student-1");
                assert!(!verify_only);
            }
            other => panic!("expected check-in, got {:?}", other),
        }
        assert_eq!(cli.config, "roster.toml");
    }

    #[test]
    fn test_history_limit_defaults_to_dashboard_window() {
        let cli = Cli::try_parse_from(["campus-check", "history", "--student-id", "student-1"])
            .unwrap();

        match cli.command {
            Commands::History { limit, .. } => assert_eq!(limit, 20),
            other => panic!("expected history, got {:?}", other),
        }
        assert_eq!(cli.data_dir, "./data");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "campus-check",
            "stats",
            "--student-id",
            "student-1",
            "--config",
            "deploy/roster.toml",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(cli.config, "deploy/roster.toml");
        assert!(cli.verbose);
    }
}
