use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

/// Exit code for usage errors
pub const USAGE_EXIT_CODE: i32 = 1;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show terminal errors
    Quiet,
    /// Show per-record diagnostics
    #[default]
    Normal,
    /// Also show a run summary
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn default_log_filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "debug",
            VerbosityLevel::Debug => "trace",
        }
    }
}

/// Deduplicate camera configuration entries, optionally checking that each URL is reachable
#[derive(Parser, Debug, Clone)]
#[command(name = "camera-dedup")]
#[command(version)]
#[command(
    after_help = "Writes deduplicatedCameras.xml to the current directory.\n\nExample:\n  camera-dedup /path/to/cameras_config.xml t"
)]
pub struct Cli {
    /// Camera configuration XML file
    pub input: PathBuf,

    /// `t` to verify camera URLs, anything else to skip verification
    #[arg(value_name = "VERIFY(t/f)")]
    pub verify: String,

    /// Print a run summary and debug logging (-vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print terminal errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Parse process arguments, exiting with `USAGE_EXIT_CODE` on a usage error
    pub fn parse_args() -> Self {
        Self::try_parse().unwrap_or_else(|e| Self::exit_with_usage(e))
    }

    fn exit_with_usage(error: clap::Error) -> ! {
        match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
            _ => {
                let _ = error.print();
                std::process::exit(USAGE_EXIT_CODE);
            }
        }
    }

    /// Only the literal `t` enables verification
    pub fn verify_enabled(&self) -> bool {
        self.verify == "t"
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose > 1 {
            VerbosityLevel::Debug
        } else if self.verbose == 1 {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
