use std::sync::Arc;

use anyhow::Context;
use camera_dedup::{Cli, ConfigManager, DedupError, ErrorReporter, Pipeline, VerbosityLevel};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: VerbosityLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbosity());

    let config = ConfigManager::load_config(cli.verify_enabled())
        .context("Failed to load configuration")?;
    let reporter = Arc::new(ErrorReporter::new(cli.verbosity()));
    let pipeline = Pipeline::new(config, Arc::clone(&reporter))
        .context("Failed to initialize HTTP client")?;

    match pipeline.run(&cli.input).await {
        Ok(summary) => {
            reporter.report_summary(&summary, &pipeline.config().output_file);
            Ok(())
        }
        Err(DedupError::EmptyResult) => {
            reporter.report_empty_result();
            Ok(())
        }
        Err(e) if e.is_terminal_input_error() => {
            reporter.report_input_error(&e);
            reporter.report_empty_result();
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Camera deduplication failed"),
    }
}
