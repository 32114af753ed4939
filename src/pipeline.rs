//! Validate-and-deduplicate pipeline
//!
//! Extractor -> Dispatcher(Checker) -> Deduplicator -> Sorted Writer. Data only flows forward;
//! the only concurrent region is inside the dispatcher.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::checker::ReachabilityChecker;
use crate::config::PipelineConfig;
use crate::dedup::{CameraMap, deduplicate};
use crate::dispatcher::ConcurrentDispatcher;
use crate::error::{DedupError, Result};
use crate::error_reporter::{ErrorReporter, RunSummary};
use crate::extractor::RecordExtractor;
use crate::http_client::{HttpClientConfig, HttpProbe, UrlProbe};
use crate::writer::write_cameras;

/// Wires the pipeline stages together for one run
pub struct Pipeline {
    config: PipelineConfig,
    extractor: RecordExtractor,
    dispatcher: ConcurrentDispatcher,
}

impl Pipeline {
    /// Create a pipeline probing with a reqwest-backed `HttpProbe`
    pub fn new(config: PipelineConfig, reporter: Arc<ErrorReporter>) -> Result<Self> {
        let probe = HttpProbe::new(HttpClientConfig {
            timeout: config.probe_timeout,
            ..Default::default()
        })?;
        Ok(Self::with_probe(config, Arc::new(probe), reporter))
    }

    /// Create a pipeline with a caller-supplied probe
    pub fn with_probe(
        config: PipelineConfig,
        probe: Arc<dyn UrlProbe>,
        reporter: Arc<ErrorReporter>,
    ) -> Self {
        let checker = Arc::new(ReachabilityChecker::new(probe, &config));
        let dispatcher =
            ConcurrentDispatcher::new(checker, reporter, config.max_concurrent_checks);

        Self {
            config,
            extractor: RecordExtractor::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read, check and deduplicate the cameras in `input`
    pub async fn deduplicate_file(&self, input: &Path) -> Result<(CameraMap, RunSummary)> {
        let records = self.extractor.extract_file(input).await?;
        let total_records = records.len();

        let report = self.dispatcher.dispatch(records).await?;
        let cameras = deduplicate(report.kept);

        let summary = RunSummary {
            total_records,
            skipped_duplicates: report.skipped_duplicates,
            unreachable: report.unreachable,
            written: cameras.len(),
        };
        Ok((cameras, summary))
    }

    /// Full run: deduplicate `input` and write the configured output file
    ///
    /// Returns `DedupError::EmptyResult` without touching the output file when no camera
    /// survives.
    pub async fn run(&self, input: &Path) -> Result<RunSummary> {
        let (cameras, summary) = self.deduplicate_file(input).await?;
        if cameras.is_empty() {
            return Err(DedupError::EmptyResult);
        }

        write_cameras(&cameras, &self.config.output_file).await?;
        info!(
            written = summary.written,
            output = %self.config.output_file.display(),
            "deduplicated cameras written"
        );
        Ok(summary)
    }
}
