//! Concurrent Dispatcher
//!
//! Fans reachability checks out over a bounded set of tokio tasks and collects the kept
//! records, keyed by identity, in completion order.
//!
//! Before each submission the record's key is compared against keys that have already
//! completed as kept. The comparison is best-effort: two records sharing a key may both be
//! in flight if neither has finished yet, and both may come back kept. The deduplicator
//! settles that with last-write-wins.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::debug;

use crate::camera::{CameraRecord, IdentityKey};
use crate::checker::{CheckOutcome, ReachabilityChecker};
use crate::error::{DedupError, Result};
use crate::error_reporter::ErrorReporter;

/// Everything produced by one dispatch call
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Kept records in completion order
    pub kept: Vec<(IdentityKey, CameraRecord)>,
    /// Records dropped by a failed check
    pub unreachable: usize,
    /// Records never submitted because their key had already completed
    pub skipped_duplicates: usize,
}

/// Kept record, or `None` when the check dropped it
type TaskOutput = Option<(IdentityKey, CameraRecord)>;

/// Runs the checker over many records with bounded parallelism
pub struct ConcurrentDispatcher {
    checker: Arc<ReachabilityChecker>,
    reporter: Arc<ErrorReporter>,
    max_concurrent_checks: usize,
}

impl ConcurrentDispatcher {
    pub fn new(
        checker: Arc<ReachabilityChecker>,
        reporter: Arc<ErrorReporter>,
        max_concurrent_checks: usize,
    ) -> Self {
        Self {
            checker,
            reporter,
            max_concurrent_checks: max_concurrent_checks.max(1),
        }
    }

    /// Check every record and return the survivors
    ///
    /// All tasks are joined before this returns. If a task panics, the remaining tasks are
    /// aborted and awaited, then the panic surfaces as `DedupError::Concurrency`.
    pub async fn dispatch(&self, records: Vec<CameraRecord>) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();
        if records.is_empty() {
            return Ok(report);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_checks));
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut completed_keys: HashSet<IdentityKey> = HashSet::new();

        for record in records {
            // Wait for a free slot first so completions can land before the key check
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tasks.shutdown().await;
                    return Err(DedupError::Concurrency {
                        details: "Failed to acquire dispatch semaphore".to_string(),
                    });
                }
            };

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = Self::collect(joined, &mut report, &mut completed_keys) {
                    tasks.shutdown().await;
                    return Err(e);
                }
            }

            let key = record.identity_key();
            if completed_keys.contains(&key) {
                debug!(%key, "skipping record with an already completed key");
                report.skipped_duplicates += 1;
                continue;
            }

            let checker = Arc::clone(&self.checker);
            let reporter = Arc::clone(&self.reporter);
            tasks.spawn(async move {
                let _permit = permit;
                match checker.check(&record).await {
                    CheckOutcome::Unreachable { url, error } => {
                        reporter.report_probe_failure(&url, &error);
                        None
                    }
                    _ => Some((key, record)),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = Self::collect(joined, &mut report, &mut completed_keys) {
                tasks.shutdown().await;
                return Err(e);
            }
        }

        debug!(
            kept = report.kept.len(),
            unreachable = report.unreachable,
            skipped = report.skipped_duplicates,
            "dispatch complete"
        );
        Ok(report)
    }

    fn collect(
        joined: std::result::Result<TaskOutput, JoinError>,
        report: &mut DispatchReport,
        completed_keys: &mut HashSet<IdentityKey>,
    ) -> Result<()> {
        match joined.map_err(|e| DedupError::Concurrency {
            details: format!("Task join error: {}", e),
        })? {
            Some((key, record)) => {
                completed_keys.insert(key.clone());
                report.kept.push((key, record));
            }
            None => report.unreachable += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::VerbosityLevel;
    use crate::config::PipelineConfig;
    use crate::error::ProbeError;
    use crate::http_client::{MockUrlProbe, UrlProbe};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn camera(name: &str, url: &str) -> CameraRecord {
        CameraRecord {
            name: Some(name.to_string()),
            kind: Some("Fixed".to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn dispatcher(probe: Arc<dyn UrlProbe>, verify: bool, workers: usize) -> ConcurrentDispatcher {
        let checker = ReachabilityChecker::new(probe, &PipelineConfig::with_verify(verify));
        ConcurrentDispatcher::new(
            Arc::new(checker),
            Arc::new(ErrorReporter::new(VerbosityLevel::Quiet)),
            workers,
        )
    }

    /// Probe that records the peak number of overlapping calls
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl UrlProbe for ConcurrencyProbe {
        async fn head_status(&self, _url: &str) -> std::result::Result<u16, ProbeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(200)
        }
    }

    #[tokio::test]
    async fn test_dispatch_empty() {
        let d = dispatcher(Arc::new(MockUrlProbe::new()), true, 10);
        let report = d.dispatch(Vec::new()).await.unwrap();
        assert!(report.kept.is_empty());
        assert_eq!(report.unreachable, 0);
    }

    #[tokio::test]
    async fn test_dispatch_drops_unreachable() {
        let mut probe = MockUrlProbe::new();
        probe
            .expect_head_status()
            .returning(|url| Ok(if url.contains("good") { 200 } else { 404 }));

        let d = dispatcher(Arc::new(probe), true, 10);
        let report = d
            .dispatch(vec![
                camera("A", "http://good/a"),
                camera("B", "http://bad/b"),
                camera("C", "http://good/c"),
            ])
            .await
            .unwrap();

        let mut names: Vec<_> = report
            .kept
            .iter()
            .map(|(key, _)| key.name.clone().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(report.unreachable, 1);
    }

    #[tokio::test]
    async fn test_dispatch_pairs_records_with_their_keys() {
        let d = dispatcher(Arc::new(MockUrlProbe::new()), false, 10);
        let report = d
            .dispatch(vec![camera("A", "http://a"), camera("B", "http://b")])
            .await
            .unwrap();

        for (key, record) in &report.kept {
            assert_eq!(*key, record.identity_key());
        }
        assert_eq!(report.kept.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_respects_concurrency_bound() {
        let probe = Arc::new(ConcurrencyProbe {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay: Duration::from_millis(30),
        });

        let records = (0..25)
            .map(|i| camera(&format!("cam{i}"), &format!("http://h/{i}")))
            .collect();

        let d = dispatcher(probe.clone(), true, 4);
        let report = d.dispatch(records).await.unwrap();

        assert_eq!(report.kept.len(), 25);
        assert!(probe.peak.load(Ordering::SeqCst) <= 4);
        assert!(probe.peak.load(Ordering::SeqCst) >= 2);
        assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_after_completion_is_skipped() {
        // One worker: the first record completes before the duplicate is considered
        let d = dispatcher(Arc::new(MockUrlProbe::new()), false, 1);
        let report = d
            .dispatch(vec![
                camera("Cam1", "http://x"),
                camera("Other", "http://y"),
                camera("Cam1", "http://x"),
            ])
            .await
            .unwrap();

        let cam1_results = report
            .kept
            .iter()
            .filter(|(key, _)| key.name.as_deref() == Some("Cam1"))
            .count();
        assert_eq!(cam1_results, 1);
        assert_eq!(report.skipped_duplicates, 1);
        assert_eq!(report.kept.len(), 2);
    }

    #[tokio::test]
    async fn test_in_flight_duplicates_may_both_complete() {
        let probe = Arc::new(ConcurrencyProbe {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
        });

        let d = dispatcher(probe, true, 10);
        let report = d
            .dispatch(vec![camera("Cam1", "http://x"), camera("Cam1", "http://x")])
            .await
            .unwrap();

        // Both were submitted before either finished
        assert_eq!(report.skipped_duplicates, 0);
        assert_eq!(report.kept.len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_check_surfaces_as_concurrency_error() {
        struct PanicProbe;

        #[async_trait]
        impl UrlProbe for PanicProbe {
            async fn head_status(&self, _url: &str) -> std::result::Result<u16, ProbeError> {
                panic!("probe exploded");
            }
        }

        let d = dispatcher(Arc::new(PanicProbe), true, 2);
        let result = d.dispatch(vec![camera("A", "http://a")]).await;
        assert!(matches!(result, Err(DedupError::Concurrency { .. })));
    }

    #[tokio::test]
    async fn test_failed_dispatch_drains_remaining_checks() {
        struct InFlightGuard(Arc<AtomicUsize>);

        impl Drop for InFlightGuard {
            fn drop(&mut self) {
                self.0.fetch_sub(1, Ordering::SeqCst);
            }
        }

        /// Panics on "panic" URLs; stalls on everything else
        struct StallingProbe {
            in_flight: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl UrlProbe for StallingProbe {
            async fn head_status(&self, url: &str) -> std::result::Result<u16, ProbeError> {
                if url.contains("panic") {
                    panic!("check failed");
                }
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                let _guard = InFlightGuard(Arc::clone(&self.in_flight));
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(200)
            }
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let probe = StallingProbe {
            in_flight: Arc::clone(&in_flight),
        };

        let d = dispatcher(Arc::new(probe), true, 4);
        let result = d
            .dispatch(vec![
                camera("Slow1", "http://slow/1"),
                camera("Slow2", "http://slow/2"),
                camera("Boom", "http://panic/"),
            ])
            .await;

        assert!(matches!(result, Err(DedupError::Concurrency { .. })));
        // Stalled checks were cancelled and dropped before dispatch returned
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
