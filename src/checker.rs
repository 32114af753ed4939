//! Reachability Checker
//!
//! Decides, for one record, whether it survives into the output. Records are kept without a
//! network call when verification is off or when their category bypasses probing; otherwise a
//! single HEAD probe decides.

use std::sync::Arc;

use tracing::debug;

use crate::camera::CameraRecord;
use crate::config::PipelineConfig;
use crate::error::ProbeError;
use crate::http_client::UrlProbe;

/// Statuses treated as a reachable camera
pub const SUCCESSFUL_STATUSES: [u16; 3] = [200, 302, 301];

/// Result of checking a single record
#[derive(Debug)]
pub enum CheckOutcome {
    /// No network call was made
    Bypassed,
    /// The probe answered with an accepted status
    Reachable { status: u16 },
    /// The probe failed; the record must be dropped
    Unreachable { url: String, error: ProbeError },
}

impl CheckOutcome {
    pub fn is_kept(&self) -> bool {
        !matches!(self, CheckOutcome::Unreachable { .. })
    }
}

/// Runs the reachability policy against a `UrlProbe`
pub struct ReachabilityChecker {
    probe: Arc<dyn UrlProbe>,
    verify: bool,
    bypass_category: String,
}

impl ReachabilityChecker {
    pub fn new(probe: Arc<dyn UrlProbe>, config: &PipelineConfig) -> Self {
        Self {
            probe,
            verify: config.verify,
            bypass_category: config.bypass_category.clone(),
        }
    }

    /// True when the record is kept without probing
    pub fn bypasses(&self, record: &CameraRecord) -> bool {
        !self.verify || record.category() == Some(self.bypass_category.as_str())
    }

    /// Check one record. Never fails: probe errors become `CheckOutcome::Unreachable`.
    pub async fn check(&self, record: &CameraRecord) -> CheckOutcome {
        if self.bypasses(record) {
            debug!(name = ?record.name, "reachability check bypassed");
            return CheckOutcome::Bypassed;
        }

        let Some(url) = record.url.as_deref() else {
            return CheckOutcome::Unreachable {
                url: String::new(),
                error: ProbeError::MissingUrl,
            };
        };

        match self.probe.head_status(url).await {
            // 406 counts as reachable here only, not in SUCCESSFUL_STATUSES
            Ok(status) if SUCCESSFUL_STATUSES.contains(&status) || status == 406 => {
                debug!(url, status, "camera reachable");
                CheckOutcome::Reachable { status }
            }
            Ok(status) => CheckOutcome::Unreachable {
                url: url.to_string(),
                error: ProbeError::UnexpectedStatus { status },
            },
            Err(error) => CheckOutcome::Unreachable {
                url: url.to_string(),
                error,
            },
        }
    }
}
