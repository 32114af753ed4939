//! # camera-dedup Library
//!
//! Deduplicates camera configuration entries read from an XML file, optionally probing each
//! camera URL with bounded concurrency, and writes a sorted, cleaned XML file.

pub mod camera;
pub mod checker;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod error_reporter;
pub mod extractor;
pub mod http_client;
pub mod libxml2;
pub mod pipeline;
pub mod writer;

pub use camera::{ATTRIBUTE_NAMES, CameraRecord, IdentityKey};
pub use checker::{CheckOutcome, ReachabilityChecker, SUCCESSFUL_STATUSES};
pub use cli::{Cli, VerbosityLevel};
pub use config::{ConfigManager, EnvProvider, OUTPUT_FILE_NAME, PipelineConfig};
pub use dedup::{CameraMap, deduplicate};
pub use dispatcher::{ConcurrentDispatcher, DispatchReport};
pub use error::{ConfigError, DedupError, ProbeError};
pub use error_reporter::{ErrorReporter, RunSummary};
pub use extractor::RecordExtractor;
pub use http_client::{HttpClientConfig, HttpProbe, UrlProbe};
pub use libxml2::{LibXml2Error, LibXml2Wrapper};
pub use pipeline::Pipeline;
pub use writer::{escape_attribute, render_document, write_cameras};
