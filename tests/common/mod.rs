//! Shared helpers for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use camera_dedup::{
    CameraRecord, ErrorReporter, Pipeline, PipelineConfig, ProbeError, UrlProbe, VerbosityLevel,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Probe with canned statuses per URL; unknown URLs fail as unreachable
pub struct StubProbe {
    statuses: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self {
            statuses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlProbe for StubProbe {
    async fn head_status(&self, url: &str) -> Result<u16, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.statuses
            .get(url)
            .copied()
            .ok_or_else(|| ProbeError::InvalidUrl {
                url: url.to_string(),
                details: "no canned response".to_string(),
            })
    }
}

/// Build a pipeline writing into `output_dir`
pub fn pipeline_with_probe(
    probe: Arc<dyn UrlProbe>,
    verify: bool,
    output_dir: &Path,
) -> Pipeline {
    let config = PipelineConfig {
        verify,
        output_file: output_dir.join(camera_dedup::OUTPUT_FILE_NAME),
        ..Default::default()
    };
    Pipeline::with_probe(
        config,
        probe,
        Arc::new(ErrorReporter::new(VerbosityLevel::Quiet)),
    )
}

/// Write an input document into `dir` and return its path
pub fn write_input(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Serve `status_line` to every connection until the runtime shuts down
pub async fn spawn_status_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}/", addr)
}

/// Absent attributes serialize as empty strings; compare records the way they round-trip
pub fn normalized(record: &CameraRecord) -> CameraRecord {
    let fill = |v: &Option<String>| Some(v.clone().unwrap_or_default());
    CameraRecord {
        name: fill(&record.name),
        kind: fill(&record.kind),
        url: fill(&record.url),
        cam_instance: fill(&record.cam_instance),
        username: fill(&record.username),
        password: fill(&record.password),
        enabled: fill(&record.enabled),
        set_names: fill(&record.set_names),
        bit_options: fill(&record.bit_options),
    }
}
