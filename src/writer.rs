//! Sorted Writer
//!
//! Orders deduplicated cameras by identity key and serializes them as a flat XML document.
//! Every attribute is always emitted, in a fixed order, with absent values written as `""`.

use std::path::Path;

use crate::camera::{CameraRecord, IdentityKey};
use crate::dedup::CameraMap;
use crate::error::Result;

pub const ROOT_ELEMENT: &str = "cameras";

/// Escape a value for use inside a double-quoted XML attribute
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Cameras ordered by (name, url)
pub fn sorted_entries(cameras: &CameraMap) -> Vec<(&IdentityKey, &CameraRecord)> {
    let mut entries: Vec<_> = cameras.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Render one self-closing `camera` element
pub fn render_camera(record: &CameraRecord) -> String {
    let attributes = record
        .attributes()
        .iter()
        .map(|(name, value)| format!(r#"{}="{}""#, name, escape_attribute(value.unwrap_or(""))))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<camera {} />", attributes)
}

/// Render the whole output document
pub fn render_document(cameras: &CameraMap) -> String {
    let mut document = format!("<{}>\n", ROOT_ELEMENT);
    for (_, record) in sorted_entries(cameras) {
        document.push_str(&render_camera(record));
        document.push('\n');
    }
    document.push_str(&format!("</{}>\n", ROOT_ELEMENT));
    document
}

/// Write the sorted document to `path`, replacing any existing file
pub async fn write_cameras(cameras: &CameraMap, path: &Path) -> Result<()> {
    tokio::fs::write(path, render_document(cameras)).await?;
    Ok(())
}
