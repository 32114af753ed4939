use std::collections::HashMap;

use crate::camera::{CameraRecord, IdentityKey};

/// Deduplicated output collection
pub type CameraMap = HashMap<IdentityKey, CameraRecord>;

/// Fold keyed results into one record per identity key
///
/// Later entries overwrite earlier ones. When the dispatcher lets two same-key records through,
/// whichever completed last is the one kept.
pub fn deduplicate<I>(results: I) -> CameraMap
where
    I: IntoIterator<Item = (IdentityKey, CameraRecord)>,
{
    let mut cameras = CameraMap::new();
    for (key, record) in results {
        cameras.insert(key, record);
    }
    cameras
}
