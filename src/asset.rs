//! Per-upload identity and the locations derived from it.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::config::DestinationLayout;

/// Identifier minted for every upload event. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for AssetId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

pub fn source_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

/// `s3://{bucket}/{prefix}/{asset_id}/{suffix}`, skipping absent segments.
pub fn destination_uri(bucket: &str, layout: &DestinationLayout, asset_id: &AssetId) -> String {
    let mut uri = format!("s3://{bucket}");
    if let Some(prefix) = &layout.prefix {
        uri.push('/');
        uri.push_str(prefix);
    }
    uri.push('/');
    uri.push_str(&asset_id.to_string());
    if let Some(suffix) = &layout.suffix {
        uri.push('/');
        uri.push_str(suffix);
    }
    uri
}

pub const ASSET_ID_KEY: &str = "assetID";
pub const APPLICATION_KEY: &str = "application";
pub const INPUT_KEY: &str = "input";
pub const OUTPUT_KEY: &str = "output";

/// User metadata attached to a job and echoed back in its state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub asset_id: AssetId,
    pub application: String,
    pub input: String,
    pub output: Option<String>,
}

impl JobMetadata {
    pub fn into_map(self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(ASSET_ID_KEY.to_string(), self.asset_id.to_string());
        map.insert(APPLICATION_KEY.to_string(), self.application);
        map.insert(INPUT_KEY.to_string(), self.input);
        if let Some(output) = self.output {
            map.insert(OUTPUT_KEY.to_string(), output);
        }
        map
    }
}
