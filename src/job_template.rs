//! Job configuration templating.
//!
//! A template is a MediaConvert job settings document with a single
//! input and a single output group. Rendering overwrites the input file
//! and the output group's packaging destination and leaves every other
//! value untouched.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::TemplateSource;

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/job.json");

const FILE_INPUT: &str = "/Inputs/0/FileInput";
const GROUP_SETTINGS: &str = "/OutputGroups/0/OutputGroupSettings";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read job template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed job template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("job template has no field at {0}")]
    MissingField(String),

    #[error("unsupported output group type: {0}")]
    UnsupportedGroup(String),
}

/// Packaging settings key for an output group `Type`.
pub fn group_settings_key(group_type: &str) -> Option<&'static str> {
    match group_type {
        "HLS_GROUP_SETTINGS" => Some("HlsGroupSettings"),
        "DASH_ISO_GROUP_SETTINGS" => Some("DashIsoGroupSettings"),
        "CMAF_GROUP_SETTINGS" => Some("CmafGroupSettings"),
        "MS_SMOOTH_GROUP_SETTINGS" => Some("MsSmoothGroupSettings"),
        "FILE_GROUP_SETTINGS" => Some("FileGroupSettings"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobTemplate {
    document: Value,
    destination: String,
}

impl JobTemplate {
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::parse(EMBEDDED_TEMPLATE)
    }

    pub async fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TemplateError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&raw)
    }

    pub async fn load(source: &TemplateSource) -> Result<Self, TemplateError> {
        match source {
            TemplateSource::Embedded => Self::embedded(),
            TemplateSource::File(path) => Self::from_file(path).await,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let document: Value = serde_json::from_str(raw)?;
        if document.pointer(FILE_INPUT).is_none() {
            return Err(TemplateError::MissingField(FILE_INPUT.to_string()));
        }

        let type_pointer = format!("{GROUP_SETTINGS}/Type");
        let group_type = document
            .pointer(&type_pointer)
            .and_then(Value::as_str)
            .ok_or_else(|| TemplateError::MissingField(type_pointer.clone()))?;
        let key = group_settings_key(group_type)
            .ok_or_else(|| TemplateError::UnsupportedGroup(group_type.to_string()))?;

        let destination = format!("{GROUP_SETTINGS}/{key}/Destination");
        if document.pointer(&destination).is_none() {
            return Err(TemplateError::MissingField(destination));
        }

        Ok(Self {
            document,
            destination,
        })
    }

    #[cfg(test)]
    fn document(&self) -> &Value {
        &self.document
    }

    /// JSON pointer of the packaging destination this template writes to.
    #[cfg(test)]
    fn destination_pointer(&self) -> &str {
        &self.destination
    }

    pub fn render(&self, source: &str, destination: &str) -> Result<Value, TemplateError> {
        let mut document = self.document.clone();
        overwrite(&mut document, FILE_INPUT, source)?;
        overwrite(&mut document, &self.destination, destination)?;
        Ok(document)
    }
}

fn overwrite(document: &mut Value, pointer: &str, value: &str) -> Result<(), TemplateError> {
    let slot = document
        .pointer_mut(pointer)
        .ok_or_else(|| TemplateError::MissingField(pointer.to_string()))?;
    *slot = Value::String(value.to_string());
    Ok(())
}
