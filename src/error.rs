use thiserror::Error;

use crate::config::ConfigError;
use crate::job_template::TemplateError;
use crate::mediaconvert::TranscodeError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("S3 event contains no records")]
    NoRecords,

    #[error("S3 event record has no {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
