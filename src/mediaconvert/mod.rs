//! Job submission to AWS Elemental MediaConvert.

pub mod settings;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use aws_config::SdkConfig;
use aws_sdk_mediaconvert::config::Region;
use aws_sdk_mediaconvert::primitives::{DateTime, DateTimeFormat};
use aws_sdk_mediaconvert::types::Job;
use aws_sdk_mediaconvert::{Client, Config};
use lambda_runtime::tracing;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("job settings do not match the supported MediaConvert schema: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("MediaConvert request failed: {0}")]
    Service(#[from] aws_sdk_mediaconvert::Error),

    #[error("MediaConvert returned no endpoint for region {0}")]
    NoEndpoint(String),

    #[error("MediaConvert accepted the request but returned no job")]
    MissingJob,
}

/// Everything needed to create one transcoding job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub role: String,
    pub user_metadata: HashMap<String, String>,
    pub settings: Value,
}

/// The job handle returned on submission, shaped for the handler response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_update_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<JobTiming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub user_metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobTiming {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubmittedJob {
    pub job: JobDescription,
}

fn timestamp(at: Option<&DateTime>) -> Option<String> {
    at.and_then(|at| at.fmt(DateTimeFormat::DateTime).ok())
}

impl From<&Job> for JobDescription {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id().map(str::to_owned),
            arn: job.arn().map(str::to_owned),
            status: job.status().map(|status| status.as_str().to_owned()),
            queue: job.queue().map(str::to_owned),
            role: None,
            priority: job.priority(),
            status_update_interval: job
                .status_update_interval()
                .map(|interval| interval.as_str().to_owned()),
            created_at: timestamp(job.created_at()),
            timing: job.timing().map(|timing| JobTiming {
                submit_time: timestamp(timing.submit_time()),
                start_time: timestamp(timing.start_time()),
                finish_time: timestamp(timing.finish_time()),
            }),
            error_code: job.error_code(),
            error_message: job.error_message().map(str::to_owned),
            user_metadata: job
                .user_metadata()
                .map(|meta| meta.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        }
    }
}

/// Outbound seam of the upload handler.
pub trait Transcoder {
    fn submit(
        &self,
        region: &str,
        request: JobRequest,
    ) -> impl Future<Output = Result<SubmittedJob, TranscodeError>>;
}

/// Discovers the account endpoint for a region, then creates the job there.
#[derive(Debug, Clone)]
pub struct MediaConvertTranscoder {
    config: Config,
}

impl MediaConvertTranscoder {
    pub fn new(shared_config: &SdkConfig) -> Self {
        Self {
            config: Config::from(shared_config),
        }
    }

    fn regional_client(&self, region: &str) -> Client {
        let config = self
            .config
            .to_builder()
            .region(Region::new(region.to_owned()))
            .build();
        Client::from_conf(config)
    }

    #[allow(deprecated)]
    async fn discover_endpoint(
        &self,
        client: &Client,
        region: &str,
    ) -> Result<String, TranscodeError> {
        let output = client
            .describe_endpoints()
            .send()
            .await
            .map_err(aws_sdk_mediaconvert::Error::from)?;
        output
            .endpoints()
            .iter()
            .find_map(|endpoint| endpoint.url())
            .map(str::to_owned)
            .ok_or_else(|| TranscodeError::NoEndpoint(region.to_owned()))
    }
}

impl Transcoder for MediaConvertTranscoder {
    async fn submit(
        &self,
        region: &str,
        request: JobRequest,
    ) -> Result<SubmittedJob, TranscodeError> {
        // Validate the settings before any network call.
        let job_settings = settings::job_settings(&request.settings)?;

        let discovery = self.regional_client(region);
        let endpoint = self.discover_endpoint(&discovery, region).await?;
        tracing::info!(region, endpoint = %endpoint, "resolved MediaConvert endpoint");

        let client = Client::from_conf(
            discovery
                .config()
                .to_builder()
                .endpoint_url(endpoint)
                .build(),
        );
        let request_role = request.role.clone();
        let output = client
            .create_job()
            .role(request.role)
            .set_user_metadata(Some(request.user_metadata))
            .settings(job_settings)
            .send()
            .await
            .map_err(aws_sdk_mediaconvert::Error::from)?;

        let job = output.job().ok_or(TranscodeError::MissingJob)?;
        let mut job = JobDescription::from(job);
        // the job runs under the role it was submitted with
        job.role = Some(request_role);
        Ok(SubmittedJob { job })
    }
}
