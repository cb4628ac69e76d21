//! MediaConvert job state change notifications.
//!
//! MediaConvert owns the job lifecycle
//! (`SUBMITTED -> PROGRESSING -> COMPLETE | ERROR | CANCELED`); this
//! handler only observes it. Every notification is echoed back
//! unchanged. When the document matches the expected shape the status is
//! classified and logged against the asset it was submitted for.

use std::collections::HashMap;

use lambda_runtime::tracing::{self, Instrument};
use lambda_runtime::{Error, LambdaEvent};
use serde::Deserialize;
use serde_json::Value;

use crate::asset::ASSET_ID_KEY;
use crate::response::HandlerResponse;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Submitted,
    Progressing,
    Complete,
    Error,
    Canceled,
    StatusUpdate,
    InputInformation,
    NewWarning,
    Other(String),
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "SUBMITTED" => JobStatus::Submitted,
            "PROGRESSING" => JobStatus::Progressing,
            "COMPLETE" => JobStatus::Complete,
            "ERROR" => JobStatus::Error,
            "CANCELED" => JobStatus::Canceled,
            "STATUS_UPDATE" => JobStatus::StatusUpdate,
            "INPUT_INFORMATION" => JobStatus::InputInformation,
            "NEW_WARNING" => JobStatus::NewWarning,
            _ => JobStatus::Other(status),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStateChange {
    pub detail: JobStateDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStateDetail {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub user_metadata: HashMap<String, String>,
    #[serde(default)]
    pub output_group_details: Vec<OutputGroupDetail>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputGroupDetail {
    #[serde(default)]
    pub playlist_file_paths: Vec<String>,
    #[serde(default)]
    pub output_details: Vec<OutputDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDetail {
    #[serde(default)]
    pub output_file_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    InFlight,
    Ready { outputs: Vec<String> },
    Failed { code: Option<i64>, message: Option<String> },
    Canceled,
    Unrecognized(String),
}

impl JobStateDetail {
    pub fn asset_id(&self) -> Option<&str> {
        self.user_metadata.get(ASSET_ID_KEY).map(String::as_str)
    }

    pub fn outcome(&self) -> JobOutcome {
        match &self.status {
            JobStatus::Submitted
            | JobStatus::Progressing
            | JobStatus::StatusUpdate
            | JobStatus::InputInformation
            | JobStatus::NewWarning => JobOutcome::InFlight,
            JobStatus::Complete => JobOutcome::Ready {
                outputs: self.output_paths(),
            },
            JobStatus::Error => JobOutcome::Failed {
                code: self.error_code,
                message: self.error_message.clone(),
            },
            JobStatus::Canceled => JobOutcome::Canceled,
            JobStatus::Other(status) => JobOutcome::Unrecognized(status.clone()),
        }
    }

    /// Playlists first, then individual output files.
    fn output_paths(&self) -> Vec<String> {
        let playlists = self
            .output_group_details
            .iter()
            .flat_map(|group| group.playlist_file_paths.iter());
        let files = self
            .output_group_details
            .iter()
            .flat_map(|group| group.output_details.iter())
            .flat_map(|output| output.output_file_paths.iter());
        playlists.chain(files).cloned().collect()
    }
}

fn observe(event: &Value) {
    let change = match JobStateChange::deserialize(event) {
        Ok(change) => change.detail,
        Err(err) => {
            tracing::warn!(error = %err, "not a MediaConvert job state change, echoing only");
            return;
        }
    };
    let asset_id = change.asset_id().unwrap_or_default();
    match change.outcome() {
        JobOutcome::InFlight => {
            tracing::info!(job_id = %change.job_id, asset_id, status = ?change.status, "job in flight")
        }
        JobOutcome::Ready { outputs } => {
            tracing::info!(job_id = %change.job_id, asset_id, outputs = ?outputs, "asset ready")
        }
        JobOutcome::Failed { code, message } => tracing::warn!(
            job_id = %change.job_id,
            asset_id,
            code = ?code,
            message = message.as_deref().unwrap_or_default(),
            "job failed"
        ),
        JobOutcome::Canceled => {
            tracing::warn!(job_id = %change.job_id, asset_id, "job canceled")
        }
        JobOutcome::Unrecognized(status) => {
            tracing::warn!(job_id = %change.job_id, asset_id, status = %status, "unrecognized job status")
        }
    }
}

pub async fn function_handler(event: LambdaEvent<Value>) -> Result<HandlerResponse, Error> {
    let span = tracing::info_span!(
        "job_state_change",
        request_id = %event.context.request_id,
    );
    async move {
        tracing::info!(event = %event.payload, "job state change");
        observe(&event.payload);
        Ok::<_, Error>(HandlerResponse::ok(&event.payload)?)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::json;

    fn complete_event() -> Value {
        json!({
            "version": "0",
            "id": "7fb4aa47-dc53-891a-065f-810d8d7ac690",
            "detail-type": "MediaConvert Job State Change",
            "source": "aws.mediaconvert",
            "account": "123456789012",
            "time": "2023-12-01T09:52:14Z",
            "region": "ap-northeast-2",
            "resources": [
                "arn:aws:mediaconvert:ap-northeast-2:123456789012:jobs/1701424327145-85oi69"
            ],
            "detail": {
                "timestamp": 1701424334484_u64,
                "accountId": "123456789012",
                "queue": "arn:aws:mediaconvert:ap-northeast-2:123456789012:queues/Default",
                "jobId": "1701424327145-85oi69",
                "status": "COMPLETE",
                "userMetadata": {
                    "assetID": "daa6a1ab-f7bc-4459-9ed6-f490d00d0521",
                    "application": "media-convert-lambda",
                    "input": "s3://media-in/media/nyan_cat.mp4"
                },
                "outputGroupDetails": [{
                    "outputDetails": [{
                        "outputFilePaths": [
                            "s3://media-out/output/daa6a1ab-f7bc-4459-9ed6-f490d00d0521_720.m3u8"
                        ],
                        "durationInMs": 804,
                        "videoDetails": { "widthInPx": 1280, "heightInPx": 720, "averageBitrate": 4310208 }
                    }],
                    "playlistFilePaths": [
                        "s3://media-out/output/daa6a1ab-f7bc-4459-9ed6-f490d00d0521.m3u8"
                    ],
                    "type": "HLS_GROUP"
                }],
                "paddingInserted": 0,
                "blackVideoDetected": 0,
                "warnings": [{ "code": 230001, "count": 1 }, { "code": 230005, "count": 1 }]
            }
        })
    }

    fn lambda_event(payload: Value) -> LambdaEvent<Value> {
        LambdaEvent {
            payload,
            context: Context::default(),
        }
    }

    #[tokio::test]
    async fn test_echoes_event() {
        let event = complete_event();
        let response = function_handler(lambda_event(event.clone())).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.headers.is_empty());
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, event);
    }

    #[tokio::test]
    async fn test_echoes_unrelated_document() {
        let event = json!({ "detail-type": "Something Else", "detail": { "foo": [1, 2, 3] } });
        let response = function_handler(lambda_event(event.clone())).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(serde_json::from_str::<Value>(&response.body).unwrap(), event);
    }

    #[test]
    fn test_complete_is_ready() {
        let change = JobStateChange::deserialize(&complete_event()).unwrap().detail;
        assert_eq!(change.asset_id(), Some("daa6a1ab-f7bc-4459-9ed6-f490d00d0521"));
        assert_eq!(
            change.outcome(),
            JobOutcome::Ready {
                outputs: vec![
                    "s3://media-out/output/daa6a1ab-f7bc-4459-9ed6-f490d00d0521.m3u8".to_string(),
                    "s3://media-out/output/daa6a1ab-f7bc-4459-9ed6-f490d00d0521_720.m3u8"
                        .to_string(),
                ]
            }
        );
    }

    #[test]
    fn test_error_outcome() {
        let event = json!({
            "detail": {
                "jobId": "1701424327145-85oi69",
                "status": "ERROR",
                "errorCode": 1030,
                "errorMessage": "Unable to open input file",
                "userMetadata": { "assetID": "abc" }
            }
        });
        let change = JobStateChange::deserialize(&event).unwrap().detail;
        assert_eq!(
            change.outcome(),
            JobOutcome::Failed {
                code: Some(1030),
                message: Some("Unable to open input file".to_string()),
            }
        );
    }

    #[test]
    fn test_status_classification() {
        let cases = [
            ("SUBMITTED", JobOutcome::InFlight),
            ("PROGRESSING", JobOutcome::InFlight),
            ("STATUS_UPDATE", JobOutcome::InFlight),
            ("CANCELED", JobOutcome::Canceled),
            ("PAUSED", JobOutcome::Unrecognized("PAUSED".to_string())),
        ];
        for (status, expected) in cases {
            let event = json!({ "detail": { "jobId": "j", "status": status } });
            let change = JobStateChange::deserialize(&event).unwrap().detail;
            assert_eq!(change.outcome(), expected, "status {status}");
            assert_eq!(change.asset_id(), None);
        }
    }
}
