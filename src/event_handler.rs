use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::tracing::{self, field, Instrument};
use lambda_runtime::{Error, LambdaEvent};

use crate::asset::{destination_uri, source_uri, AssetId, JobMetadata};
use crate::config::{Environment, Settings};
use crate::error::{HandlerError, Result};
use crate::job_template::JobTemplate;
use crate::mediaconvert::{JobRequest, Transcoder};
use crate::response::HandlerResponse;

/// Bucket and key of the object that triggered the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub bucket: String,
    pub key: String,
}

fn get_uploaded_object(event: &S3Event) -> Result<UploadedObject> {
    let record = event.records.first().ok_or(HandlerError::NoRecords)?;
    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .ok_or(HandlerError::MissingField("bucket name"))?;
    let key = record
        .s3
        .object
        .key
        .as_deref()
        .map(decode_object_key)
        .ok_or(HandlerError::MissingField("object key"))?;
    Ok(UploadedObject { bucket, key })
}

/// S3 notifications form-encode object keys. `&` and `=` always arrive
/// escaped, so the key parses as a single form field name.
fn decode_object_key(raw: &str) -> String {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(name, value)| {
            if value.is_empty() {
                name.into_owned()
            } else {
                format!("{name}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn submit_transcode<T: Transcoder, E: Environment>(
    event: &S3Event,
    transcoder: &T,
    env: &E,
) -> Result<HandlerResponse> {
    let object = get_uploaded_object(event)?;
    tracing::info!(bucket = %object.bucket, key = %object.key, "media created");

    let settings = Settings::from_env(env)?;

    let asset_id = AssetId::generate();
    tracing::Span::current().record("asset_id", field::display(&asset_id));

    let source = source_uri(&object.bucket, &object.key);
    let destination = destination_uri(&settings.output_bucket, &settings.layout, &asset_id);
    tracing::info!(source = %source, destination = %destination, "computed job locations");

    let template = JobTemplate::load(&settings.template).await?;
    let job_settings = template.render(&source, &destination)?;

    let metadata = JobMetadata {
        asset_id,
        application: settings.application.clone(),
        input: source,
        output: Some(destination),
    };
    let request = JobRequest {
        role: settings.role_arn.clone(),
        user_metadata: metadata.into_map(),
        settings: job_settings,
    };
    tracing::debug!(metadata = ?request.user_metadata, "submitting job");

    let job = transcoder.submit(&settings.region, request).await?;
    tracing::info!(
        job_id = job.job.id.as_deref().unwrap_or_default(),
        status = job.job.status.as_deref().unwrap_or_default(),
        "job created"
    );

    Ok(HandlerResponse::ok(&job)?.with_json_headers())
}

pub async fn function_handler<T: Transcoder, E: Environment>(
    event: LambdaEvent<S3Event>,
    transcoder: &T,
    env: &E,
) -> std::result::Result<HandlerResponse, Error> {
    let span = tracing::info_span!(
        "media_created",
        request_id = %event.context.request_id,
        asset_id = field::Empty,
    );
    let payload = event.payload;
    if payload.records.len() > 1 {
        tracing::warn!(
            records = payload.records.len(),
            "only the first S3 record is transcoded"
        );
    }
    let response = submit_transcode(&payload, transcoder, env)
        .instrument(span)
        .await?;
    Ok(response)
}
