use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, tracing, Error};
use media_convert_lambda::config::ProcessEnv;
use media_convert_lambda::event_handler::function_handler;
use media_convert_lambda::mediaconvert::MediaConvertTranscoder;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let transcoder = MediaConvertTranscoder::new(&shared_config);
    run(service_fn(|event| function_handler(event, &transcoder, &ProcessEnv))).await
}
