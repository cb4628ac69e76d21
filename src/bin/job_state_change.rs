use lambda_runtime::{run, service_fn, tracing, Error};
use media_convert_lambda::job_state::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    run(service_fn(function_handler)).await
}
