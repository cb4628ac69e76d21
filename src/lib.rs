//! Lambda handlers that turn S3 uploads into MediaConvert jobs and
//! observe the resulting job state changes.

pub mod asset;
pub mod config;
pub mod error;
pub mod event_handler;
pub mod job_state;
pub mod job_template;
pub mod mediaconvert;
pub mod response;
