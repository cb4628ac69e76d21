//! Invocation settings read from the environment.
//!
//! Settings are resolved at the start of every invocation so that a
//! misconfigured function fails before it talks to MediaConvert.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    OutputBucket,
    LegacyOutputBucket,
    Region,
    LambdaRegion,
    RoleArn,
    OutputPrefix,
    OutputSuffix,
    ApplicationTag,
    TemplatePath,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::OutputBucket => "MEDIA_OUTPUT_BUCKET",
            EnvKey::LegacyOutputBucket => "MEDIA_BUCKET",
            EnvKey::Region => "MEDIA_CONVERT_REGION",
            EnvKey::LambdaRegion => "AWS_REGION",
            EnvKey::RoleArn => "MEDIA_CONVERT_ROLE_ARN",
            EnvKey::OutputPrefix => "OUTPUT_PREFIX",
            EnvKey::OutputSuffix => "OUTPUT_SUFFIX",
            EnvKey::ApplicationTag => "APPLICATION_TAG",
            EnvKey::TemplatePath => "JOB_TEMPLATE_PATH",
        }
    }
}

/// Source of configuration values.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    fn lookup(&self, key: EnvKey) -> Option<String> {
        self.var(key.as_str())
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

pub const DEFAULT_OUTPUT_PREFIX: &str = "output";
pub const DEFAULT_APPLICATION_TAG: &str = "media-convert-lambda";

/// Shape of the destination URI below the output bucket:
/// `{prefix}/{asset_id}/{suffix}`, with empty segments omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLayout {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Default for DestinationLayout {
    fn default() -> Self {
        Self {
            prefix: Some(DEFAULT_OUTPUT_PREFIX.to_string()),
            suffix: None,
        }
    }
}

/// Where the job template comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    #[default]
    Embedded,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_bucket: String,
    pub region: String,
    pub role_arn: String,
    pub layout: DestinationLayout,
    pub application: String,
    pub template: TemplateSource,
}

impl Settings {
    pub fn from_env(env: &impl Environment) -> Result<Self, ConfigError> {
        let output_bucket =
            first_present(env, &[EnvKey::OutputBucket, EnvKey::LegacyOutputBucket])
                .ok_or(ConfigError::Missing(EnvKey::OutputBucket.as_str()))?;
        let region = first_present(env, &[EnvKey::Region, EnvKey::LambdaRegion])
            .ok_or(ConfigError::Missing(EnvKey::Region.as_str()))?;
        let role_arn = first_present(env, &[EnvKey::RoleArn])
            .ok_or(ConfigError::Missing(EnvKey::RoleArn.as_str()))?;

        // An explicitly empty prefix drops the segment entirely.
        let prefix = match env.lookup(EnvKey::OutputPrefix) {
            Some(value) => path_segment(&value),
            None => Some(DEFAULT_OUTPUT_PREFIX.to_string()),
        };
        let suffix = env
            .lookup(EnvKey::OutputSuffix)
            .and_then(|value| path_segment(&value));

        let application = env
            .lookup(EnvKey::ApplicationTag)
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_APPLICATION_TAG.to_string());
        let template = env
            .lookup(EnvKey::TemplatePath)
            .and_then(non_empty)
            .map(|path| TemplateSource::File(PathBuf::from(path)))
            .unwrap_or_default();

        Ok(Self {
            output_bucket,
            region,
            role_arn,
            layout: DestinationLayout { prefix, suffix },
            application,
            template,
        })
    }
}

fn first_present(env: &impl Environment, keys: &[EnvKey]) -> Option<String> {
    keys.iter().find_map(|key| env.lookup(*key).and_then(non_empty))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn path_segment(value: &str) -> Option<String> {
    non_empty(value.trim().trim_matches('/').to_string())
}

#[cfg(test)]
pub(crate) fn test_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("MEDIA_OUTPUT_BUCKET", "out"),
            ("MEDIA_CONVERT_REGION", "ap-northeast-2"),
            ("MEDIA_CONVERT_ROLE_ARN", "arn:aws:iam::123456789012:role/MediaConvert"),
        ]
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_env(&test_env(&required())).unwrap();
        assert_eq!(settings.output_bucket, "out");
        assert_eq!(settings.region, "ap-northeast-2");
        assert_eq!(settings.layout, DestinationLayout::default());
        assert_eq!(settings.application, DEFAULT_APPLICATION_TAG);
        assert_eq!(settings.template, TemplateSource::Embedded);
    }

    #[test]
    fn test_legacy_names() {
        let env = test_env(&[
            ("MEDIA_BUCKET", "legacy-out"),
            ("AWS_REGION", "us-east-1"),
            ("MEDIA_CONVERT_ROLE_ARN", "arn:aws:iam::123456789012:role/MediaConvert"),
        ]);
        let settings = Settings::from_env(&env).unwrap();
        assert_eq!(settings.output_bucket, "legacy-out");
        assert_eq!(settings.region, "us-east-1");
    }

    #[test]
    fn test_current_name_wins_over_legacy() {
        let mut pairs = required();
        pairs.push(("MEDIA_BUCKET", "legacy-out"));
        let settings = Settings::from_env(&test_env(&pairs)).unwrap();
        assert_eq!(settings.output_bucket, "out");
    }

    #[test]
    fn test_missing_role() {
        let env = test_env(&required()[..2]);
        assert_eq!(
            Settings::from_env(&env),
            Err(ConfigError::Missing("MEDIA_CONVERT_ROLE_ARN"))
        );
    }

    #[test]
    fn test_layout_overrides() {
        let mut pairs = required();
        pairs.push(("OUTPUT_PREFIX", ""));
        pairs.push(("OUTPUT_SUFFIX", "/video/"));
        pairs.push(("JOB_TEMPLATE_PATH", "/opt/job.json"));
        let settings = Settings::from_env(&test_env(&pairs)).unwrap();
        assert_eq!(settings.layout.prefix, None);
        assert_eq!(settings.layout.suffix.as_deref(), Some("video"));
        assert_eq!(
            settings.template,
            TemplateSource::File(PathBuf::from("/opt/job.json"))
        );
    }
}
