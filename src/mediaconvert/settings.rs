//! Typed view of a MediaConvert job settings document.
//!
//! The documents use the field names of the MediaConvert JSON job
//! export. Only the subset below is understood; unknown fields are
//! rejected so a template can never lose settings silently.

use std::collections::BTreeMap;

use aws_sdk_mediaconvert::types::{
    AacCodingMode, AacSettings, AudioCodec, AudioCodecSettings, AudioDefaultSelection,
    AudioDescription, AudioSelector, CmafGroupSettings, ContainerSettings, ContainerType,
    DashIsoGroupSettings, FileGroupSettings, H264QvbrSettings, H264RateControlMode,
    H264SceneChangeDetect, H264Settings, HlsGroupSettings, Input, InputTimecodeSource,
    JobSettings, MsSmoothGroupSettings, Output, OutputGroup, OutputGroupSettings,
    OutputGroupType, TimecodeConfig, TimecodeSource, VideoCodec, VideoCodecSettings,
    VideoDescription, VideoSelector,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JobSettingsDoc {
    #[serde(default)]
    pub timecode_config: Option<TimecodeConfigDoc>,
    pub inputs: Vec<InputDoc>,
    pub output_groups: Vec<OutputGroupDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TimecodeConfigDoc {
    pub source: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InputDoc {
    pub file_input: String,
    #[serde(default)]
    pub timecode_source: Option<String>,
    #[serde(default)]
    pub video_selector: Option<VideoSelectorDoc>,
    #[serde(default)]
    pub audio_selectors: BTreeMap<String, AudioSelectorDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoSelectorDoc {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AudioSelectorDoc {
    #[serde(default)]
    pub default_selection: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OutputGroupDoc {
    #[serde(default)]
    pub name: Option<String>,
    pub output_group_settings: OutputGroupSettingsDoc,
    #[serde(default)]
    pub outputs: Vec<OutputDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OutputGroupSettingsDoc {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub hls_group_settings: Option<HlsGroupDoc>,
    #[serde(default)]
    pub dash_iso_group_settings: Option<FragmentedGroupDoc>,
    #[serde(default)]
    pub cmaf_group_settings: Option<FragmentedGroupDoc>,
    #[serde(default)]
    pub ms_smooth_group_settings: Option<MsSmoothGroupDoc>,
    #[serde(default)]
    pub file_group_settings: Option<FileGroupDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct HlsGroupDoc {
    pub destination: String,
    #[serde(default)]
    pub segment_length: Option<i32>,
    #[serde(default)]
    pub min_segment_length: Option<i32>,
}

/// Shared by the DASH ISO and CMAF groups.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FragmentedGroupDoc {
    pub destination: String,
    #[serde(default)]
    pub segment_length: Option<i32>,
    #[serde(default)]
    pub fragment_length: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MsSmoothGroupDoc {
    pub destination: String,
    #[serde(default)]
    pub fragment_length: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FileGroupDoc {
    pub destination: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OutputDoc {
    #[serde(default)]
    pub name_modifier: Option<String>,
    #[serde(default)]
    pub container_settings: Option<ContainerSettingsDoc>,
    #[serde(default)]
    pub video_description: Option<VideoDescriptionDoc>,
    #[serde(default)]
    pub audio_descriptions: Vec<AudioDescriptionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ContainerSettingsDoc {
    pub container: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VideoDescriptionDoc {
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    pub codec_settings: VideoCodecDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VideoCodecDoc {
    pub codec: String,
    #[serde(default, rename = "H264Settings")]
    pub h264_settings: Option<H264Doc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct H264Doc {
    #[serde(default)]
    pub rate_control_mode: Option<String>,
    #[serde(default)]
    pub bitrate: Option<i32>,
    #[serde(default)]
    pub max_bitrate: Option<i32>,
    #[serde(default)]
    pub scene_change_detect: Option<String>,
    #[serde(default)]
    pub qvbr_settings: Option<QvbrDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct QvbrDoc {
    pub qvbr_quality_level: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AudioDescriptionDoc {
    #[serde(default)]
    pub audio_source_name: Option<String>,
    pub codec_settings: AudioCodecDoc,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AudioCodecDoc {
    pub codec: String,
    #[serde(default)]
    pub aac_settings: Option<AacDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AacDoc {
    #[serde(default)]
    pub bitrate: Option<i32>,
    #[serde(default)]
    pub coding_mode: Option<String>,
    #[serde(default)]
    pub sample_rate: Option<i32>,
}

/// Converts a rendered settings document into the SDK's `JobSettings`.
pub fn job_settings(document: &Value) -> Result<JobSettings, serde_json::Error> {
    let doc = JobSettingsDoc::deserialize(document)?;
    Ok(doc.into())
}

impl From<JobSettingsDoc> for JobSettings {
    fn from(doc: JobSettingsDoc) -> Self {
        let timecode = doc.timecode_config.map(|tc| {
            TimecodeConfig::builder()
                .source(TimecodeSource::from(tc.source.as_str()))
                .build()
        });
        JobSettings::builder()
            .set_timecode_config(timecode)
            .set_inputs(Some(doc.inputs.into_iter().map(Input::from).collect()))
            .set_output_groups(Some(
                doc.output_groups.into_iter().map(OutputGroup::from).collect(),
            ))
            .build()
    }
}

impl From<InputDoc> for Input {
    fn from(doc: InputDoc) -> Self {
        let mut builder = Input::builder()
            .file_input(doc.file_input)
            .set_timecode_source(
                doc.timecode_source
                    .as_deref()
                    .map(InputTimecodeSource::from),
            )
            .set_video_selector(doc.video_selector.map(|_| VideoSelector::builder().build()));
        for (name, selector) in doc.audio_selectors {
            let selector = AudioSelector::builder()
                .set_default_selection(
                    selector
                        .default_selection
                        .as_deref()
                        .map(AudioDefaultSelection::from),
                )
                .build();
            builder = builder.audio_selectors(name, selector);
        }
        builder.build()
    }
}

impl From<OutputGroupDoc> for OutputGroup {
    fn from(doc: OutputGroupDoc) -> Self {
        OutputGroup::builder()
            .set_name(doc.name)
            .output_group_settings(doc.output_group_settings.into())
            .set_outputs(Some(doc.outputs.into_iter().map(Output::from).collect()))
            .build()
    }
}

impl From<OutputGroupSettingsDoc> for OutputGroupSettings {
    fn from(doc: OutputGroupSettingsDoc) -> Self {
        let hls = doc.hls_group_settings.map(|g| {
            HlsGroupSettings::builder()
                .destination(g.destination)
                .set_segment_length(g.segment_length)
                .set_min_segment_length(g.min_segment_length)
                .build()
        });
        let dash = doc.dash_iso_group_settings.map(|g| {
            DashIsoGroupSettings::builder()
                .destination(g.destination)
                .set_segment_length(g.segment_length)
                .set_fragment_length(g.fragment_length)
                .build()
        });
        let cmaf = doc.cmaf_group_settings.map(|g| {
            CmafGroupSettings::builder()
                .destination(g.destination)
                .set_segment_length(g.segment_length)
                .set_fragment_length(g.fragment_length)
                .build()
        });
        let smooth = doc.ms_smooth_group_settings.map(|g| {
            MsSmoothGroupSettings::builder()
                .destination(g.destination)
                .set_fragment_length(g.fragment_length)
                .build()
        });
        let file = doc
            .file_group_settings
            .map(|g| FileGroupSettings::builder().destination(g.destination).build());

        OutputGroupSettings::builder()
            .r#type(OutputGroupType::from(doc.kind.as_str()))
            .set_hls_group_settings(hls)
            .set_dash_iso_group_settings(dash)
            .set_cmaf_group_settings(cmaf)
            .set_ms_smooth_group_settings(smooth)
            .set_file_group_settings(file)
            .build()
    }
}

impl From<OutputDoc> for Output {
    fn from(doc: OutputDoc) -> Self {
        let container = doc.container_settings.map(|c| {
            ContainerSettings::builder()
                .container(ContainerType::from(c.container.as_str()))
                .build()
        });
        Output::builder()
            .set_name_modifier(doc.name_modifier)
            .set_container_settings(container)
            .set_video_description(doc.video_description.map(VideoDescription::from))
            .set_audio_descriptions(Some(
                doc.audio_descriptions
                    .into_iter()
                    .map(AudioDescription::from)
                    .collect(),
            ))
            .build()
    }
}

impl From<VideoDescriptionDoc> for VideoDescription {
    fn from(doc: VideoDescriptionDoc) -> Self {
        let h264 = doc.codec_settings.h264_settings.map(|h| {
            H264Settings::builder()
                .set_rate_control_mode(h.rate_control_mode.as_deref().map(H264RateControlMode::from))
                .set_bitrate(h.bitrate)
                .set_max_bitrate(h.max_bitrate)
                .set_scene_change_detect(
                    h.scene_change_detect
                        .as_deref()
                        .map(H264SceneChangeDetect::from),
                )
                .set_qvbr_settings(h.qvbr_settings.map(|q| {
                    H264QvbrSettings::builder()
                        .qvbr_quality_level(q.qvbr_quality_level)
                        .build()
                }))
                .build()
        });
        let codec = VideoCodecSettings::builder()
            .codec(VideoCodec::from(doc.codec_settings.codec.as_str()))
            .set_h264_settings(h264)
            .build();
        VideoDescription::builder()
            .set_width(doc.width)
            .set_height(doc.height)
            .codec_settings(codec)
            .build()
    }
}

impl From<AudioDescriptionDoc> for AudioDescription {
    fn from(doc: AudioDescriptionDoc) -> Self {
        let aac = doc.codec_settings.aac_settings.map(|a| {
            AacSettings::builder()
                .set_bitrate(a.bitrate)
                .set_coding_mode(a.coding_mode.as_deref().map(AacCodingMode::from))
                .set_sample_rate(a.sample_rate)
                .build()
        });
        let codec = AudioCodecSettings::builder()
            .codec(AudioCodec::from(doc.codec_settings.codec.as_str()))
            .set_aac_settings(aac)
            .build();
        AudioDescription::builder()
            .set_audio_source_name(doc.audio_source_name)
            .codec_settings(codec)
            .build()
    }
}
