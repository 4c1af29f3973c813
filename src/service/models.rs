// Data models: yt-dlp metadata input, request descriptor, selection output

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// URL query marker yt-dlp leaves on the original (non-dubbed) audio track
const ORIGINAL_AUDIO_MARKER: &str = "acont%3Doriginal";

/// Check whether a URL points at an HLS manifest instead of a progressive stream
pub fn is_hls_url(url: &str) -> bool {
    url.contains(".m3u8") || url.contains("/manifest/hls")
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Video info document produced by `yt-dlp --dump-json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub is_live: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: Vec<FormatDescriptor>,
    pub subtitles: Option<HashMap<String, Vec<CaptionTrack>>>,
    pub automatic_captions: Option<HashMap<String, Vec<CaptionTrack>>>,
    pub thumbnail: Option<String>,
}

impl MetadataRecord {
    pub fn is_live(&self) -> bool {
        self.is_live.unwrap_or(false)
    }

    /// Uploader name, falling back to channel name; empty names count as absent
    pub fn author_name(&self) -> Option<&str> {
        [self.uploader.as_deref(), self.channel.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
    }
}

/// One stream entry of the `formats` array
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: Option<String>,
    pub url: Option<String>,
    /// Video codec (avc1.64001F, vp9, av01.0.08M.08, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a.40.2, opus, none)
    pub acodec: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ext: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    pub language: Option<String>,
    /// Higher means more preferred; positive values mark the original track
    pub language_preference: Option<i64>,
}

impl FormatDescriptor {
    pub fn is_video_capable(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn is_audio_capable(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    /// Audio stream without a video track
    pub fn is_pure_audio(&self) -> bool {
        self.is_audio_capable() && !self.is_video_capable()
    }

    /// Has a direct progressive URL
    pub fn is_usable(&self) -> bool {
        self.url.as_deref().map_or(false, |url| !is_hls_url(url))
    }

    /// Heuristic for the source-language audio track
    pub fn is_original_audio(&self) -> bool {
        self.language_preference.map_or(false, |pref| pref > 0)
            || self
                .url
                .as_deref()
                .map_or(false, |url| url.contains(ORIGINAL_AUDIO_MARKER))
    }

    /// Audio label used for the output file: webm carries opus, everything else m4a
    pub fn audio_label(&self) -> &'static str {
        if self.ext == "webm" {
            "opus"
        } else {
            "m4a"
        }
    }

    pub fn height_or_zero(&self) -> u32 {
        self.height.unwrap_or(0)
    }
}

/// Subtitle or automatic caption track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionTrack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ext: String,
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Requested video quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawQuality")]
pub enum Quality {
    /// Highest available resolution
    #[default]
    Max,
    /// Target height in pixels (e.g. 720)
    Height(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuality {
    Number(u32),
    Text(String),
}

impl TryFrom<RawQuality> for Quality {
    type Error = String;

    fn try_from(raw: RawQuality) -> Result<Self, Self::Error> {
        match raw {
            RawQuality::Number(height) => Ok(Self::Height(height)),
            RawQuality::Text(text) => text.parse(),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        s.trim_end_matches('p')
            .parse::<u32>()
            .map(Self::Height)
            .map_err(|_| format!("Invalid quality: {}", s))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Height(height) => write!(f, "{}", height),
        }
    }
}

/// Heights go out as numbers, `Max` as the string "max"
impl Serialize for Quality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Max => serializer.serialize_str("max"),
            Self::Height(height) => serializer.serialize_u32(*height),
        }
    }
}

/// Requested video codec family
///
/// Names other than h264, av1 and vp9 are kept verbatim in `Other` so the
/// request echoes back unchanged; they select like H.264.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Codec {
    #[default]
    H264,
    Av1,
    Vp9,
    Other(String),
}

impl Codec {
    /// Name as given by the caller
    pub fn as_str(&self) -> &str {
        match self {
            Self::H264 => "h264",
            Self::Av1 => "av1",
            Self::Vp9 => "vp9",
            Self::Other(name) => name,
        }
    }

    /// Codec family used for selection and labels
    pub fn family(&self) -> &'static str {
        match self {
            Self::Av1 => "av1",
            Self::Vp9 => "vp9",
            Self::H264 | Self::Other(_) => "h264",
        }
    }
}

impl From<&str> for Codec {
    fn from(s: &str) -> Self {
        match s {
            "h264" => Self::H264,
            "av1" => Self::Av1,
            "vp9" => Self::Vp9,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Codec {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Codec> for String {
    fn from(codec: Codec) -> Self {
        match codec {
            Codec::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Output container preference
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Container {
    /// Use the codec profile's default container
    #[default]
    Auto,
    Explicit(String),
}

impl From<&str> for Container {
    fn from(s: &str) -> Self {
        if s.is_empty() || s == "auto" {
            Self::Auto
        } else {
            Self::Explicit(s.to_string())
        }
    }
}

impl From<String> for Container {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Container> for String {
    fn from(container: Container) -> Self {
        match container {
            Container::Auto => "auto".to_string(),
            Container::Explicit(ext) => ext,
        }
    }
}

/// What the caller asked for
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// YouTube video id
    pub id: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub codec: Codec,
    #[serde(default)]
    pub is_audio_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dub_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_lang: Option<String>,
    #[serde(default)]
    pub container: Container,
    /// Transport handle of the calling request (e.g. an outbound interface
    /// binding); never echoed back in results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatcher: Option<String>,
}

impl RequestDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn audio_only(mut self, enabled: bool) -> Self {
        self.is_audio_only = enabled;
        self
    }

    pub fn with_dub_lang(mut self, lang: Option<String>) -> Self {
        self.dub_lang = lang;
        self
    }

    pub fn with_subtitle_lang(mut self, lang: Option<String>) -> Self {
        self.subtitle_lang = lang;
        self
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Copy of the request safe to hand back to the caller
    pub fn original_request(&self) -> Self {
        Self {
            dispatcher: None,
            ..self.clone()
        }
    }
}

/// Attributes used to build the output filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilenameAttributes {
    pub service: String,
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_dub_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// Tags written into the output file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublanguage: Option<String>,
}

/// Audio-only result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSelection {
    pub is_audio_only: bool,
    pub urls: String,
    pub filename_attributes: FilenameAttributes,
    pub file_metadata: FileMetadata,
    /// "opus" or "m4a"
    pub best_audio: String,
    #[serde(rename = "isHLS")]
    pub is_hls: bool,
    pub original_request: RequestDescriptor,
    pub cover: String,
    pub crop_cover: bool,
}

/// Video + audio result, merged by the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSelection {
    /// [video, audio]
    pub urls: [String; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<String>,
    pub filename_attributes: FilenameAttributes,
    pub file_metadata: FileMetadata,
    #[serde(rename = "isHLS")]
    pub is_hls: bool,
    pub original_request: RequestDescriptor,
}

/// Successful selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionResult {
    Audio(AudioSelection),
    Merge(MergeSelection),
}

impl SelectionResult {
    pub fn original_request(&self) -> &RequestDescriptor {
        match self {
            Self::Audio(audio) => &audio.original_request,
            Self::Merge(merge) => &merge.original_request,
        }
    }

    pub fn filename_attributes(&self) -> &FilenameAttributes {
        match self {
            Self::Audio(audio) => &audio.filename_attributes,
            Self::Merge(merge) => &merge.filename_attributes,
        }
    }

    pub fn file_metadata(&self) -> &FileMetadata {
        match self {
            Self::Audio(audio) => &audio.file_metadata,
            Self::Merge(merge) => &merge.file_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ytdlp_format_entry() {
        let json = r#"{
            "format_id": "251",
            "url": "https://rr1.googlevideo.com/videoplayback?itag=251",
            "vcodec": "none",
            "acodec": "opus",
            "ext": "webm",
            "height": null,
            "abr": 129.5,
            "language": "en",
            "language_preference": -1,
            "protocol": "https"
        }"#;
        let format: FormatDescriptor = serde_json::from_str(json).unwrap();

        assert!(format.is_pure_audio());
        assert!(format.is_usable());
        assert!(!format.is_original_audio());
        assert_eq!(format.audio_label(), "opus");
    }

    #[test]
    fn test_hls_format_is_not_usable() {
        let format = FormatDescriptor {
            url: Some("https://manifest.googlevideo.com/api/manifest/hls_playlist/index.m3u8".into()),
            vcodec: Some("avc1.4d401f".into()),
            acodec: Some("mp4a.40.2".into()),
            ..Default::default()
        };
        assert!(!format.is_usable());
        assert!(!format.is_pure_audio());
    }

    #[test]
    fn test_record_tolerates_nulls() {
        let json = r#"{ "id": "abc", "formats": null, "is_live": null, "subtitles": {} }"#;
        let record: MetadataRecord = serde_json::from_str(json).unwrap();
        assert!(record.formats.is_empty());
        assert!(!record.is_live());
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "quality": "720",
            "codec": "hevc",
            "isAudioOnly": false,
            "container": "auto",
            "dispatcher": "eth0"
        }"#;
        let request: RequestDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(request.quality, Quality::Height(720));
        assert_eq!(request.codec, Codec::Other("hevc".to_string()));
        assert_eq!(request.codec.family(), "h264");
        assert_eq!(request.container, Container::Auto);
        assert_eq!(request.dispatcher.as_deref(), Some("eth0"));

        let echoed = serde_json::to_value(request.original_request()).unwrap();
        assert!(echoed.get("dispatcher").is_none());
        assert_eq!(echoed["codec"], "hevc");
    }

    #[test]
    fn test_original_request_round_trip() {
        let input = serde_json::json!({
            "id": "x",
            "quality": 720,
            "codec": "hevc",
            "isAudioOnly": false,
            "container": "auto",
            "dispatcher": "eth0"
        });
        let request: RequestDescriptor = serde_json::from_value(input.clone()).unwrap();

        let mut expected = input;
        expected.as_object_mut().unwrap().remove("dispatcher");
        assert_eq!(serde_json::to_value(request.original_request()).unwrap(), expected);

        let max = RequestDescriptor::new("x").with_codec(Codec::Vp9);
        let echoed = serde_json::to_value(max.original_request()).unwrap();
        assert_eq!(echoed["quality"], "max");
        assert_eq!(echoed["codec"], "vp9");
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("max".parse::<Quality>().unwrap(), Quality::Max);
        assert_eq!("1080p".parse::<Quality>().unwrap(), Quality::Height(1080));
        assert!("best".parse::<Quality>().is_err());
    }
}
