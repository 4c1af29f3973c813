// FormatSelector - picks the streams to hand to the downloader
//
// Handles:
// - Request validation (live, duration limit, id consistency)
// - Audio-only selection (highest bitrate, original track, dub override)
// - Video selection by codec family and requested quality tier
// - Subtitle lookup (manual tracks, then automatic captions)
// - Shaping of the final audio/merge result
//
// Everything here is a pure function of the metadata record and the request.

use tracing::debug;

use super::errors::{ErrorKind, SelectionError};
use super::metadata::build_file_metadata;
use super::models::{
    is_hls_url, AudioSelection, Codec, Container, FileMetadata, FilenameAttributes,
    FormatDescriptor, MergeSelection, MetadataRecord, Quality, RequestDescriptor,
    SelectionResult,
};
use super::quality::{normalize_quality, quality_label};

/// Codec tag and default container for a codec family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecProfile {
    /// Substring matched against a format's vcodec
    pub video_codec: &'static str,
    pub container: &'static str,
}

impl Codec {
    pub fn profile(&self) -> CodecProfile {
        match self {
            Codec::Av1 => CodecProfile {
                video_codec: "av01",
                container: "webm",
            },
            Codec::Vp9 => CodecProfile {
                video_codec: "vp9",
                container: "webm",
            },
            Codec::H264 | Codec::Other(_) => CodecProfile {
                video_codec: "avc",
                container: "mp4",
            },
        }
    }
}

/// Fallback cover when the record has no thumbnail
fn fallback_cover(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", video_id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Format selector for a single yt-dlp metadata record
pub struct FormatSelector;

impl FormatSelector {
    /// Validate the record and build the audio or merge result for `request`
    pub fn select(
        record: &MetadataRecord,
        request: &RequestDescriptor,
        duration_limit: u64,
    ) -> Result<SelectionResult, SelectionError> {
        Self::validate(record, &request.id, duration_limit)?;

        let file_metadata = build_file_metadata(record);
        let filename_attributes = FilenameAttributes {
            service: "youtube".to_string(),
            id: request.id.clone(),
            title: file_metadata.title.clone(),
            author: file_metadata.artist.clone(),
            youtube_dub_name: None,
            resolution: None,
            quality_label: None,
            youtube_format: None,
            extension: None,
        };

        if request.is_audio_only {
            Self::select_audio_only(record, request, filename_attributes, file_metadata)
                .map(SelectionResult::Audio)
        } else {
            Self::select_merge(record, request, filename_attributes, file_metadata)
                .map(SelectionResult::Merge)
        }
    }

    /// Reject live streams, overlong videos and records for the wrong video
    pub fn validate(
        record: &MetadataRecord,
        requested_id: &str,
        duration_limit: u64,
    ) -> Result<(), SelectionError> {
        if record.is_live() {
            return Err(ErrorKind::VideoLive.into());
        }

        if record
            .duration
            .map_or(false, |duration| duration > duration_limit as f64)
        {
            return Err(ErrorKind::TooLong.into());
        }

        if record.id != requested_id {
            debug!(
                requested = requested_id,
                returned = %record.id,
                "extractor returned metadata for a different video"
            );
            return Err(SelectionError::critical(ErrorKind::FetchFail));
        }

        Ok(())
    }

    /// Usable audio-only formats, best bitrate first
    pub fn audio_candidates(formats: &[FormatDescriptor]) -> Vec<&FormatDescriptor> {
        let mut candidates: Vec<&FormatDescriptor> = formats
            .iter()
            .filter(|f| f.is_pure_audio() && f.is_usable())
            .collect();

        candidates.sort_by(|a, b| b.abr.unwrap_or(0.0).total_cmp(&a.abr.unwrap_or(0.0)));
        candidates
    }

    /// Usable video formats of the codec family, tallest first, then by bitrate
    pub fn video_candidates<'a>(formats: &'a [FormatDescriptor], codec: &Codec) -> Vec<&'a FormatDescriptor> {
        let tag = codec.profile().video_codec;
        let mut candidates: Vec<&FormatDescriptor> = formats
            .iter()
            .filter(|f| {
                f.is_video_capable()
                    && f.is_usable()
                    && f.vcodec.as_deref().map_or(false, |v| v.contains(tag))
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.height_or_zero()
                .cmp(&a.height_or_zero())
                .then_with(|| b.tbr.unwrap_or(0.0).total_cmp(&a.tbr.unwrap_or(0.0)))
        });
        candidates
    }

    /// Original-language track if one is flagged, otherwise the best bitrate
    fn default_audio<'a>(candidates: &[&'a FormatDescriptor]) -> Option<&'a FormatDescriptor> {
        candidates
            .iter()
            .find(|f| f.is_original_audio())
            .or_else(|| candidates.first())
            .copied()
    }

    /// First usable audio-only format whose language starts with `lang`,
    /// searched in the record's own order
    fn find_dub<'a>(formats: &'a [FormatDescriptor], lang: &str) -> Option<&'a FormatDescriptor> {
        formats.iter().find(|f| {
            f.is_pure_audio()
                && f.is_usable()
                && f.language.as_deref().map_or(false, |l| l.starts_with(lang))
        })
    }

    /// Default audio pick with the dub override applied.
    /// Returns the format and whether it came from the dub lookup.
    fn pick_audio<'a>(
        formats: &'a [FormatDescriptor],
        candidates: &[&'a FormatDescriptor],
        dub_lang: Option<&str>,
    ) -> Option<(&'a FormatDescriptor, bool)> {
        if let Some(lang) = non_empty(dub_lang) {
            if let Some(dub) = Self::find_dub(formats, lang) {
                debug!(lang, language = ?dub.language, "using dubbed audio track");
                return Some((dub, true));
            }
            debug!(lang, "no dubbed audio track, keeping default");
        }

        Self::default_audio(candidates).map(|f| (f, false))
    }

    /// Choose the video stream for a quality request.
    ///
    /// Exact tier match first, then the tallest entry not above the request,
    /// then the lowest entry available. Never upgrades past the request unless
    /// nothing lower exists.
    pub fn pick_video<'a>(
        candidates: &[&'a FormatDescriptor],
        quality: Quality,
    ) -> Option<&'a FormatDescriptor> {
        match quality {
            Quality::Max => candidates.first().copied(),
            Quality::Height(target) => candidates
                .iter()
                .find(|f| normalize_quality(f.height_or_zero()) == target)
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|f| f.height.map_or(false, |h| h <= target))
                })
                .or_else(|| candidates.last())
                .copied(),
        }
    }

    /// VTT subtitle URL for `lang`, from manual subtitles or automatic captions
    pub fn pick_subtitles<'a>(record: &'a MetadataRecord, lang: &str) -> Option<&'a str> {
        let tracks = record
            .subtitles
            .as_ref()
            .and_then(|subs| subs.get(lang))
            .or_else(|| {
                record
                    .automatic_captions
                    .as_ref()
                    .and_then(|caps| caps.get(lang))
            })?;

        tracks
            .iter()
            .find(|track| track.ext == "vtt")
            .and_then(|track| track.url.as_deref())
    }

    fn select_audio_only(
        record: &MetadataRecord,
        request: &RequestDescriptor,
        mut filename_attributes: FilenameAttributes,
        file_metadata: FileMetadata,
    ) -> Result<AudioSelection, SelectionError> {
        let candidates = Self::audio_candidates(&record.formats);
        if candidates.is_empty() {
            return Err(ErrorKind::NoMatchingFormat.into());
        }

        let (audio, is_dub) =
            Self::pick_audio(&record.formats, &candidates, request.dub_lang.as_deref())
                .ok_or(ErrorKind::NoMatchingFormat)?;
        let url = audio.url.clone().ok_or(ErrorKind::NoMatchingFormat)?;

        if is_dub {
            filename_attributes.youtube_dub_name = audio.language.clone();
        }

        debug!(
            format_id = ?audio.format_id,
            abr = ?audio.abr,
            ext = %audio.ext,
            "selected audio-only format"
        );

        let cover = record
            .thumbnail
            .clone()
            .unwrap_or_else(|| fallback_cover(&request.id));
        let crop_cover = record
            .author_name()
            .map_or(false, |name| name.ends_with("- Topic"));

        Ok(AudioSelection {
            is_audio_only: true,
            urls: url,
            filename_attributes,
            file_metadata,
            best_audio: audio.audio_label().to_string(),
            is_hls: false,
            original_request: request.original_request(),
            cover,
            crop_cover,
        })
    }

    fn select_merge(
        record: &MetadataRecord,
        request: &RequestDescriptor,
        mut filename_attributes: FilenameAttributes,
        mut file_metadata: FileMetadata,
    ) -> Result<MergeSelection, SelectionError> {
        let profile = request.codec.profile();
        let videos = Self::video_candidates(&record.formats, &request.codec);
        let audios = Self::audio_candidates(&record.formats);

        if videos.is_empty() || audios.is_empty() {
            debug!(
                codec = request.codec.as_str(),
                videos = videos.len(),
                audios = audios.len(),
                "no usable video/audio pair"
            );
            return Err(ErrorKind::NoMatchingFormat.into());
        }

        let video = Self::pick_video(&videos, request.quality);
        let audio = Self::pick_audio(&record.formats, &audios, request.dub_lang.as_deref());

        let (Some(video), Some((audio, is_dub))) = (video, audio) else {
            return Err(ErrorKind::NoMatchingFormat.into());
        };
        let (Some(video_url), Some(audio_url)) = (video.url.clone(), audio.url.clone()) else {
            return Err(ErrorKind::NoMatchingFormat.into());
        };

        if is_dub {
            filename_attributes.youtube_dub_name = audio.language.clone();
        }

        debug!(
            video = ?video.format_id,
            height = ?video.height,
            audio = ?audio.format_id,
            "selected video/audio pair"
        );

        filename_attributes.resolution = Some(format!(
            "{}x{}",
            video.width.unwrap_or(0),
            video.height_or_zero()
        ));
        filename_attributes.quality_label = Some(quality_label(video.height_or_zero()));
        filename_attributes.youtube_format = Some(request.codec.family().to_string());
        filename_attributes.extension = Some(match &request.container {
            Container::Auto => profile.container.to_string(),
            Container::Explicit(ext) => ext.clone(),
        });

        let subtitles = non_empty(request.subtitle_lang.as_deref()).and_then(|lang| {
            let url = Self::pick_subtitles(record, lang)?;
            file_metadata.sublanguage = Some(lang.to_string());
            Some(url.to_string())
        });

        let is_hls = is_hls_url(&video_url) || is_hls_url(&audio_url);

        Ok(MergeSelection {
            urls: [video_url, audio_url],
            subtitles,
            filename_attributes,
            file_metadata,
            is_hls,
            original_request: request.original_request(),
        })
    }
}
