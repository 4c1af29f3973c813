// File metadata derived from the video info record
//
// Title and artist always resolve to something. Tracks uploaded through a
// music distributor carry a fixed-layout description:
//
//   Provided to YouTube by <label>
//
//   <track> · <artist>
//
//   <album>
//
//   ℗ <copyright>
//
//   Released on: YYYY-MM-DD
//
// which is mined for album, copyright and release date when the layout matches.

use time::macros::format_description;
use time::Date;

use super::models::{FileMetadata, MetadataRecord};

const MUSIC_DESCRIPTION_MARKER: &str = "Provided to YouTube by";
const RELEASE_DATE_PREFIX: &str = "Released on:";
const TOPIC_SUFFIX: &str = "- Topic";

/// Strip the auto-generated "- Topic" marker from a channel name
fn clean_author(name: &str) -> Option<String> {
    let cleaned = name.replacen(TOPIC_SUFFIX, "", 1);
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Build title/artist tags plus any music-distribution extras
pub fn build_file_metadata(record: &MetadataRecord) -> FileMetadata {
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("untitled")
        .to_string();

    let artist = record
        .uploader
        .as_deref()
        .and_then(clean_author)
        .or_else(|| record.channel.as_deref().and_then(clean_author))
        .unwrap_or_else(|| "unknown".to_string());

    let mut metadata = FileMetadata {
        title,
        artist,
        ..FileMetadata::default()
    };

    if let Some(description) = record.description.as_deref() {
        apply_music_description(&mut metadata, description);
    }

    metadata
}

fn apply_music_description(metadata: &mut FileMetadata, description: &str) {
    if !description.starts_with(MUSIC_DESCRIPTION_MARKER) {
        return;
    }

    // Anything past the fifth block (e.g. "Auto-generated by YouTube.") is ignored
    let blocks: Vec<&str> = description.split("\n\n").take(5).collect();
    if blocks.len() != 5 {
        return;
    }

    metadata.album = Some(blocks[2].to_string());
    metadata.copyright = Some(blocks[3].to_string());

    if blocks[4].starts_with(RELEASE_DATE_PREFIX) {
        metadata.date = Some(blocks[4].replacen("Released on: ", "", 1).trim().to_string());
    }
}

impl FileMetadata {
    /// Release date as a calendar date, when `date` is ISO formatted
    pub fn release_date(&self) -> Option<Date> {
        let format = format_description!("[year]-[month]-[day]");
        Date::parse(self.date.as_deref()?, &format).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn record() -> MetadataRecord {
        MetadataRecord {
            id: "abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let metadata = build_file_metadata(&record());
        assert_eq!(metadata.title, "untitled");
        assert_eq!(metadata.artist, "unknown");
        assert!(metadata.album.is_none());
    }

    #[test]
    fn test_topic_channel_artist() {
        let mut rec = record();
        rec.title = Some("  Song Name \n".to_string());
        rec.uploader = Some("Some Band - Topic".to_string());
        rec.channel = Some("Other".to_string());

        let metadata = build_file_metadata(&rec);
        assert_eq!(metadata.title, "Song Name");
        assert_eq!(metadata.artist, "Some Band");
    }

    #[test]
    fn test_channel_fallback_when_uploader_blank() {
        let mut rec = record();
        rec.uploader = Some("- Topic".to_string());
        rec.channel = Some("Channel Name - Topic".to_string());

        assert_eq!(build_file_metadata(&rec).artist, "Channel Name");
    }

    #[test]
    fn test_music_description() {
        let mut rec = record();
        rec.description = Some(
            "Provided to YouTube by Label\n\nTrack · Artist\n\nThe Album\n\n℗ 2019 Label\n\nReleased on: 2019-05-03\n\nAuto-generated by YouTube."
                .to_string(),
        );

        let metadata = build_file_metadata(&rec);
        assert_eq!(metadata.album.as_deref(), Some("The Album"));
        assert_eq!(metadata.copyright.as_deref(), Some("℗ 2019 Label"));
        assert_eq!(metadata.date.as_deref(), Some("2019-05-03"));

        let date = metadata.release_date().unwrap();
        assert_eq!(date.year(), 2019);
        assert_eq!(date.month(), Month::May);
        assert_eq!(date.day(), 3);
    }

    #[test]
    fn test_music_description_without_release_line() {
        let mut rec = record();
        rec.description = Some(
            "Provided to YouTube by Label\n\nTrack · Artist\n\nThe Album\n\n℗ 2019 Label\n\nComposer: Someone"
                .to_string(),
        );

        let metadata = build_file_metadata(&rec);
        assert_eq!(metadata.album.as_deref(), Some("The Album"));
        assert!(metadata.date.is_none());
        assert!(metadata.release_date().is_none());
    }

    #[test]
    fn test_short_music_description_is_ignored() {
        let mut rec = record();
        rec.description = Some("Provided to YouTube by Label\n\nTrack · Artist\n\nThe Album".to_string());

        let metadata = build_file_metadata(&rec);
        assert!(metadata.album.is_none());
        assert!(metadata.copyright.is_none());
    }

    #[test]
    fn test_regular_description_is_ignored() {
        let mut rec = record();
        rec.description = Some("a\n\nb\n\nc\n\nd\n\nReleased on: 2020-01-01".to_string());

        assert!(build_file_metadata(&rec).date.is_none());
    }
}
