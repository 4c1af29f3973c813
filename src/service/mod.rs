// Format selection service
//
// Turns a yt-dlp metadata document plus a request descriptor into the stream
// URLs and file attributes a downloader needs.

pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod metadata;
pub mod models;
pub mod orchestrator;
pub mod quality;
pub mod traits;
pub mod utils;

pub use errors::{ErrorKind, ExtractError, SelectionError};
pub use format_selector::{CodecProfile, FormatSelector};
pub use models::{
    AudioSelection, CaptionTrack, Codec, Container, FileMetadata, FilenameAttributes,
    FormatDescriptor, MergeSelection, MetadataRecord, Quality, RequestDescriptor,
    SelectionResult,
};
pub use orchestrator::YoutubeService;
pub use quality::normalize_quality;
pub use traits::{CookieStore, JsonCookieStore, NoCookies};
