pub mod config;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use service::extractors::{MetadataExtractor, YtDlpCli};
pub use service::{
    normalize_quality, Codec, Container, CookieStore, ErrorKind, FormatSelector, JsonCookieStore,
    MetadataRecord, Quality, RequestDescriptor, SelectionError, SelectionResult, YoutubeService,
};
