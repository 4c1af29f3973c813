// YoutubeService - runs one request end to end
//
// Steps:
// 1. Build yt-dlp arguments (with a stored cookie when available)
// 2. Invoke the extractor and classify any failure
// 3. Parse the metadata document
// 4. Hand the record to FormatSelector

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::{ErrorKind, SelectionError};
use super::extractors::{
    build_ytdlp_args, classify_extraction_error, watch_url, MetadataExtractor, YtDlpCli, PLATFORM,
};
use super::format_selector::FormatSelector;
use super::models::{MetadataRecord, RequestDescriptor, SelectionResult};
use super::traits::{CookieStore, JsonCookieStore, NoCookies};
use crate::config::{ConfigError, ServiceConfig};

/// Format selection service with injected collaborators
pub struct YoutubeService {
    extractor: Arc<dyn MetadataExtractor>,
    cookies: Arc<dyn CookieStore>,
    duration_limit: u64,
}

impl YoutubeService {
    pub fn new(
        extractor: Arc<dyn MetadataExtractor>,
        cookies: Arc<dyn CookieStore>,
        duration_limit: u64,
    ) -> Self {
        Self {
            extractor,
            cookies,
            duration_limit,
        }
    }

    /// Build the service from configuration: yt-dlp CLI plus the cookie file
    /// when it exists
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let extractor = YtDlpCli::new(config.ytdlp_path.clone(), config.timeout_seconds);
        info!(ytdlp = extractor.path(), "using yt-dlp binary");

        let cookies: Arc<dyn CookieStore> = match &config.cookie_path {
            Some(path) if path.exists() => Arc::new(JsonCookieStore::load(path)?),
            Some(path) => {
                debug!(path = %path.display(), "no cookie file, continuing without cookies");
                Arc::new(NoCookies)
            }
            None => Arc::new(NoCookies),
        };

        Ok(Self::new(Arc::new(extractor), cookies, config.duration_limit))
    }

    /// Resolve a request into downloadable stream URLs
    pub async fn resolve(
        &self,
        request: &RequestDescriptor,
    ) -> Result<SelectionResult, SelectionError> {
        let record = self.fetch_metadata(&request.id).await?;
        let result = FormatSelector::select(&record, request, self.duration_limit);

        match &result {
            Ok(selection) => info!(
                id = %request.id,
                audio_only = request.is_audio_only,
                quality = ?selection.filename_attributes().quality_label,
                "format selected"
            ),
            Err(err) => info!(id = %request.id, error = %err, "selection failed"),
        }

        result
    }

    /// Run the extractor and parse its output
    async fn fetch_metadata(&self, video_id: &str) -> Result<MetadataRecord, SelectionError> {
        let url = watch_url(video_id);
        let cookie = self.cookies.get_cookie(PLATFORM);
        let args = build_ytdlp_args(cookie.as_deref());

        debug!(
            extractor = self.extractor.name(),
            url = %url,
            with_cookie = cookie.is_some(),
            "extracting metadata"
        );

        let output = self.extractor.dump_json(&url, &args).await.map_err(|e| {
            let kind = classify_extraction_error(&e);
            warn!(extractor = self.extractor.name(), error = %e, kind = %kind, "extraction failed");
            SelectionError::new(kind)
        })?;

        if output.trim().is_empty() {
            warn!(url = %url, "extractor returned no output");
            return Err(ErrorKind::FetchFail.into());
        }

        serde_json::from_str(&output).map_err(|e| {
            warn!(url = %url, "invalid metadata JSON: {}", e);
            SelectionError::from(ErrorKind::FetchFail)
        })
    }
}
