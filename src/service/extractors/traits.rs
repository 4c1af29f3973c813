// MetadataExtractor trait and the yt-dlp argument list

use async_trait::async_trait;

use crate::service::errors::ExtractError;

/// Fixed user agent sent with every extraction
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Platform key used for cookie lookups
pub const PLATFORM: &str = "youtube";

/// Watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Build yt-dlp arguments, with an optional cookie header
pub fn build_ytdlp_args(cookie: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--no-check-certificate".to_string(),
        "--prefer-free-formats".to_string(),
        "--add-header".to_string(),
        format!("User-Agent:{}", USER_AGENT),
    ];

    if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
        args.push("--add-header".to_string());
        args.push(format!("Cookie: {}", cookie));
    }

    args
}

/// Runs the extraction tool for one URL
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Return the JSON document printed by the tool
    async fn dump_json(&self, url: &str, args: &[String]) -> Result<String, ExtractError>;
}
