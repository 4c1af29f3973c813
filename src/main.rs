use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use youtube_format_selector::{
    Codec, Container, Quality, RequestDescriptor, ServiceConfig, YoutubeService,
};

/// Resolve a YouTube video into direct stream URLs and print the result as JSON
#[derive(Parser, Debug)]
#[command(name = "yt-select")]
#[command(version)]
struct Args {
    /// YouTube video id
    id: String,

    /// "max" or a target height (e.g. 720)
    #[arg(short, long, default_value = "max")]
    quality: Quality,

    /// Video codec: h264, av1, vp9 (anything else selects like h264)
    #[arg(short, long, default_value = "h264")]
    codec: String,

    /// Select an audio-only stream
    #[arg(short, long)]
    audio_only: bool,

    /// Dubbed audio language code (e.g. "es")
    #[arg(long)]
    dub_lang: Option<String>,

    /// Subtitle language code
    #[arg(long)]
    subtitle_lang: Option<String>,

    /// Output container, or "auto"
    #[arg(long, default_value = "auto")]
    container: String,

    /// Maximum duration in seconds (overrides DURATION_LIMIT)
    #[arg(long)]
    duration_limit: Option<u64>,

    /// JSON cookie file (overrides COOKIE_PATH)
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// yt-dlp binary (overrides YTDLP_PATH)
    #[arg(long)]
    ytdlp: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let mut config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(limit) = args.duration_limit {
        config = config.with_duration_limit(limit);
    }
    if args.cookies.is_some() {
        config = config.with_cookie_path(args.cookies.clone());
    }
    if args.ytdlp.is_some() {
        config = config.with_ytdlp_path(args.ytdlp.clone());
    }

    let service = match YoutubeService::from_config(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = RequestDescriptor::new(args.id)
        .with_quality(args.quality)
        .with_codec(Codec::from(args.codec.to_ascii_lowercase()))
        .audio_only(args.audio_only)
        .with_dub_lang(args.dub_lang)
        .with_subtitle_lang(args.subtitle_lang)
        .with_container(Container::from(args.container.as_str()));

    let (json, code) = match service.resolve(&request).await {
        Ok(result) => (serde_json::to_string_pretty(&result), ExitCode::SUCCESS),
        Err(err) => (serde_json::to_string_pretty(&err), ExitCode::FAILURE),
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            code
        }
        Err(e) => {
            error!("failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}
