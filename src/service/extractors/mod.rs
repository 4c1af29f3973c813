// Extractors - invoke yt-dlp and classify its failures
//
// The service only depends on the `MetadataExtractor` trait, so the CLI
// implementation can be swapped for a test double.

mod cli;
mod diagnostics;
mod traits;

pub use cli::YtDlpCli;
pub use diagnostics::{classify_error_message, classify_extraction_error};
pub use traits::{build_ytdlp_args, watch_url, MetadataExtractor, PLATFORM, USER_AGENT};
