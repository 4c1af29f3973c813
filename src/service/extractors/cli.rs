// CLI MetadataExtractor - runs the native `yt-dlp` binary

use async_trait::async_trait;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::traits::MetadataExtractor;
use crate::service::errors::ExtractError;
use crate::service::utils::run_output_with_timeout;

/// Install locations checked after `PATH`
const INSTALL_DIRS: [&str; 3] = [
    "/opt/homebrew/bin", // Homebrew on Apple Silicon
    "/usr/local/bin",
    "/usr/bin",
];

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Resolve the yt-dlp binary.
///
/// A non-empty `override_path` (the `YTDLP_PATH` variable) wins outright.
/// Otherwise the directories of `search_path` are scanned in order, then
/// the usual install locations and `~/.local/bin` (pip --user).
fn locate_ytdlp(override_path: Option<OsString>, search_path: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let mut search_dirs: Vec<PathBuf> = search_path
        .map(|paths| env::split_paths(&paths).collect())
        .unwrap_or_default();
    search_dirs.extend(INSTALL_DIRS.iter().map(PathBuf::from));
    search_dirs.extend(dirs::home_dir().map(|home| home.join(".local").join("bin")));

    search_dirs
        .into_iter()
        .map(|dir| dir.join(BINARY_NAME))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
const BINARY_NAME: &str = "yt-dlp.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "yt-dlp";

/// yt-dlp binary invoked as a child process
pub struct YtDlpCli {
    ytdlp_path: String,
    timeout_seconds: u64,
}

impl YtDlpCli {
    /// Use `path` when given, otherwise look the binary up
    pub fn new(path: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            ytdlp_path: path.unwrap_or_else(Self::find_ytdlp),
            timeout_seconds,
        }
    }

    pub fn path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Find yt-dlp from `YTDLP_PATH`, `PATH` and the install locations,
    /// leaving the bare name for the OS to resolve when nothing is found
    fn find_ytdlp() -> String {
        match locate_ytdlp(env::var_os("YTDLP_PATH"), env::var_os("PATH")) {
            Some(path) => path.to_string_lossy().into_owned(),
            None => {
                warn!("yt-dlp not found on PATH or in install locations");
                BINARY_NAME.to_string()
            }
        }
    }
}

#[async_trait]
impl MetadataExtractor for YtDlpCli {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn dump_json(&self, url: &str, args: &[String]) -> Result<String, ExtractError> {
        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(url.to_string());
        full_args.extend_from_slice(args);

        debug!(program = %self.ytdlp_path, url, "running yt-dlp");

        let output =
            run_output_with_timeout(&self.ytdlp_path, &full_args, self.timeout_seconds).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "yt-dlp failed: {}", stderr);
            return Err(ExtractError::Tool(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    /// Write a shell script standing in for yt-dlp
    fn fake_ytdlp(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("yt-dlp");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\n{}", body).unwrap();
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_locate_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        fake_ytdlp(&dir, "exit 0");

        let found = locate_ytdlp(
            Some(OsString::from("/custom/yt-dlp")),
            Some(dir.path().as_os_str().to_os_string()),
        );
        assert_eq!(found, Some(PathBuf::from("/custom/yt-dlp")));
    }

    #[test]
    fn test_locate_scans_search_path_in_order() {
        let empty = tempfile::tempdir().unwrap();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = fake_ytdlp(&first, "exit 0");
        fake_ytdlp(&second, "exit 0");

        let search = env::join_paths([empty.path(), first.path(), second.path()]).unwrap();
        let found = locate_ytdlp(Some(OsString::new()), Some(search));
        assert_eq!(found, Some(PathBuf::from(expected)));
    }

    #[test]
    fn test_locate_skips_non_executable() {
        let plain = tempfile::tempdir().unwrap();
        std::fs::write(plain.path().join("yt-dlp"), "not a program").unwrap();
        let runnable = tempfile::tempdir().unwrap();
        let expected = fake_ytdlp(&runnable, "exit 0");

        let search = env::join_paths([plain.path(), runnable.path()]).unwrap();
        let found = locate_ytdlp(None, Some(search));
        assert_eq!(found, Some(PathBuf::from(expected)));
    }

    #[tokio::test]
    async fn test_returns_stdout_on_success() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the first argument (the URL) back inside a JSON document
        let cli = YtDlpCli::new(Some(fake_ytdlp(&dir, r#"echo "{\"webpage_url\": \"$1\"}""#)), 5);

        let out = cli
            .dump_json("https://www.youtube.com/watch?v=abc", &["--dump-json".to_string()])
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["webpage_url"], "https://www.youtube.com/watch?v=abc");
    }

    #[tokio::test]
    async fn test_stderr_becomes_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = YtDlpCli::new(
            Some(fake_ytdlp(&dir, "echo 'ERROR: [youtube] abc: Private video' >&2; exit 1")),
            5,
        );

        let err = cli.dump_json("https://www.youtube.com/watch?v=abc", &[]).await.unwrap_err();
        assert!(matches!(err, ExtractError::Tool(msg) if msg.contains("Private video")));
    }
}
