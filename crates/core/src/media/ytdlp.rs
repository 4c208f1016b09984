//! yt-dlp backed media resolver.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::MediaConfig;

use super::{MediaError, MediaResolver, ResolvedMedia};

const UNKNOWN_TITLE: &str = "Unknown track";

/// Resolves queries by running `yt-dlp` in JSON dump mode.
pub struct YtDlpResolver {
    config: MediaConfig,
}

/// The subset of yt-dlp's info JSON we use.
#[derive(Debug, Deserialize)]
struct InfoJson {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    /// Present for search results; the first entry wins.
    #[serde(default)]
    entries: Option<Vec<InfoJson>>,
}

impl YtDlpResolver {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    fn build_args(query: &str) -> Vec<String> {
        vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "--default-search".to_string(),
            "auto".to_string(),
            "--".to_string(),
            query.to_string(),
        ]
    }

    /// Parse yt-dlp's JSON output into a single item.
    fn parse_output(query: &str, stdout: &str) -> Result<ResolvedMedia, MediaError> {
        let info: InfoJson = serde_json::from_str(stdout.trim())
            .map_err(|e| MediaError::InvalidOutput(e.to_string()))?;

        let info = match info.entries {
            Some(entries) => entries
                .into_iter()
                .next()
                .ok_or_else(|| MediaError::NotFound(query.to_string()))?,
            None => info,
        };

        let stream_url = info
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MediaError::InvalidOutput("missing stream url".to_string()))?;

        Ok(ResolvedMedia {
            stream_url,
            title: info
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            thumbnail: info.thumbnail,
            uploader: info.uploader,
        })
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedMedia, MediaError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MediaError::NotFound(String::new()));
        }

        debug!("Resolving media query: {}", query);

        let mut command = Command::new(&self.config.ytdlp_path);
        command
            .args(Self::build_args(query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(Duration::from_secs(self.config.timeout_secs), command.output())
            .await
            .map_err(|_| MediaError::Timeout(self.config.timeout_secs))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::ToolNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    MediaError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::Failed(
                stderr.lines().last().unwrap_or("yt-dlp failed").to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_output(query, &stdout)
    }
}
