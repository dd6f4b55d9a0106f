//! Runtime configuration sourced from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `DERMADETECT_API_URL` | `http://127.0.0.1:5000` |
//! | `DERMADETECT_PACING_MS` | `2000` |
//! | `DERMADETECT_TIMEOUT_SECS` | `30` (`0` disables) |
//! | `DERMADETECT_LOG_MODE` | `auto` (`file`, `stdout`) |
//! | `DERMADETECT_LOG_FILE` | `dermadetect.log` |

use std::path::PathBuf;
use std::time::Duration;

use crate::DermadetectError;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_PACING_MS: u64 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILE: &str = "dermadetect.log";

/// Where the analysis service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub upload_path: String,
    pub predict_path: String,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            upload_path: "/upload".to_string(),
            predict_path: "/predict".to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Log sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when attached to a terminal, stdout otherwise
    Auto,
    File,
    Stdout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    /// Pause between a successful upload and the prediction request
    pub pacing: Duration,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns `DermadetectError::Config` for unparseable values.
    pub fn from_env() -> Result<Self, DermadetectError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `DermadetectError::Config` for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DermadetectError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DERMADETECT_API_URL").filter(|v| !v.trim().is_empty()) {
            let url = url.trim().to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DermadetectError::Config(format!(
                    "DERMADETECT_API_URL must start with http:// or https://, got {url:?}"
                )));
            }
            config.api.base_url = url;
        }

        if let Some(ms) = parse_u64(&lookup, "DERMADETECT_PACING_MS")? {
            config.pacing = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_u64(&lookup, "DERMADETECT_TIMEOUT_SECS")? {
            config.api.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(mode) = lookup("DERMADETECT_LOG_MODE") {
            config.log_mode = match mode.trim().to_ascii_lowercase().as_str() {
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                // auto, empty, or anything unrecognised
                _ => LogMode::Auto,
            };
        }

        if let Some(file) = lookup("DERMADETECT_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(file);
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, DermadetectError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| DermadetectError::Config(format!("{key} must be a whole number, got {raw:?}"))),
    }
}
