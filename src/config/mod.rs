//! Configuration module for the COS paste bridge

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Longest lifetime a SigV4 presigned URL may have (seven days)
pub const MAX_SIGNED_DURATION_SECS: u64 = 604_800;

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cos: CosSettings,
    pub capture: CaptureSettings,
}

/// HTTP server configuration for the local editor bridge
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Tencent Cloud COS upload configuration
///
/// Mirrors the editor plugin's settings surface. `config` lowercases keys read
/// from files, so the camelCase spellings are accepted in both forms.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CosSettings {
    #[serde(alias = "secretId", alias = "secretid")]
    pub secret_id: String,
    #[serde(alias = "secretKey", alias = "secretkey")]
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Custom domain that replaces the COS hostname in generated URLs
    pub domain: Option<String>,
    /// Where clipboard captures are written, absolute or relative to the document
    #[serde(alias = "localPath", alias = "localpath")]
    pub local_path: String,
    /// Remote directory template, e.g. `{year}/{month}`
    #[serde(alias = "remotePath", alias = "remotepath")]
    pub remote_path: String,
    /// Remote file name template (extension is appended automatically)
    #[serde(alias = "remoteName", alias = "remotename")]
    pub remote_name: String,
    #[serde(alias = "isPublic", alias = "ispublic")]
    pub is_public: bool,
    /// Signed URL lifetime in seconds
    pub duration: u64,
    /// Overrides `https://cos.<region>.myqcloud.com`
    pub endpoint: Option<String>,
}

/// Clipboard helper configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Directory holding `linux.sh`, `mac.applescript` and `pc.ps1`
    pub scripts_dir: PathBuf,
    pub timeout_secs: u64,
}

impl CaptureSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// A single configuration problem found by [`CosSettings::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("remotePath can not start with /")]
    RemotePathAbsolute,
    #[error("missing remoteName param")]
    MissingRemoteName,
    #[error("missing bucket param")]
    MissingBucket,
    #[error("missing region param")]
    MissingRegion,
    #[error("missing secretId param")]
    MissingSecretId,
    #[error("missing secretKey param")]
    MissingSecretKey,
    #[error("duration must be greater than 0 for a private bucket")]
    ZeroDuration,
    #[error("duration can not exceed 604800 seconds (7 days)")]
    DurationTooLong,
}

/// Every violation found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigViolation>);

impl ConfigErrors {
    pub fn violations(&self) -> &[ConfigViolation] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ConfigErrors {}

impl CosSettings {
    /// Check all required fields at once, before any I/O happens
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut violations = Vec::new();

        if self.remote_path.starts_with('/') {
            violations.push(ConfigViolation::RemotePathAbsolute);
        }
        if self.remote_name.is_empty() {
            violations.push(ConfigViolation::MissingRemoteName);
        }
        if self.bucket.is_empty() {
            violations.push(ConfigViolation::MissingBucket);
        }
        if self.region.is_empty() {
            violations.push(ConfigViolation::MissingRegion);
        }
        if self.secret_id.is_empty() {
            violations.push(ConfigViolation::MissingSecretId);
        }
        if self.secret_key.is_empty() {
            violations.push(ConfigViolation::MissingSecretKey);
        }
        if !self.is_public {
            if self.duration == 0 {
                violations.push(ConfigViolation::ZeroDuration);
            } else if self.duration > MAX_SIGNED_DURATION_SECS {
                violations.push(ConfigViolation::DurationTooLong);
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors(violations))
        }
    }

    /// Custom domain with any `http://` / `https://` scheme removed
    pub fn custom_domain(&self) -> Option<String> {
        self.domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                d.strip_prefix("https://")
                    .or_else(|| d.strip_prefix("http://"))
                    .unwrap_or(d)
                    .trim_end_matches('/')
                    .to_string()
            })
    }
}

// Keep credentials out of logs.
impl fmt::Debug for CosSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosSettings")
            .field("secret_id", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("domain", &self.domain)
            .field("local_path", &self.local_path)
            .field("remote_path", &self.remote_path)
            .field("remote_name", &self.remote_name)
            .field("is_public", &self.is_public)
            .field("duration", &self.duration)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with COS_PASTE__)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    ///
    /// `CONFIG_PATH` overrides the `config` directory.
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        Self::load_from(&config_dir)
    }

    /// Load `default.toml` and `local.toml` from `config_dir`, then the environment
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // COS_PASTE__COS__BUCKET, COS_PASTE__SERVER__PORT, etc.
            .add_source(
                Environment::with_prefix("COS_PASTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 7531,
            workers: None,
        }
    }
}

impl Default for CosSettings {
    fn default() -> Self {
        CosSettings {
            secret_id: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            region: String::new(),
            domain: None,
            local_path: "./img".to_string(),
            remote_path: "{year}/{month}/{day}".to_string(),
            remote_name: "{filename}".to_string(),
            is_public: true,
            duration: 3600,
            endpoint: None,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        CaptureSettings {
            scripts_dir: PathBuf::from("scripts"),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
pub(crate) fn valid_cos_settings() -> CosSettings {
    CosSettings {
        secret_id: "AKIDexample".to_string(),
        secret_key: "secret".to_string(),
        bucket: "notes-1250000000".to_string(),
        region: "ap-guangzhou".to_string(),
        ..CosSettings::default()
    }
}
