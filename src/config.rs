//! Runtime settings: where data lives, which gateway to call, and the default sender.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, NexmoClient, NexmoError};

/// Directory name used under the platform data directory.
pub const APP_DIR: &str = "nexmo-sms";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot locate a data directory (no home directory); pass --data-dir")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding `credentials.db` and `contacts.db`.
    pub data_dir: PathBuf,
    /// Gateway endpoint URL.
    pub endpoint: String,
    /// Limit for one gateway round-trip; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Sender used when the form leaves `from` blank.
    pub default_sender: String,
}

impl Settings {
    /// Default gateway settings with data kept in `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
            default_sender: default_sender(),
        }
    }

    /// Default settings using the platform data directory.
    pub fn from_platform() -> Result<Self, ConfigError> {
        Ok(Self::new(default_data_dir()?))
    }

    /// Build the gateway client described by these settings.
    pub fn client(&self) -> Result<NexmoClient, NexmoError> {
        let builder = NexmoClient::builder()
            .endpoint(self.endpoint.as_str())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        match self.timeout {
            Some(timeout) => builder.timeout(timeout).build(),
            None => builder.no_timeout().build(),
        }
    }
}

/// `<platform data dir>/nexmo-sms`, falling back to `~/.local/share/nexmo-sms`.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    resolve_data_dir(dirs::data_dir(), dirs::home_dir())
}

fn resolve_data_dir(
    data_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    data_dir
        .filter(|dir| dir.is_absolute())
        .or_else(|| {
            home_dir
                .filter(|home| home.is_absolute())
                .map(|home| home.join(".local").join("share"))
        })
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoDataDir)
}

/// The machine's network hostname, or `localhost` when it cannot be read.
pub fn default_sender() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}
