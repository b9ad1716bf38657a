use std::fmt;
use std::fs;
use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Store, StoreError};
use crate::client::Auth;
use crate::domain::ValidationError;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Saved gateway key/secret pair.
///
/// On disk the record is JSON wrapped in base64. That is obfuscation only: anyone
/// who can read the file can recover the secret. File permissions are the only
/// protection.
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Convert into request credentials, rejecting empty fields.
    pub fn to_auth(&self) -> Result<Auth, ValidationError> {
        Auth::new(self.key.as_str(), self.secret.as_str())
    }

    fn encode(&self) -> Result<String, StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(STANDARD.encode(json))
    }

    fn decode(contents: &str) -> Option<Self> {
        let bytes = STANDARD
            .decode(contents.trim())
            .inspect_err(|err| warn!(error = %err, "credentials are not valid base64"))
            .ok()?;
        serde_json::from_slice(&bytes)
            .inspect_err(|err| warn!(error = %err, "credentials are not a key/secret record"))
            .ok()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

impl Store {
    /// Load saved credentials; a missing, unreadable or undecodable file yields `None`.
    pub fn load_credentials(&self) -> Option<Credentials> {
        let path = self.credentials_path();
        let credentials = Self::read_optional(&path).and_then(|contents| Credentials::decode(&contents));
        debug!(found = credentials.is_some(), "credentials loaded");
        credentials
    }

    /// Encode and write credentials, replacing any previous file.
    pub fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let encoded = credentials.encode()?;
        self.write_private(&self.credentials_path(), encoded.as_bytes())?;
        info!("credentials saved");
        Ok(())
    }

    /// Delete the credentials file. A file that is already gone is not an error.
    pub fn clear_credentials(&self) -> Result<(), StoreError> {
        let path = self.credentials_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("credentials cleared");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove { path, source }),
        }
    }
}
