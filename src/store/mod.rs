//! Persistence layer: the credential file and the contact book on local disk.
//!
//! Single-process, single-user: there is no locking. Read failures of any kind
//! are reported as "no data yet"; only writes return errors.

mod contacts;
mod credentials;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use contacts::ContactBook;
pub use credentials::Credentials;

/// File holding the encoded credentials, relative to the data directory.
pub const CREDENTIALS_FILE: &str = "credentials.db";
/// File holding the contact book, relative to the data directory.
pub const CONTACTS_FILE: &str = "contacts.db";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
/// File-backed store rooted at one data directory.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.dir.join(CONTACTS_FILE)
    }

    /// Read a whole file, treating every failure as absence.
    fn read_optional(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no file yet");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable file ignored");
                None
            }
        }
    }

    /// Overwrite `path` with `contents`, creating owner-only files and directories.
    fn write_private(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        let to_store_error = |source: io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        create_private_dir(&self.dir).map_err(to_store_error)?;
        let mut file = private_open_options()
            .open(path)
            .map_err(to_store_error)?;
        file.write_all(contents).map_err(to_store_error)?;
        debug!(path = %path.display(), bytes = contents.len(), "file written");
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

fn private_open_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}
