//! Crash-safe, file-per-message maildir store.
//!
//! Layout is the standard maildir triple: `tmp/` for staging, `new/` for
//! published messages, `cur/` for messages a reader has claimed (with
//! flags encoded in the `:2,<flags>` filename suffix). Unlike classic
//! maildir, message filenames here are caller-supplied and deterministic,
//! which is what makes existence checks double as duplicate suppression.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator between a message key and its flag characters in `cur/`.
const INFO_PREFIX: &str = ":2,";

/// Flag character marking a message as user-preserved; the cleanup pass
/// never deletes a message carrying it.
pub const PRESERVED_FLAG: char = 'F';

/// A file-per-message mailbox rooted at one directory.
#[derive(Debug)]
pub struct Maildir {
    root: PathBuf,
}

impl Maildir {
    /// Opens a maildir, creating the `tmp`/`new`/`cur` subdirectories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a subdirectory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for sub in ["tmp", "new", "cur"] {
            fs::create_dir_all(root.join(sub))?;
        }
        Ok(Self { root })
    }

    /// Returns true if a message with this key exists in `new/` or
    /// `cur/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directories cannot be read.
    pub fn contains(&self, key: &str) -> Result<bool> {
        if self.root.join("new").join(key).exists() {
            return Ok(true);
        }
        Ok(self.find_in_cur(key)?.is_some())
    }

    /// Durably materializes a message under `key`.
    ///
    /// The content is written to an exclusively-created staging file in
    /// `tmp/`, forced to disk, then published into `new/` with a single
    /// hard-link (rename where linking is unsupported). The staging file
    /// is removed afterwards. The published file is never touched again;
    /// concurrent readers either see nothing or the complete message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameClash`] if the staging or publish target
    /// already exists (the staging file is cleaned up first), or
    /// [`Error::Io`] for any other storage failure.
    pub fn add(&self, key: &str, content: &str) -> Result<()> {
        let staged = self.root.join("tmp").join(key);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::NameClash {
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_synced(&mut file, content) {
            drop(file);
            let _ = fs::remove_file(&staged);
            return Err(e);
        }
        drop(file);

        let published = self.root.join("new").join(key);
        match fs::hard_link(&staged, &published) {
            Ok(()) => {
                fs::remove_file(&staged)?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let _ = fs::remove_file(&staged);
                Err(Error::NameClash {
                    key: key.to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::Unsupported => {
                // Filesystems without hard links: rename publishes in one
                // step but silently replaces an existing target, so the
                // clash check has to happen up front.
                if published.exists() {
                    let _ = fs::remove_file(&staged);
                    return Err(Error::NameClash {
                        key: key.to_string(),
                    });
                }
                fs::rename(&staged, &published)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&staged);
                Err(e.into())
            }
        }
    }

    /// Snapshot of all delivered message keys (flag suffixes stripped).
    ///
    /// # Errors
    ///
    /// Returns an error if the store directories cannot be read.
    pub fn keys(&self) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        for sub in ["new", "cur"] {
            for entry in fs::read_dir(self.root.join(sub))? {
                let name = entry?.file_name();
                let name = name.to_string_lossy();
                let key = name.split_once(INFO_PREFIX).map_or(&*name, |(k, _)| k);
                keys.insert(key.to_string());
            }
        }
        Ok(keys)
    }

    /// Returns the flag characters of a message, empty for messages
    /// still in `new/` or no longer present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directories cannot be read.
    pub fn flags(&self, key: &str) -> Result<String> {
        match self.find_in_cur(key)? {
            Some(name) => Ok(name
                .split_once(INFO_PREFIX)
                .map(|(_, flags)| flags.to_string())
                .unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    /// Removes a message from `new/` or `cur/`. A key that is already
    /// gone is not an error; the message may have been removed by the
    /// mail reader since the run started.
    ///
    /// # Errors
    ///
    /// Returns an error on any storage failure other than the file being
    /// absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.root.join("new").join(key)) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(name) = self.find_in_cur(key)? {
            fs::remove_file(self.root.join("cur").join(name))?;
        } else {
            debug!(key, "delete: message already gone");
        }
        Ok(())
    }

    /// Root path of the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Finds the `cur/` filename (key plus flag suffix) for a key.
    fn find_in_cur(&self, key: &str) -> Result<Option<String>> {
        for entry in fs::read_dir(self.root.join("cur"))? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if name == key || name.strip_prefix(key).is_some_and(|r| r.starts_with(':')) {
                return Ok(Some(name.into_owned()));
            }
        }
        Ok(None)
    }
}

fn write_synced(file: &mut File, content: &str) -> Result<()> {
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
