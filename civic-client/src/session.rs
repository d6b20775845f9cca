use anyhow::{Context, Result};
use civic_types::User;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What a signed-in client keeps between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
}

impl SessionData {
    /// Tokens are UUIDs today; anything outside these bounds is treated as corrupt
    fn token_is_plausible(&self) -> bool {
        let token = self.token.trim();
        (8..=256).contains(&token.len()) && !token.chars().any(|c| c.is_control())
    }
}

/// Manages session storage in the user's home directory.
///
/// The session is stored as JSON in `~/.civic/session` with 0600 permissions
/// so only the owner can read it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    /// Creates a SessionStore at the default path `~/.civic/session`.
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(Self::at(home_dir.join(".civic").join("session")))
    }

    /// Creates a SessionStore backed by an explicit file
    pub fn at(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Loads the stored session.
    ///
    /// Returns `Ok(None)` when the file is missing, empty or does not hold a
    /// well-formed session; `Err(_)` only when the file cannot be read.
    pub fn load(&self) -> Result<Option<SessionData>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read session file")?;

        if content.trim().is_empty() {
            log::warn!("Session file is empty, treating as no session");
            return Ok(None);
        }

        let session: SessionData = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Session file is corrupted ({}), treating as no session", e);
                return Ok(None);
            }
        };

        if !session.token_is_plausible() {
            log::warn!("Session token is malformed, treating as no session");
            return Ok(None);
        }

        log::debug!("Loaded session from {}", self.file_path.display());
        Ok(Some(session))
    }

    /// Saves the session with 0600 permissions.
    ///
    /// Writes to a temporary file first and renames it over the old one, so
    /// a crash never leaves a half-written session behind.
    pub fn save(&self, session: &SessionData) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        self.cleanup_old_files()?;

        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        let temp_path = self.file_path.with_extension("tmp");

        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary session file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write session data")?;
        file.sync_all()
            .context("Failed to sync session file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, permissions)
                .context("Failed to set session file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path)
            .context("Failed to rename temporary session file")?;

        log::info!("Saved session to {}", self.file_path.display());
        Ok(())
    }

    /// Deletes the session file. Succeeds when there is nothing to delete.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete session file")?;
            log::info!("Deleted session file at {}", self.file_path.display());
        } else {
            log::debug!("Session file does not exist, nothing to delete");
        }
        Ok(())
    }

    /// Removes stale `session*` siblings (temp and backup files)
    fn cleanup_old_files(&self) -> Result<()> {
        let Some(parent) = self.file_path.parent() else {
            return Ok(());
        };
        if !parent.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(parent).context("Failed to read session directory")? {
            let path = entry.context("Failed to read directory entry")?.path();
            if path == self.file_path {
                continue;
            }
            let stale = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("session"));
            if stale {
                log::debug!("Removing stale session file: {}", path.display());
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Failed to remove stale session file {}: {}", path.display(), e);
                }
            }
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
