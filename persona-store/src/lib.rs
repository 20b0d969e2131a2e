use persona_core::CoreError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one persona text file per user into a directory.
#[derive(Debug, Clone)]
pub struct PersonaStore {
    dir: PathBuf,
}

impl PersonaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}_persona.txt", username))
    }

    /// Write `text` verbatim, replacing any earlier file for the same user.
    pub async fn save(&self, username: &str, text: &str) -> Result<PathBuf, CoreError> {
        if username.is_empty()
            || username.contains(['/', '\\'])
            || username == "."
            || username == ".."
        {
            return Err(CoreError::InvalidInput {
                message: format!("Cannot store a persona for user '{}'", username),
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(username);
        tokio::fs::write(&path, text).await?;

        info!("Saved persona for u/{} to {}", username, path.display());
        Ok(path)
    }
}
