//! Deterministic file locations for a clip.
//!
//! Layout under the run root:
//! `<root>/<game>/Originals/<game>-<index>.<ext>` and
//! `<root>/<game>/Edited/<game>-<index>.<ext>`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subfolder for downloaded source files.
pub const ORIGINALS_DIR: &str = "Originals";

/// Subfolder for transcoded reels.
pub const EDITED_DIR: &str = "Edited";

/// Paths derived from `(root, game_name, clip_index, extension)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipPaths {
    root: PathBuf,
    game_name: String,
    index: usize,
    extension: String,
}

impl ClipPaths {
    pub fn new(
        root: impl AsRef<Path>,
        game_name: impl Into<String>,
        index: usize,
        extension: impl AsRef<str>,
    ) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            game_name: game_name.into(),
            index,
            extension: extension.as_ref().trim_start_matches('.').to_string(),
        }
    }

    /// `<game>-<index>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.game_name, self.index, self.extension)
    }

    /// `<root>/<game>`
    pub fn game_dir(&self) -> PathBuf {
        self.root.join(&self.game_name)
    }

    /// Where the downloaded source lands.
    pub fn original(&self) -> PathBuf {
        self.game_dir().join(ORIGINALS_DIR).join(self.file_name())
    }

    /// Where the transcoded reel lands.
    pub fn edited(&self) -> PathBuf {
        self.game_dir().join(EDITED_DIR).join(self.file_name())
    }

    /// Object key on the staging host: `<prefix>/<game>/<file>`.
    pub fn staging_key(&self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", self.game_name, self.file_name())
        } else {
            format!("{}/{}/{}", prefix, self.game_name, self.file_name())
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }
}
