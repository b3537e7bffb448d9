use std::path::{Path, PathBuf};

use super::VoiceProfile;

/// Paths inside an RVC checkout.
///
/// Everything that touches the external tool's directory tree goes through here, so a
/// test can point the whole service at a scratch directory.
#[derive(Debug, Clone)]
pub struct RvcLayout {
    root: PathBuf,
}

impl RvcLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_installed(&self) -> bool {
        self.root.is_dir()
    }

    pub fn weights_dir(&self) -> PathBuf {
        self.root.join("assets").join("weights")
    }

    pub fn staged_weights(&self, profile: &VoiceProfile) -> PathBuf {
        self.weights_dir().join(profile.model_file_name())
    }

    pub fn index_dir(&self, profile: &VoiceProfile) -> PathBuf {
        self.root.join("logs").join(&profile.name)
    }

    pub fn staged_index(&self, profile: &VoiceProfile) -> PathBuf {
        self.index_dir(profile).join(profile.index_file_name())
    }

    /// Locations of `infer_cli.py`, in lookup order
    pub fn entry_script_candidates(&self) -> [PathBuf; 2] {
        [
            self.root.join("tools").join("infer_cli.py"),
            self.root.join("infer_cli.py"),
        ]
    }

    pub fn find_entry_script(&self) -> Option<PathBuf> {
        self.entry_script_candidates()
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}
