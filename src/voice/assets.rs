use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use super::{RvcLayout, VoiceProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Copied,
    AlreadyPresent,
    SourceMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub weights: StageOutcome,
    pub index: StageOutcome,
}

/// Copies a profile's model files into the layout RVC expects
#[derive(Debug, Clone)]
pub struct AssetLocator {
    layout: RvcLayout,
}

impl AssetLocator {
    pub fn new(layout: RvcLayout) -> Self {
        Self { layout }
    }

    /// Best-effort staging. Failures are logged and reported as `false`; the caller
    /// carries on and lets RVC complain if the assets really are unusable.
    pub fn stage(&self, profile: &VoiceProfile) -> bool {
        match self.stage_report(profile) {
            Ok(report) => {
                debug!(voice = %profile.name, ?report, "Voice assets staged");
                true
            }
            Err(e) => {
                error!(voice = %profile.name, "Error setting up RVC model: {}", e);
                false
            }
        }
    }

    pub fn stage_report(&self, profile: &VoiceProfile) -> io::Result<StageReport> {
        fs::create_dir_all(self.layout.weights_dir())?;
        let weights = stage_file(&profile.weights_path, &self.layout.staged_weights(profile))?;

        // The index is optional; only create its directory when there is something to put in it
        let index = if profile.index_path.is_file() {
            fs::create_dir_all(self.layout.index_dir(profile))?;
            stage_file(&profile.index_path, &self.layout.staged_index(profile))?
        } else {
            StageOutcome::SourceMissing
        };

        Ok(StageReport { weights, index })
    }
}

fn stage_file(source: &Path, dest: &Path) -> io::Result<StageOutcome> {
    if dest.exists() {
        return Ok(StageOutcome::AlreadyPresent);
    }
    if !source.is_file() {
        return Ok(StageOutcome::SourceMissing);
    }

    let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dest_dir)?;
    io::copy(&mut File::open(source)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    // Another request may have won the race while we were copying; its file is identical
    match staged.persist_noclobber(dest) {
        Ok(_) => {
            info!("Copied {} to {}", source.display(), dest.display());
            Ok(StageOutcome::Copied)
        }
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(StageOutcome::AlreadyPresent)
        }
        Err(e) => Err(e.error),
    }
}
