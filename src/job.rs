use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// Scratch space for one `/clone` request.
///
/// Every temporary the request creates (upload, RVC output, MP3) lives under one
/// uniquely named directory that is removed when the job is dropped, whichever way
/// the request ends.
pub struct ConversionJob {
    id: Uuid,
    dir: Option<TempDir>,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl ConversionJob {
    pub fn create_in(scratch_dir: &Path) -> io::Result<Self> {
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("clone-{}-", id))
            .tempdir_in(scratch_dir)?;

        let input_path = dir.path().join("input.wav");
        let output_path = dir.path().join("out").join("output.wav");
        debug!(job_id = %id, "Created job directory {}", dir.path().display());

        Ok(Self {
            id,
            dir: Some(dir),
            input_path,
            output_path,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl Drop for ConversionJob {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!(job_id = %self.id, "Removed job directory {}", path.display()),
                Err(e) => warn!(job_id = %self.id, "Cleanup warning for {}: {}", path.display(), e),
            }
        }
    }
}
