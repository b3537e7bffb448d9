use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::audio::{FfmpegTranscoder, Transcoder};
use crate::config::Config;
use crate::rvc::{InferenceRunner, RvcCliRunner};
use crate::voice::{RvcLayout, VoiceProfile};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profile: Arc<VoiceProfile>,
    pub layout: RvcLayout,
    pub scratch_dir: PathBuf,
    pub runner: Arc<dyn InferenceRunner>,
    pub transcoder: Arc<dyn Transcoder>,
    /// Present only when `server.max_concurrent_jobs` is set
    pub job_slots: Option<Arc<Semaphore>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let runner = Arc::new(RvcCliRunner::from_config(&config));
        let transcoder = Arc::new(FfmpegTranscoder::new(config.transcode.clone()));
        Self::with_components(config, runner, transcoder)
    }

    /// Build state around an arbitrary runner and transcoder
    pub fn with_components(
        config: Config,
        runner: Arc<dyn InferenceRunner>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let profile = Arc::new(VoiceProfile::from_config(&config));
        let layout = RvcLayout::new(&config.paths.rvc_dir);
        let scratch_dir = config.paths.scratch_dir();
        let job_slots = config
            .server
            .max_concurrent_jobs
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        Self {
            config: Arc::new(config),
            profile,
            layout,
            scratch_dir,
            runner,
            transcoder,
            job_slots,
        }
    }
}
