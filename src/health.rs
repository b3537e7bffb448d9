use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::voice::{RvcLayout, VoiceProfile};

/// Snapshot of what is on disk, computed fresh for every `/health` call
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub status: &'static str,
    pub available_voices: Vec<String>,
    pub rvc_installed: bool,
    /// `<voice>_model` and `<voice>_index`, each "loaded" or "missing"
    #[serde(flatten)]
    pub voice_assets: BTreeMap<String, &'static str>,
    pub infer_cli: &'static str,
    pub ready: bool,
}

impl ReadinessReport {
    pub fn collect(layout: &RvcLayout, profile: &VoiceProfile) -> Self {
        let rvc_installed = layout.is_installed();
        let model_exists = profile.weights_path.is_file();
        let index_exists = profile.index_path.is_file();
        let infer_cli_exists = layout.find_entry_script().is_some();

        let mut voice_assets = BTreeMap::new();
        voice_assets.insert(format!("{}_model", profile.name), loaded(model_exists));
        voice_assets.insert(format!("{}_index", profile.name), loaded(index_exists));

        Self {
            status: "running",
            available_voices: vec![profile.name.clone()],
            rvc_installed,
            voice_assets,
            infer_cli: if infer_cli_exists { "found" } else { "missing" },
            // The index is optional
            ready: rvc_installed && model_exists && infer_cli_exists,
        }
    }
}

fn loaded(exists: bool) -> &'static str {
    if exists {
        "loaded"
    } else {
        "missing"
    }
}

/// Print what the service found on disk at boot
pub fn log_startup_summary(layout: &RvcLayout, profile: &VoiceProfile) {
    info!("Voice Cloning Service - RVC Integration");
    if let Some(models_dir) = profile.weights_path.parent() {
        info!("Models: {}", models_dir.display());
    }
    info!("RVC: {}", layout.root().display());

    if layout.is_installed() {
        info!("RVC found");
        match layout.find_entry_script() {
            Some(script) => info!("infer_cli.py found at {}", script.display()),
            None => warn!("infer_cli.py NOT FOUND - check the RVC installation"),
        }
    } else {
        warn!(
            "RVC NOT FOUND. Run: git clone https://github.com/RVC-Project/Retrieval-based-Voice-Conversion-WebUI.git {}",
            layout.root().display()
        );
    }

    match std::fs::metadata(&profile.weights_path) {
        Ok(meta) => info!(
            "{} model: {:.1} MB",
            profile.name,
            meta.len() as f64 / (1024.0 * 1024.0)
        ),
        Err(_) => warn!("{} model missing at {}", profile.name, profile.weights_path.display()),
    }

    if profile.index_path.is_file() {
        info!("{} index found", profile.name);
    } else {
        warn!("{} index missing (optional)", profile.name);
    }
}
