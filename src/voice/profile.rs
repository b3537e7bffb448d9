use std::path::PathBuf;

use crate::config::Config;

/// A target speaker and the model files that drive its conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceProfile {
    pub name: String,
    pub weights_path: PathBuf,
    pub index_path: PathBuf,
}

impl VoiceProfile {
    pub fn from_config(config: &Config) -> Self {
        let models_dir = &config.paths.models_dir;
        Self {
            name: config.voice.name.clone(),
            weights_path: models_dir.join(&config.voice.weights_file),
            index_path: models_dir.join(&config.voice.index_file),
        }
    }

    /// File name RVC resolves under `assets/weights/`
    pub fn model_file_name(&self) -> String {
        format!("{}.pth", self.name)
    }

    /// Index name RVC's auto-discovery looks for under `logs/<name>/`
    pub fn index_file_name(&self) -> String {
        format!("added_IVF256_Flat_nprobe_1_{}_v2.index", self.name)
    }

    pub fn matches(&self, requested: &str) -> bool {
        self.name == requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paths_from_models_dir() {
        let mut config = Config::default();
        config.paths.models_dir = PathBuf::from("/srv/models");

        let profile = VoiceProfile::from_config(&config);
        assert_eq!(profile.name, "trump");
        assert_eq!(profile.weights_path, PathBuf::from("/srv/models/model.pth"));
        assert_eq!(profile.index_path, PathBuf::from("/srv/models/model.index"));
        assert_eq!(profile.model_file_name(), "trump.pth");
        assert_eq!(
            profile.index_file_name(),
            "added_IVF256_Flat_nprobe_1_trump_v2.index"
        );
    }

    #[test]
    fn matching_is_exact() {
        let profile = VoiceProfile::from_config(&Config::default());
        assert!(profile.matches("trump"));
        assert!(!profile.matches("Trump"));
        assert!(!profile.matches(""));
    }
}
