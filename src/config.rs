use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::Result;
use regex::Regex;

use crate::utils::encoding::load_text_file_with_guess_encoding;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub voice: VoiceConfig,
    pub inference: InferenceConfig,
    pub transcode: TranscodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Upper bound on simultaneous conversions; unbounded when absent.
    pub max_concurrent_jobs: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub models_dir: PathBuf,
    pub rvc_dir: PathBuf,
    /// Where per-request job directories are created. Defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
    /// Overwritten after every RVC run. Defaults to `<temp>/rvc_debug.log`.
    pub diagnostic_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub name: String,
    pub weights_file: String,
    pub index_file: String,
}

/// Arguments handed to `infer_cli.py`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Program plus leading arguments used to run the entry script, e.g. `["py", "-3.10"]`.
    /// When empty the script is executed directly.
    pub interpreter: Vec<String>,
    pub f0_up_key: i32,
    pub f0_method: String,
    pub index_rate: f64,
    pub device: String,
    pub is_half: bool,
    pub filter_radius: u32,
    pub resample_sr: u32,
    pub rms_mix_rate: f64,
    pub protect: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    pub enabled: bool,
    pub ffmpeg_path: String,
    pub bitrate: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            max_upload_bytes: 50 * 1024 * 1024,
            max_concurrent_jobs: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            rvc_dir: PathBuf::from("../rvc"),
            scratch_dir: None,
            diagnostic_log: None,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: "trump".to_string(),
            weights_file: "model.pth".to_string(),
            index_file: "model.index".to_string(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            interpreter: vec!["py".to_string(), "-3.10".to_string()],
            f0_up_key: 0,
            f0_method: "rmvpe".to_string(),
            index_rate: 0.75,
            device: "cuda:0".to_string(),
            is_half: true,
            filter_radius: 3,
            resample_sr: 0,
            rms_mix_rate: 0.25,
            protect: 0.33,
            timeout_secs: 300,
        }
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ffmpeg_path: "ffmpeg".to_string(),
            bitrate: "128k".to_string(),
            timeout_secs: 60,
        }
    }
}

impl PathsConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn diagnostic_log(&self) -> PathBuf {
        self.diagnostic_log
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("rvc_debug.log"))
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = load_text_file_with_guess_encoding(path)?;
        let content = expand_env_vars(&content)?;

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}

/// Replace `${VAR_NAME}` with the variable's value, leaving unknown names untouched.
pub fn expand_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let expanded = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_rvc_cli_policy() {
        let config = Config::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.voice.name, "trump");
        assert_eq!(config.inference.f0_up_key, 0);
        assert_eq!(config.inference.f0_method, "rmvpe");
        assert_eq!(config.inference.index_rate, 0.75);
        assert_eq!(config.inference.device, "cuda:0");
        assert!(config.inference.is_half);
        assert_eq!(config.inference.filter_radius, 3);
        assert_eq!(config.inference.resample_sr, 0);
        assert_eq!(config.inference.rms_mix_rate, 0.25);
        assert_eq!(config.inference.protect, 0.33);
        assert_eq!(config.inference.timeout_secs, 300);
        assert_eq!(config.transcode.bitrate, "128k");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 6001\ninference:\n  device: cpu\n  is_half: false\n"
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 6001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.inference.device, "cpu");
        assert!(!config.inference.is_half);
        assert_eq!(config.inference.protect, 0.33);
        assert_eq!(config.voice.index_file, "model.index");
    }

    #[test]
    fn json_config_is_detected_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"voice": {{"name": "narrator"}}}}"#).unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.voice.name, "narrator");
        assert_eq!(config.voice.weights_file, "model.pth");
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("VOICE_CLONE_TEST_RVC", "/opt/rvc");
        let expanded =
            expand_env_vars("rvc_dir: ${VOICE_CLONE_TEST_RVC}\nother: ${VOICE_CLONE_UNSET_VAR}")
                .unwrap();
        assert_eq!(expanded, "rvc_dir: /opt/rvc\nother: ${VOICE_CLONE_UNSET_VAR}");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load("/definitely/not/here.yaml").is_err());
    }
}
