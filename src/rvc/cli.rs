use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::config::{Config, InferenceConfig};
use crate::utils::encoding::decode_text;
use crate::voice::{AssetLocator, RvcLayout};
use super::interface::{InferenceError, InferenceRequest, InferenceRunner};

const PREVIEW_CHARS: usize = 200;
const RULE: &str = "============================================================";

/// Program and arguments for one `infer_cli.py` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs RVC's `infer_cli.py` as a child process
pub struct RvcCliRunner {
    layout: RvcLayout,
    assets: AssetLocator,
    params: InferenceConfig,
    diagnostic_log: PathBuf,
}

impl RvcCliRunner {
    pub fn new(layout: RvcLayout, params: InferenceConfig, diagnostic_log: PathBuf) -> Self {
        Self {
            assets: AssetLocator::new(layout.clone()),
            layout,
            params,
            diagnostic_log,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            RvcLayout::new(&config.paths.rvc_dir),
            config.inference.clone(),
            config.paths.diagnostic_log(),
        )
    }

    pub fn build_command(&self, script: &Path, request: &InferenceRequest) -> CommandLine {
        let p = &self.params;
        let mut parts = p.interpreter.iter().cloned();
        let script = script.to_string_lossy().into_owned();
        let (program, mut args): (String, Vec<String>) = match parts.next() {
            Some(program) => (program, parts.chain(std::iter::once(script)).collect()),
            None => (script, Vec::new()),
        };

        let flags = [
            ("--f0up_key", p.f0_up_key.to_string()),
            ("--input_path", request.input_path.to_string_lossy().into_owned()),
            ("--f0method", p.f0_method.clone()),
            ("--opt_path", request.output_path.to_string_lossy().into_owned()),
            ("--model_name", request.profile.model_file_name()),
            ("--index_rate", p.index_rate.to_string()),
            ("--device", p.device.clone()),
            ("--is_half", (if p.is_half { "True" } else { "False" }).to_string()),
            ("--filter_radius", p.filter_radius.to_string()),
            ("--resample_sr", p.resample_sr.to_string()),
            ("--rms_mix_rate", p.rms_mix_rate.to_string()),
            ("--protect", p.protect.to_string()),
        ];
        for (flag, value) in flags {
            args.push(flag.to_string());
            args.push(value);
        }

        CommandLine { program, args }
    }

    async fn run(&self, request: &InferenceRequest) -> Result<PathBuf, InferenceError> {
        // Staging may copy a large weights file
        let assets = self.assets.clone();
        let profile = request.profile.clone();
        let staged = tokio::task::spawn_blocking(move || assets.stage(&profile))
            .await
            .unwrap_or(false);
        debug!(staged, "Asset staging finished");

        if let Some(parent) = request.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let script = self
            .layout
            .find_entry_script()
            .ok_or_else(|| InferenceError::EntryScriptNotFound(self.layout.root().to_path_buf()))?;

        let command_line = self.build_command(&script, request);
        info!("Running RVC command: {}", command_line);
        debug!(
            "Working directory: {}, expected output: {}",
            self.layout.root().display(),
            request.output_path.display()
        );

        let child = Command::new(&command_line.program)
            .args(&command_line.args)
            .current_dir(self.layout.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(InferenceError::Spawn)?;

        let timeout = Duration::from_secs(self.params.timeout_secs);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                // Dropping the wait future kills the child
                self.write_diagnostics(&command_line, None, "", "").await;
                return Err(InferenceError::TimedOut(self.params.timeout_secs));
            }
        };

        let code = output.status.code();
        let stdout = decode_text(&output.stdout);
        let stderr = decode_text(&output.stderr);
        self.write_diagnostics(&command_line, code, &stdout, &stderr).await;

        info!(return_code = ?code, "RVC logs saved to: {}", self.diagnostic_log.display());
        if !stdout.is_empty() {
            debug!("STDOUT preview: {}", preview(&stdout));
        }
        if !stderr.is_empty() {
            debug!("STDERR preview: {}", preview(&stderr));
        }

        // The output file, not the exit code, decides success
        match tokio::fs::metadata(&request.output_path).await {
            Ok(meta) if meta.len() > 0 => {
                if !output.status.success() {
                    warn!(return_code = ?code, "RVC exited unsuccessfully but produced output");
                }
                info!(
                    "RVC output created: {} ({} bytes)",
                    request.output_path.display(),
                    meta.len()
                );
                Ok(request.output_path.clone())
            }
            Ok(_) => Err(InferenceError::OutputEmpty(request.output_path.clone())),
            Err(_) if !output.status.success() => Err(InferenceError::ProcessFailed {
                code: code.unwrap_or(-1),
            }),
            Err(_) => Err(InferenceError::OutputMissing(request.output_path.clone())),
        }
    }

    async fn write_diagnostics(
        &self,
        command_line: &CommandLine,
        code: Option<i32>,
        stdout: &str,
        stderr: &str,
    ) {
        let return_code = match code {
            Some(code) => code.to_string(),
            None => "none (killed or timed out)".to_string(),
        };
        let report = format!(
            "Timestamp: {}\nCommand: {}\nWorking dir: {}\nReturn code: {}\n\n{RULE}\nSTDOUT:\n{}\n\n{RULE}\nSTDERR:\n{}\n{RULE}\n",
            chrono::Local::now().to_rfc3339(),
            command_line,
            self.layout.root().display(),
            return_code,
            stdout,
            stderr,
        );

        if let Err(e) = tokio::fs::write(&self.diagnostic_log, report).await {
            warn!(
                "Failed to write RVC diagnostic log {}: {}",
                self.diagnostic_log.display(),
                e
            );
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

#[async_trait]
impl InferenceRunner for RvcCliRunner {
    async fn convert(&self, request: &InferenceRequest) -> Result<PathBuf, InferenceError> {
        info!(voice = %request.profile.name, "Starting RVC inference");

        let result = self.run(request).await;
        if let Err(e) = &result {
            error!(
                voice = %request.profile.name,
                input = %request.input_path.display(),
                output = %request.output_path.display(),
                diagnostic_log = %self.diagnostic_log.display(),
                "RVC inference error: {}",
                e
            );
        }
        result
    }
}
