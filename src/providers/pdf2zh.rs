/*!
 * Backend that shells out to the `pdf2zh` command-line tool.
 *
 * The tool writes `{stem}-mono.pdf` and `{stem}-dual.pdf` into the output
 * directory; the API engines are selected with `-s` and their credentials
 * are passed through the environment.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::process::Stdio;
use tokio::process::Command;

use crate::app_config::Engine;
use crate::errors::ProviderError;
use crate::providers::{Backend, BackendJob, BackendOutput};

/// Longest stderr excerpt carried in an error
const STDERR_EXCERPT_CHARS: usize = 2000;

/// PDFMathTranslate command-line runner
///
/// Invokes `pdf2zh INPUT -li SRC -lo TGT -o DIR [-s SERVICE]`. The tool writes
/// `{stem}-mono.pdf` and `{stem}-dual.pdf` into `DIR`.
#[derive(Debug, Clone)]
pub struct Pdf2zh {
    /// Executable to run
    command: String,
    /// Translation service override, e.g. "openai:gpt-4o"
    service: Option<String>,
    /// Extra environment for the child process (API credentials)
    envs: Vec<(String, String)>,
}

impl Pdf2zh {
    /// Create a runner using the tool's built-in translation service
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            service: None,
            envs: Vec::new(),
        }
    }

    /// Route translation through a named service
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Add an environment variable for the child process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Arguments for one job
    pub fn build_args(&self, job: &BackendJob) -> Vec<String> {
        let mut args = vec![
            job.input.to_string_lossy().to_string(),
            "-li".to_string(),
            job.source_code.clone(),
            "-lo".to_string(),
            job.target_code.clone(),
            "-o".to_string(),
            job.output_dir.to_string_lossy().to_string(),
        ];
        if let Some(service) = &self.service {
            args.push("-s".to_string());
            args.push(service.clone());
        }
        args
    }

    /// Run the tool once for a job
    pub async fn run(&self, job: &BackendJob) -> Result<BackendOutput, ProviderError> {
        let args = self.build_args(job);
        debug!("Running command: {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(&args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProviderError::SpawnFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                status: output.status.code(),
                stderr: excerpt(&stderr),
            });
        }

        debug!("pdf2zh output: {}", String::from_utf8_lossy(&output.stdout).trim());
        if !stderr.trim().is_empty() {
            debug!("pdf2zh errors: {}", stderr.trim());
        }

        let produced = BackendOutput::discover(job);
        if produced.mono.is_none() && produced.dual.is_none() {
            warn!("pdf2zh exited successfully but wrote nothing into {:?}", job.output_dir);
        }
        Ok(produced)
    }
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= STDERR_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let tail: String = trimmed
        .chars()
        .rev()
        .take(STDERR_EXCERPT_CHARS)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}

#[async_trait]
impl Backend for Pdf2zh {
    fn engine(&self) -> Engine {
        Engine::Default
    }

    async fn translate(&self, job: &BackendJob) -> Result<BackendOutput, ProviderError> {
        self.run(job).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ProviderError::SpawnFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ProviderError::CommandFailed {
                status: output.status.code(),
                stderr: excerpt(&String::from_utf8_lossy(&output.stderr)),
            })
        }
    }
}
