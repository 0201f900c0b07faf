/*!
 * Backend implementations for the different translation engines.
 *
 * Every engine implements [`Backend`], so the pipeline treats them uniformly:
 * - `pdf2zh`: PDFMathTranslate command-line tool, default engine
 * - `api`: pdf2zh pointed at a hosted model, with an HTTP preflight client:
 *   - `openai`: OpenAI chat completions
 *   - `gemini`: Google Gemini
 *   - `anthropic`: Anthropic messages
 * - `mock`: scripted backend for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::{Engine, TranslationConfig};
use crate::errors::{PipelineError, ProviderError};
use crate::file_utils::native_artifact_file_name;
use crate::translation::ArtifactKind;

/// One backend invocation
#[derive(Debug, Clone)]
pub struct BackendJob {
    /// PDF to translate
    pub input: PathBuf,
    /// Directory the backend writes its output into
    pub output_dir: PathBuf,
    /// Source language code
    pub source_code: String,
    /// Target language code
    pub target_code: String,
}

impl BackendJob {
    /// Stem the backend derives its output names from
    pub fn base_name(&self) -> String {
        crate::file_utils::FileManager::base_name(&self.input)
    }

    /// Where the backend writes the artifact of the given kind
    pub fn native_output(&self, kind: ArtifactKind) -> PathBuf {
        self.output_dir
            .join(native_artifact_file_name(&self.base_name(), kind))
    }
}

/// Files a backend reports having written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOutput {
    pub mono: Option<PathBuf>,
    pub dual: Option<PathBuf>,
}

impl BackendOutput {
    /// Resolve the native output paths of a job that exist on disk
    pub fn discover(job: &BackendJob) -> Self {
        let existing = |kind: ArtifactKind| Some(job.native_output(kind)).filter(|p| p.is_file());
        Self {
            mono: existing(ArtifactKind::Mono),
            dual: existing(ArtifactKind::Dual),
        }
    }
}

/// Common trait for all translation backends
///
/// Implementations perform exactly one attempt per call. They report
/// failures through [`ProviderError`]; the chunk translator turns those
/// into per-chunk failures.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Engine this backend implements
    fn engine(&self) -> Engine;

    /// Translate one PDF
    async fn translate(&self, job: &BackendJob) -> Result<BackendOutput, ProviderError>;

    /// Check that the backend can be reached
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Whether calls draw from a shared hosted quota
    fn shares_quota(&self) -> bool {
        self.engine().is_api()
    }
}

/// Names used to render the preflight prompt
#[derive(Debug, Clone)]
pub struct PromptLanguages<'a> {
    pub source_name: &'a str,
    pub target_name: &'a str,
}

/// Build the backend selected in the configuration
///
/// Selecting an API engine without credentials fails here, before any
/// document is touched.
pub fn create_backend(
    config: &TranslationConfig,
    languages: PromptLanguages<'_>,
) -> Result<Arc<dyn Backend>, PipelineError> {
    let engine = config.engine;
    let runner = pdf2zh::Pdf2zh::new(config.common.pdf2zh_command.clone());

    if !engine.is_api() {
        return Ok(Arc::new(runner));
    }

    let api_key = config.get_api_key();
    if api_key.is_empty() {
        return Err(PipelineError::BackendUnavailable(format!(
            "{} engine selected but no API key configured (checked config and {})",
            engine.display_name(),
            engine.api_key_env_vars().join(", ")
        )));
    }

    let system_prompt = config
        .common
        .system_prompt
        .replace("{source_language}", languages.source_name)
        .replace("{target_language}", languages.target_name);

    let backend = api::ApiBackend::new(
        engine,
        runner,
        api::ApiSettings {
            api_key,
            endpoint: config.get_endpoint(),
            model: config.get_model(),
            timeout_secs: config.get_timeout_secs(),
            system_prompt,
        },
    );
    Ok(Arc::new(backend))
}

/// Map a non-success HTTP status to a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

/// Map a transport error to a provider error
pub(crate) fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Reject an empty model reply
pub(crate) fn require_text(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        return Err(ProviderError::ParseError("response contained no text".to_string()));
    }
    Ok(text)
}

/// Join an API base URL with a path
pub(crate) fn api_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub mod anthropic;
pub mod api;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod pdf2zh;
