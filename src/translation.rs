/*!
 * Chunk translation adapter.
 *
 * The [`ChunkTranslator`] is the boundary between the pipeline and whatever
 * backend was selected at construction time. It performs exactly one backend
 * invocation per chunk and folds every failure into
 * [`TranslationOutcome::Failed`], so nothing a backend does can abort the run.
 */

use log::{debug, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::providers::{Backend, BackendJob};

/// The two kinds of translated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Target language only
    Mono,
    /// Source and target side by side
    Dual,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Mono, ArtifactKind::Dual];

    /// Suffix used in canonical artifact names
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Mono => "translated",
            Self::Dual => "bilingual",
        }
    }

    /// Suffix the external tool writes before renaming
    pub fn native_suffix(&self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Dual => "dual",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mono => write!(f, "mono"),
            Self::Dual => write!(f, "dual"),
        }
    }
}

/// Result of translating one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    MonoProduced(PathBuf),
    DualProduced(PathBuf),
    Both { mono: PathBuf, dual: PathBuf },
    Failed(String),
}

impl TranslationOutcome {
    /// Build an outcome from whichever artifacts exist
    pub fn from_artifacts(mono: Option<PathBuf>, dual: Option<PathBuf>) -> Self {
        match (mono, dual) {
            (Some(mono), Some(dual)) => Self::Both { mono, dual },
            (Some(mono), None) => Self::MonoProduced(mono),
            (None, Some(dual)) => Self::DualProduced(dual),
            (None, None) => Self::Failed("no output produced".to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Path of the artifact of the given kind, if any
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Path> {
        match (self, kind) {
            (Self::MonoProduced(path), ArtifactKind::Mono)
            | (Self::DualProduced(path), ArtifactKind::Dual) => Some(path),
            (Self::Both { mono, .. }, ArtifactKind::Mono) => Some(mono),
            (Self::Both { dual, .. }, ArtifactKind::Dual) => Some(dual),
            _ => None,
        }
    }

    /// Failure reason, if the chunk failed
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Language pair a translator works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    /// Code passed to the backend, e.g. "en"
    pub source_code: String,
    /// Code passed to the backend, e.g. "ja"
    pub target_code: String,
}

/// Runs one chunk through the selected backend
#[derive(Debug, Clone)]
pub struct ChunkTranslator {
    backend: Arc<dyn Backend>,
    languages: LanguagePair,
}

impl ChunkTranslator {
    pub fn new(backend: Arc<dyn Backend>, languages: LanguagePair) -> Self {
        Self { backend, languages }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Translate the PDF at `chunk_path`, writing backend output into `working_dir`
    ///
    /// Never returns an error: any backend failure becomes `Failed(reason)`.
    pub async fn translate_chunk(&self, chunk_path: &Path, working_dir: &Path) -> TranslationOutcome {
        if let Err(e) = std::fs::create_dir_all(working_dir) {
            return TranslationOutcome::Failed(format!(
                "cannot create working directory {:?}: {}",
                working_dir, e
            ));
        }

        let job = BackendJob {
            input: chunk_path.to_path_buf(),
            output_dir: working_dir.to_path_buf(),
            source_code: self.languages.source_code.clone(),
            target_code: self.languages.target_code.clone(),
        };

        debug!("Dispatching {:?} to {}", chunk_path, self.backend.engine().display_name());
        match self.backend.translate(&job).await {
            Ok(output) => TranslationOutcome::from_artifacts(output.mono, output.dual),
            Err(e) => {
                warn!("Backend failed on {:?}: {}", chunk_path, e);
                TranslationOutcome::Failed(e.to_string())
            }
        }
    }
}
