use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::pdf_utils;
use crate::pipeline::{Pipeline, PipelineOptions, PipelineReport, RunStatus};
use crate::providers::{self, Backend, PromptLanguages};
use crate::reassembly::{self, ReassemblyOptions, ReassemblySummary};
use crate::translation::{ChunkTranslator, LanguagePair};

// @module: Application controller for PDF translation

/// One translation request from the command line
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    /// PDF to translate
    pub input: PathBuf,
    /// Extra location for the translated document
    pub output: Option<PathBuf>,
    /// Split even when the document is small
    pub force_chunking: bool,
}

impl TranslateRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            force_chunking: false,
        }
    }
}

/// How a document gets translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Split into chunks, translate each, merge
    Chunked,
    /// One backend call over the whole document
    Single,
}

/// Main application controller for PDF translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Backend used instead of the configured engine
    backend_override: Option<Arc<dyn Backend>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            backend_override: None,
        })
    }

    /// Use `backend` instead of building one from the configuration
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend_override = Some(backend);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decide between the chunked and single-document paths
    ///
    /// Returns the mode and the page count of the input.
    pub fn choose_mode(&self, input: &Path, force_chunking: bool) -> Result<(TranslationMode, usize), PipelineError> {
        let pages = pdf_utils::page_count(input)?;
        if force_chunking {
            return Ok((TranslationMode::Chunked, pages));
        }

        let size = FileManager::file_size(input).map_err(|e| PipelineError::Io(e.to_string()))?;
        let mode = if self.config.chunking.is_large(pages, size) {
            TranslationMode::Chunked
        } else {
            TranslationMode::Single
        };
        debug!("{:?}: {} pages, {} bytes -> {:?}", input, pages, size, mode);
        Ok((mode, pages))
    }

    fn build_backend(&self) -> Result<Arc<dyn Backend>, PipelineError> {
        if let Some(backend) = &self.backend_override {
            return Ok(Arc::clone(backend));
        }

        let source_name = language_utils::get_language_name(&self.config.source_language);
        let target_name = language_utils::get_language_name(&self.config.target_language);
        providers::create_backend(
            &self.config.translation,
            PromptLanguages {
                source_name: &source_name,
                target_name: &target_name,
            },
        )
    }

    /// Translate one document and place the results
    pub async fn run(&self, request: TranslateRequest) -> Result<PipelineReport> {
        let start_time = Instant::now();
        let input = &request.input;

        if !input.is_file() {
            return Err(PipelineError::InvalidInput(format!("input file not found: {:?}", input)).into());
        }

        let (mode, pages) = self.choose_mode(input, request.force_chunking)?;
        let backend = self.build_backend()?;

        if self.config.translation.common.preflight {
            debug!("Testing connection to {}", backend.engine().display_name());
            backend
                .test_connection()
                .await
                .map_err(|e| PipelineError::BackendUnavailable(e.to_string()))?;
        }

        let languages = LanguagePair {
            source_code: language_utils::resolve_language_code(&self.config.source_language),
            target_code: language_utils::resolve_language_code(&self.config.target_language),
        };
        info!(
            "Translating {:?} ({} pages) from {} to {} with {}",
            input,
            pages,
            languages.source_code,
            languages.target_code,
            backend.engine().display_name()
        );

        let translator = ChunkTranslator::new(backend, languages);
        let options = PipelineOptions::from_config(&self.config);
        let steps = match mode {
            TranslationMode::Chunked => pages.div_ceil(options.pages_per_chunk.max(1)).max(1),
            TranslationMode::Single => 1,
        };

        let progress_bar = Self::progress_bar(steps as u64);
        let mut pipeline = Pipeline::new(
            translator,
            self.config.output_root.clone(),
            self.config.target_language.clone(),
            options,
        )?
        .with_progress(progress_bar.clone());

        let requested = request.output.as_deref();
        let result = match mode {
            TranslationMode::Chunked => pipeline.run(input, requested).await,
            TranslationMode::Single => pipeline.run_single(input, requested).await,
        };
        progress_bar.finish_and_clear();

        let report = result.with_context(|| format!("Translation of {:?} failed", input))?;
        Self::log_summary(&report, start_time);
        Ok(report)
    }

    /// Merge chunk directories left under `directory`
    pub fn run_merge(&self, directory: &Path, options: &ReassemblyOptions) -> Result<ReassemblySummary> {
        let summary = reassembly::merge_chunk_groups(directory, options)?;

        for (name, reason) in &summary.failures {
            warn!("{}: {}", name, reason);
        }
        info!(
            "Merged {}/{} chunk group(s)",
            summary.succeeded(),
            summary.processed
        );
        Ok(summary)
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    fn log_summary(report: &PipelineReport, start_time: Instant) {
        let produced: Vec<String> = report.produced_kinds().iter().map(|k| k.to_string()).collect();

        info!(
            "Chunks: {} processed, {} succeeded, {} failed",
            report.chunks_processed(),
            report.chunks_succeeded(),
            report.chunks_failed()
        );
        for (index, reason) in report.failures() {
            warn!("Chunk {} failed: {}", index, reason);
        }
        for (kind, reason) in &report.merge_failures {
            warn!("Merging {} output failed: {}", kind, reason);
        }
        if let Some(mono) = &report.mono {
            info!("Translated: {:?}", mono);
        }
        if let Some(dual) = &report.dual {
            info!("Bilingual: {:?}", dual);
        }
        if let Some(delivered) = &report.delivered {
            info!("Copied to: {:?}", delivered);
        }

        let status = match report.status {
            RunStatus::Complete => "complete",
            RunStatus::Partial => "partial (some chunks failed)",
        };
        info!(
            "Produced [{}], status {}, in {:.1}s",
            produced.join(", "),
            status,
            start_time.elapsed().as_secs_f64()
        );
    }
}
