/*!
 * Split → translate → collect → merge orchestration.
 *
 * A run moves through [`PipelineState`]s. Per-chunk failures are recorded and
 * never abort the run; the run succeeds when at least one merged artifact was
 * produced. Chunk outcomes land in slots indexed by chunk position, and merges
 * read the slots in order, so completion order never changes page order.
 */

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::app_config::Config;
use crate::chunking::{Chunk, ChunkSplitter};
use crate::collector;
use crate::errors::PipelineError;
use crate::file_utils::{FileManager, OutputLayout};
use crate::merger;
use crate::pdf_utils;
use crate::translation::{ArtifactKind, ChunkTranslator, TranslationOutcome};

/// Stages of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initialized,
    Splitting,
    TranslatingChunks,
    Merging,
    Finalizing,
    Succeeded,
    Failed,
}

/// Overall result of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every chunk produced output
    Complete,
    /// Some chunks failed; the artifacts have gaps
    Partial,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub pages: usize,
    pub outcome: TranslationOutcome,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub chunks: Vec<ChunkReport>,
    /// Final mono artifact at its canonical location
    pub mono: Option<PathBuf>,
    /// Final dual artifact at its canonical location
    pub dual: Option<PathBuf>,
    /// Copy of the mono artifact at the caller-requested path
    pub delivered: Option<PathBuf>,
    /// Kinds whose merge failed, with the reason
    pub merge_failures: Vec<(ArtifactKind, String)>,
    pub status: RunStatus,
}

impl PipelineReport {
    pub fn chunks_processed(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks_succeeded(&self) -> usize {
        self.chunks.iter().filter(|c| !c.outcome.is_failed()).count()
    }

    pub fn chunks_failed(&self) -> usize {
        self.chunks_processed() - self.chunks_succeeded()
    }

    /// `(chunk index, reason)` for every failed chunk
    pub fn failures(&self) -> Vec<(usize, &str)> {
        self.chunks
            .iter()
            .filter_map(|c| c.outcome.failure_reason().map(|reason| (c.index, reason)))
            .collect()
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Path> {
        match kind {
            ArtifactKind::Mono => self.mono.as_deref(),
            ArtifactKind::Dual => self.dual.as_deref(),
        }
    }

    /// Kinds that were produced
    pub fn produced_kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.artifact(*kind).is_some())
            .collect()
    }

    /// The path the user should look at first
    pub fn primary_output(&self) -> Option<&Path> {
        self.delivered
            .as_deref()
            .or(self.mono.as_deref())
            .or(self.dual.as_deref())
    }
}

/// Tunables of a run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub pages_per_chunk: usize,
    /// 1 means strictly sequential
    pub max_concurrent_chunks: usize,
    /// Minimum spacing between dispatches to quota-sharing backends
    pub dispatch_delay: Duration,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pages_per_chunk: config.chunking.pages_per_chunk,
            max_concurrent_chunks: config.chunking.max_concurrent_chunks,
            dispatch_delay: Duration::from_millis(config.translation.dispatch_delay_ms()),
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            pages_per_chunk: 20,
            max_concurrent_chunks: 1,
            dispatch_delay: Duration::ZERO,
        }
    }
}

/// Enforces a fixed pause between successive dispatches
#[derive(Debug)]
struct DispatchPacer {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl DispatchPacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        // Held across the sleep so concurrent dispatches queue up
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let ready = previous + self.delay;
            let now = Instant::now();
            if ready > now {
                tokio::time::sleep(ready - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Orchestrates one document through the chunked translation flow
#[derive(Debug)]
pub struct Pipeline {
    translator: ChunkTranslator,
    splitter: ChunkSplitter,
    output_root: PathBuf,
    target_language: String,
    max_concurrent_chunks: usize,
    pacer: DispatchPacer,
    progress: Option<ProgressBar>,
    state: PipelineState,
}

impl Pipeline {
    /// Fails with `InvalidInput` when `pages_per_chunk` is zero
    pub fn new(
        translator: ChunkTranslator,
        output_root: impl Into<PathBuf>,
        target_language: impl Into<String>,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        let splitter = ChunkSplitter::new(options.pages_per_chunk)?;
        let delay = if translator.backend().shares_quota() {
            options.dispatch_delay
        } else {
            Duration::ZERO
        };

        Ok(Self {
            translator,
            splitter,
            output_root: output_root.into(),
            target_language: target_language.into(),
            max_concurrent_chunks: options.max_concurrent_chunks.max(1),
            pacer: DispatchPacer::new(delay),
            progress: None,
            state: PipelineState::Initialized,
        })
    }

    /// Advance a progress bar as chunks complete
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Layout the pipeline uses for `input`
    pub fn layout_for(&self, input: &Path) -> OutputLayout {
        OutputLayout::new(&self.output_root, &self.target_language, input)
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        self.transition(PipelineState::Failed);
        error
    }

    /// Run the chunked flow on `input`
    ///
    /// When `requested_output` names a file other than the canonical mono
    /// location, the mono artifact is copied there as well.
    pub async fn run(&mut self, input: &Path, requested_output: Option<&Path>) -> Result<PipelineReport, PipelineError> {
        if !input.is_file() {
            return Err(self.fail(PipelineError::InvalidInput(format!(
                "input file not found: {:?}",
                input
            ))));
        }

        self.transition(PipelineState::Splitting);
        let chunk_set = match self.splitter.split(input) {
            Ok(set) => set,
            Err(e) => return Err(self.fail(e)),
        };
        if chunk_set.is_empty() {
            return Err(self.fail(PipelineError::EmptyDocument));
        }
        info!(
            "Split {} pages into {} chunk(s) of up to {} pages",
            chunk_set.total_pages(),
            chunk_set.len(),
            self.splitter.pages_per_chunk()
        );

        let layout = self.layout_for(input);
        if let Err(e) = FileManager::ensure_dir(layout.root()) {
            return Err(self.fail(PipelineError::Io(e.to_string())));
        }

        self.transition(PipelineState::TranslatingChunks);
        let chunks = self.translate_chunks(chunk_set.chunks(), &layout).await;

        self.transition(PipelineState::Merging);
        let mut merge_failures = Vec::new();
        let mut merged = [None, None];
        for (slot, kind) in ArtifactKind::ALL.into_iter().enumerate() {
            let artifacts: Vec<(usize, PathBuf)> = chunks
                .iter()
                .filter_map(|c| c.outcome.artifact(kind).map(|path| (c.index, path.to_path_buf())))
                .collect();
            if artifacts.is_empty() {
                debug!("No {} artifacts to merge", kind);
                continue;
            }

            match merger::merge(&artifacts, &layout.final_artifact(kind)) {
                Ok(result) => merged[slot] = Some(result.output),
                Err(e) => {
                    warn!("Merging {} artifacts failed: {}", kind, e);
                    merge_failures.push((kind, e.to_string()));
                }
            }
        }
        let [mono, dual] = merged;

        // Chunk files are no longer needed
        drop(chunk_set);
        self.finalize(input, chunks, mono, dual, merge_failures, requested_output)
    }

    /// Translate `input` in a single backend call, without splitting
    ///
    /// The backend works directly in the document's output directory, so its
    /// artifacts end up at the canonical final locations.
    pub async fn run_single(&mut self, input: &Path, requested_output: Option<&Path>) -> Result<PipelineReport, PipelineError> {
        if !input.is_file() {
            return Err(self.fail(PipelineError::InvalidInput(format!(
                "input file not found: {:?}",
                input
            ))));
        }

        let pages = match pdf_utils::page_count(input) {
            Ok(0) => return Err(self.fail(PipelineError::EmptyDocument)),
            Ok(pages) => pages,
            Err(e) => return Err(self.fail(e.into())),
        };

        let layout = self.layout_for(input);
        self.transition(PipelineState::TranslatingChunks);
        let mut outcome = self.translator.translate_chunk(input, layout.root()).await;
        if !outcome.is_failed() {
            outcome = collector::collect(layout.input_base(), layout.root(), layout.target_language());
        }
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }

        self.transition(PipelineState::Merging);
        let mono = outcome.artifact(ArtifactKind::Mono).map(Path::to_path_buf);
        let dual = outcome.artifact(ArtifactKind::Dual).map(Path::to_path_buf);
        let chunks = vec![ChunkReport {
            index: 1,
            pages,
            outcome,
        }];

        self.finalize(input, chunks, mono, dual, Vec::new(), requested_output)
    }

    async fn translate_chunks(&self, chunks: &[Chunk], layout: &OutputLayout) -> Vec<ChunkReport> {
        let mut slots: Vec<Option<TranslationOutcome>> = vec![None; chunks.len()];

        if self.max_concurrent_chunks > 1 {
            info!(
                "Translating {} chunk(s), up to {} at a time",
                chunks.len(),
                self.max_concurrent_chunks
            );
        }

        let mut completions = stream::iter(chunks.iter().enumerate())
            .map(|(position, chunk)| async move { (position, self.process_chunk(chunk, layout).await) })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((position, outcome)) = completions.next().await {
            slots[position] = Some(outcome);
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        chunks
            .iter()
            .zip(slots)
            .map(|(chunk, slot)| ChunkReport {
                index: chunk.index,
                pages: chunk.page_count(),
                outcome: slot.unwrap_or_else(|| TranslationOutcome::Failed("chunk was not processed".to_string())),
            })
            .collect()
    }

    async fn process_chunk(&self, chunk: &Chunk, layout: &OutputLayout) -> TranslationOutcome {
        self.pacer.wait().await;

        let working_dir = layout.chunk_dir(chunk.index);
        info!(
            "Translating chunk {} (pages {}-{})",
            chunk.index,
            chunk.start + 1,
            chunk.end + 1
        );

        let outcome = self.translator.translate_chunk(&chunk.path, &working_dir).await;
        if outcome.is_failed() {
            return outcome;
        }

        let collected = collector::collect(&chunk.base_name(), &working_dir, layout.target_language());
        match &collected {
            TranslationOutcome::Failed(reason) => warn!("Chunk {} failed: {}", chunk.index, reason),
            _ => debug!("Chunk {} collected: {:?}", chunk.index, collected),
        }
        collected
    }

    fn finalize(
        &mut self,
        input: &Path,
        chunks: Vec<ChunkReport>,
        mono: Option<PathBuf>,
        dual: Option<PathBuf>,
        merge_failures: Vec<(ArtifactKind, String)>,
        requested_output: Option<&Path>,
    ) -> Result<PipelineReport, PipelineError> {
        self.transition(PipelineState::Finalizing);

        if mono.is_none() && dual.is_none() {
            let processed = chunks.len();
            return Err(self.fail(PipelineError::NoOutputProduced { chunks: processed }));
        }

        let delivered = match (requested_output, &mono) {
            (Some(requested), Some(mono)) if !FileManager::same_location(requested, mono) => {
                if let Err(e) = FileManager::copy_file(mono, requested) {
                    return Err(self.fail(PipelineError::Io(e.to_string())));
                }
                info!("Copied translated document to {:?}", requested);
                Some(requested.to_path_buf())
            }
            (Some(_), None) => {
                warn!("No translated (mono) document was produced; nothing copied to the requested output");
                None
            }
            _ => None,
        };

        let status = if chunks.iter().any(|c| c.outcome.is_failed()) {
            RunStatus::Partial
        } else {
            RunStatus::Complete
        };

        self.transition(PipelineState::Succeeded);
        Ok(PipelineReport {
            input: input.to_path_buf(),
            chunks,
            mono,
            dual,
            delivered,
            merge_failures,
            status,
        })
    }
}
