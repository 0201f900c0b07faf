/*!
 * Mock backend for testing.
 *
 * The mock "translates" a PDF by copying it to the names the real tool
 * would write, so downstream collection and merging see genuine PDFs.
 * Behavior is scripted globally or per chunk index:
 * - `MockBackend::working()` - writes both artifacts
 * - `MockBackend::new(MockBehavior::MonoOnly)` / `DualOnly` - one artifact
 * - `MockBackend::silent()` - reports success but writes nothing
 * - `MockBackend::failing()` - always errors
 * - `with_corrupt_output(kind)` - writes bytes that are not a PDF for one kind
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::app_config::Engine;
use crate::errors::ProviderError;
use crate::providers::{Backend, BackendJob, BackendOutput};
use crate::translation::ArtifactKind;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Writes mono and dual output
    Both,
    /// Writes only the mono output
    MonoOnly,
    /// Writes only the dual output
    DualOnly,
    /// Succeeds without writing anything
    Silent,
    /// Always fails with an error
    Failing,
}

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct MockDispatch {
    /// Chunk index parsed from the input name, if it follows `chunk_NNN`
    pub chunk_index: Option<usize>,
    pub started_at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    dispatches: Vec<MockDispatch>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Scripted backend
#[derive(Debug, Clone)]
pub struct MockBackend {
    behavior: MockBehavior,
    overrides: HashMap<usize, MockBehavior>,
    delays: HashMap<usize, Duration>,
    corrupt: Vec<ArtifactKind>,
    engine: Engine,
    connection_ok: bool,
    /// Shared between clones
    call_count: Arc<AtomicUsize>,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            overrides: HashMap::new(),
            delays: HashMap::new(),
            corrupt: Vec::new(),
            engine: Engine::Default,
            connection_ok: true,
            call_count: Arc::new(AtomicUsize::new(0)),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a mock that writes both artifacts
    pub fn working() -> Self {
        Self::new(MockBehavior::Both)
    }

    /// Create a mock that reports success without output
    pub fn silent() -> Self {
        Self::new(MockBehavior::Silent)
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Use a different behavior for one chunk
    pub fn with_chunk_behavior(mut self, chunk_index: usize, behavior: MockBehavior) -> Self {
        self.overrides.insert(chunk_index, behavior);
        self
    }

    /// Delay the response for one chunk
    pub fn with_chunk_delay(mut self, chunk_index: usize, delay: Duration) -> Self {
        self.delays.insert(chunk_index, delay);
        self
    }

    /// Write garbage instead of a PDF for one artifact kind
    pub fn with_corrupt_output(mut self, kind: ArtifactKind) -> Self {
        self.corrupt.push(kind);
        self
    }

    /// Report a different engine
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Make `test_connection` fail
    pub fn unreachable(mut self) -> Self {
        self.connection_ok = false;
        self
    }

    /// Number of `translate` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Calls in dispatch order
    pub fn dispatches(&self) -> Vec<MockDispatch> {
        self.state
            .lock()
            .map(|state| state.dispatches.clone())
            .unwrap_or_default()
    }

    /// Highest number of simultaneous `translate` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().map(|state| state.max_in_flight).unwrap_or(0)
    }

    fn behavior_for(&self, chunk_index: Option<usize>) -> MockBehavior {
        chunk_index
            .and_then(|index| self.overrides.get(&index).copied())
            .unwrap_or(self.behavior)
    }

    fn enter(&self, chunk_index: Option<usize>) {
        if let Ok(mut state) = self.state.lock() {
            state.dispatches.push(MockDispatch {
                chunk_index,
                started_at: Instant::now(),
            });
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
    }

    fn leave(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }

    fn write_outputs(&self, job: &BackendJob, kinds: &[ArtifactKind]) -> Result<BackendOutput, ProviderError> {
        std::fs::create_dir_all(&job.output_dir)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        for kind in kinds {
            let target = job.native_output(*kind);
            let written = if self.corrupt.contains(kind) {
                std::fs::write(&target, b"not a pdf")
            } else {
                std::fs::copy(&job.input, &target).map(|_| ())
            };
            written.map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        }
        Ok(BackendOutput::discover(job))
    }
}

/// Parse the index out of a `chunk_NNN` file stem
pub fn chunk_index_of(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix("chunk_")?
        .parse()
        .ok()
}

#[async_trait]
impl Backend for MockBackend {
    fn engine(&self) -> Engine {
        self.engine
    }

    async fn translate(&self, job: &BackendJob) -> Result<BackendOutput, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let chunk_index = chunk_index_of(&job.input);
        self.enter(chunk_index);

        if let Some(delay) = chunk_index.and_then(|index| self.delays.get(&index)) {
            tokio::time::sleep(*delay).await;
        }

        let result = match self.behavior_for(chunk_index) {
            MockBehavior::Both => self.write_outputs(job, &ArtifactKind::ALL),
            MockBehavior::MonoOnly => self.write_outputs(job, &[ArtifactKind::Mono]),
            MockBehavior::DualOnly => self.write_outputs(job, &[ArtifactKind::Dual]),
            MockBehavior::Silent => Ok(BackendOutput::default()),
            MockBehavior::Failing => Err(ProviderError::CommandFailed {
                status: Some(1),
                stderr: "Simulated backend failure".to_string(),
            }),
        };

        self.leave();
        result
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        if self.connection_ok {
            Ok(())
        } else {
            Err(ProviderError::ConnectionError("Simulated unreachable backend".to_string()))
        }
    }
}
