/*!
 * Error types for the pdftrans application.
 *
 * This module contains custom error types for the different stages of the
 * chunked translation pipeline, using the thiserror crate for ergonomic
 * error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when invoking a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The external command could not be started
    #[error("Failed to launch '{command}': {message}")]
    SpawnFailed {
        /// Command that was launched
        command: String,
        /// Underlying OS error
        message: String,
    },

    /// The external command ran but exited unsuccessfully
    #[error("Command exited with status {status:?}: {stderr}")]
    CommandFailed {
        /// Exit code, if the process was not killed by a signal
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
}

/// Errors raised while reading or writing PDF files
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be opened or parsed
    #[error("Failed to load PDF {path:?}: {message}")]
    Load { path: PathBuf, message: String },

    /// The document could not be written
    #[error("Failed to write PDF {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    /// The document structure is not usable (missing catalog, page tree...)
    #[error("Malformed PDF structure: {0}")]
    Malformed(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(error: lopdf::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Errors that can occur while merging chunk artifacts
#[derive(Error, Debug)]
pub enum MergeError {
    /// Nothing to merge
    #[error("No artifacts to merge")]
    EmptyInput,

    /// Every listed artifact was missing or unreadable
    #[error("None of the {0} listed artifacts could be merged")]
    NothingMerged(usize),

    /// The merged document could not be written
    #[error("Failed to write merged document: {0}")]
    Io(String),
}

impl From<std::io::Error> for MergeError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<PdfError> for MergeError {
    fn from(error: PdfError) -> Self {
        Self::Io(error.to_string())
    }
}

/// Fatal errors of a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing input file or invalid chunk size
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The input document has no pages
    #[error("Document has no pages")]
    EmptyDocument,

    /// The selected backend is not configured or not reachable
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The input document could not be split into chunks
    #[error("Failed to split document: {0}")]
    Split(#[from] PdfError),

    /// No chunk produced any usable artifact
    #[error("No output produced from {chunks} chunk(s)")]
    NoOutputProduced {
        /// Number of chunks that were processed
        chunks: usize,
    },

    /// Filesystem error while preparing directories or placing outputs
    #[error("File error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from PDF handling
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Error from a merge
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error from a chunk directory reassembly
    #[error("Reassembly error: {0}")]
    Reassembly(#[from] ReassemblyError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Errors of a stand-alone chunk directory reassembly
#[derive(Error, Debug)]
pub enum ReassemblyError {
    /// The directory to scan does not exist
    #[error("Directory not found: {0:?}")]
    NotADirectory(PathBuf),

    /// No `chunk_NNN` directory with PDFs was found
    #[error("No chunk files found under {0:?}")]
    NoChunkGroups(PathBuf),

    /// Groups exist but the filters excluded all of them
    #[error("No chunk group matches the given filters")]
    NoMatchingGroups,
}
