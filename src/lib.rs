/*!
 * # pdftrans - chunked PDF translation
 *
 * A Rust library that translates large PDF documents by splitting them into
 * page-range chunks, running each chunk through an external translation
 * backend, and merging the per-chunk outputs back into a translated (mono)
 * and a bilingual (dual) document.
 *
 * ## Features
 *
 * - Page-range chunking with scoped temporary storage
 * - Backends: the `pdf2zh` command-line tool, or pdf2zh driven by
 *   OpenAI, Gemini or Claude models
 * - Partial-failure tolerant pipeline with order-stable merging
 * - Optional bounded concurrency with a fixed dispatch pause for hosted APIs
 * - Stand-alone reassembly of chunk directories from earlier runs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `pdf_utils`: PDF loading, page copying and atomic saving
 * - `chunking`: Splitting documents into chunk files
 * - `providers`: Translation backends:
 *   - `providers::pdf2zh`: pdf2zh command-line runner
 *   - `providers::api`: hosted-model engines
 *   - `providers::openai`, `providers::gemini`, `providers::anthropic`: HTTP clients
 *   - `providers::mock`: scripted backend for tests
 * - `translation`: Per-chunk translation adapter and outcome types
 * - `collector`: Backend output discovery and renaming
 * - `merger`: Concatenation of per-chunk artifacts
 * - `pipeline`: Split, translate, collect and merge orchestration
 * - `reassembly`: Merging chunk directories left on disk
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations and output naming
 * - `language_utils`: Language name to code mapping
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chunking;
pub mod collector;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod merger;
pub mod pdf_utils;
pub mod pipeline;
pub mod providers;
pub mod reassembly;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, Engine};
pub use app_controller::{Controller, TranslateRequest};
pub use errors::{AppError, MergeError, PdfError, PipelineError, ProviderError, ReassemblyError};
pub use language_utils::{get_language_name, resolve_language_code};
pub use pipeline::{Pipeline, PipelineReport, RunStatus};
pub use translation::{ArtifactKind, ChunkTranslator, TranslationOutcome};
