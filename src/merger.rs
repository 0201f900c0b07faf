/*!
 * Concatenation of per-chunk artifacts.
 *
 * Artifacts are appended in exactly the order given; callers pass them in
 * chunk-index order. Missing or unreadable inputs are skipped with a warning.
 * The output is staged beside its destination and renamed into place.
 */

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::errors::MergeError;
use crate::pdf_utils::{self, PdfBuilder};

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Where the merged document was written
    pub output: PathBuf,
    /// Chunk indices whose pages were appended, in order
    pub merged: Vec<usize>,
    /// Chunk indices that were missing or unreadable
    pub skipped: Vec<usize>,
    /// Pages in the merged document
    pub page_count: usize,
}

/// Merge `(chunk_index, path)` artifacts, in the given order, into `output`
pub fn merge(artifacts: &[(usize, PathBuf)], output: &Path) -> Result<MergeResult, MergeError> {
    if artifacts.is_empty() {
        return Err(MergeError::EmptyInput);
    }

    let mut builder = PdfBuilder::new();
    let mut merged = Vec::with_capacity(artifacts.len());
    let mut skipped = Vec::new();

    for (index, path) in artifacts {
        if !path.is_file() {
            warn!("Chunk {} artifact not found, skipping: {:?}", index, path);
            skipped.push(*index);
            continue;
        }

        let appended = pdf_utils::load_document(path).and_then(|doc| builder.append_document(&doc));
        match appended {
            Ok(pages) => {
                debug!("Appended {} page(s) from chunk {} ({:?})", pages, index, path);
                merged.push(*index);
            }
            Err(e) => {
                warn!("Chunk {} artifact unreadable, skipping: {}", index, e);
                skipped.push(*index);
            }
        }
    }

    if merged.is_empty() {
        return Err(MergeError::NothingMerged(artifacts.len()));
    }

    let page_count = builder.page_count();
    let mut doc = builder.finish()?;
    pdf_utils::save_atomically(&mut doc, output)?;

    info!(
        "Merged {} artifact(s) ({} pages) into {:?}",
        merged.len(),
        page_count,
        output
    );

    Ok(MergeResult {
        output: output.to_path_buf(),
        merged,
        skipped,
        page_count,
    })
}
