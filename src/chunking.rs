/*!
 * Page-range chunking of input documents.
 *
 * A document is cut greedily from page 0 into ranges of `pages_per_chunk`
 * pages (the last range takes the remainder). Every range is written as a
 * standalone PDF inside a temporary directory owned by the returned
 * [`ChunkSet`]; dropping the set removes the files.
 */

use log::debug;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::errors::PipelineError;
use crate::file_utils::chunk_base_name;
use crate::pdf_utils::{self, PdfBuilder};

/// A contiguous page range of the input, materialized as its own file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position of the chunk; the only authoritative ordering key
    pub index: usize,
    /// First page, 0-based inclusive
    pub start: usize,
    /// Last page, 0-based inclusive
    pub end: usize,
    /// Standalone PDF holding exactly this range
    pub path: PathBuf,
}

impl Chunk {
    /// Number of pages in the chunk
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// `chunk_NNN`, used for the chunk file and its working directory
    pub fn base_name(&self) -> String {
        chunk_base_name(self.index)
    }
}

/// Ordered chunks covering a whole document, plus the directory that holds them
#[derive(Debug)]
pub struct ChunkSet {
    chunks: Vec<Chunk>,
    total_pages: usize,
    // Removes every chunk file on drop
    workspace: TempDir,
}

impl ChunkSet {
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Directory holding the chunk files
    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }
}

/// Compute the `[start, end]` page ranges for a document
///
/// Returns an empty list for an empty document. `pages_per_chunk` must be
/// positive.
pub fn plan_ranges(total_pages: usize, pages_per_chunk: usize) -> Result<Vec<(usize, usize)>, PipelineError> {
    if pages_per_chunk == 0 {
        return Err(PipelineError::InvalidInput(
            "pages per chunk must be a positive integer".to_string(),
        ));
    }

    let num_chunks = total_pages.div_ceil(pages_per_chunk);
    let ranges = (0..num_chunks)
        .map(|i| {
            let start = i * pages_per_chunk;
            let end = (start + pages_per_chunk).min(total_pages) - 1;
            (start, end)
        })
        .collect();

    Ok(ranges)
}

/// Splits input PDFs into chunk files
#[derive(Debug, Clone)]
pub struct ChunkSplitter {
    pages_per_chunk: usize,
}

impl ChunkSplitter {
    pub fn new(pages_per_chunk: usize) -> Result<Self, PipelineError> {
        if pages_per_chunk == 0 {
            return Err(PipelineError::InvalidInput(
                "pages per chunk must be a positive integer".to_string(),
            ));
        }
        Ok(Self { pages_per_chunk })
    }

    pub fn pages_per_chunk(&self) -> usize {
        self.pages_per_chunk
    }

    /// Split the document at `input` into a fresh temporary directory
    pub fn split(&self, input: &Path) -> Result<ChunkSet, PipelineError> {
        let workspace = tempfile::Builder::new()
            .prefix("pdftrans-chunks-")
            .tempdir()?;
        self.split_into(input, workspace)
    }

    /// Split the document at `input` into the given temporary directory
    pub fn split_into(&self, input: &Path, workspace: TempDir) -> Result<ChunkSet, PipelineError> {
        let source = pdf_utils::load_document(input)?;
        let page_ids = pdf_utils::ordered_page_ids(&source);
        let total_pages = page_ids.len();
        let ranges = plan_ranges(total_pages, self.pages_per_chunk)?;

        debug!(
            "Splitting {} pages of {:?} into {} chunk(s) of up to {} pages",
            total_pages,
            input,
            ranges.len(),
            self.pages_per_chunk
        );

        let mut chunks = Vec::with_capacity(ranges.len());
        for (i, (start, end)) in ranges.into_iter().enumerate() {
            let index = i + 1;
            let path = workspace.path().join(format!("{}.pdf", chunk_base_name(index)));

            let mut builder = PdfBuilder::new();
            builder.append_pages(&source, &page_ids[start..=end])?;
            let mut doc = builder.finish()?;
            pdf_utils::save_atomically(&mut doc, &path)?;

            debug!("Wrote chunk {} (pages {}-{}) to {:?}", index, start + 1, end + 1, path);
            chunks.push(Chunk { index, start, end, path });
        }

        Ok(ChunkSet {
            chunks,
            total_pages,
            workspace,
        })
    }
}
