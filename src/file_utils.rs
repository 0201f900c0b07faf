use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::translation::ArtifactKind;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @returns: File size in bytes
    pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64> {
        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path.as_ref()))?;
        Ok(metadata.len())
    }

    // @returns: File name without extension, "document" when there is none
    pub fn base_name<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Compare two paths, resolving them when both exist
    pub fn same_location<P1: AsRef<Path>, P2: AsRef<Path>>(a: P1, b: P2) -> bool {
        let (a, b) = (a.as_ref(), b.as_ref());
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}

/// Width-padded directory/file stem for a 1-based chunk index
///
/// Three digits keep lexical and numeric order aligned for up to 999 chunks;
/// larger indexes simply grow wider.
pub fn chunk_base_name(index: usize) -> String {
    format!("chunk_{:03}", index)
}

/// Canonical name of a translated artifact
pub fn artifact_file_name(base_name: &str, target_language: &str, kind: ArtifactKind) -> String {
    format!("{}_{}_{}.pdf", base_name, target_language, kind.suffix())
}

/// Name the external tool gives its output before renaming
pub fn native_artifact_file_name(base_name: &str, kind: ArtifactKind) -> String {
    format!("{}-{}.pdf", base_name, kind.native_suffix())
}

/// Deterministic on-disk layout for one input document
///
/// `{output_root}/{target_language}/{input_base}/` holds the merged artifacts,
/// and one `chunk_NNN/` working directory per chunk.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    input_base: String,
    target_language: String,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>, I: AsRef<Path>>(output_root: P, target_language: &str, input: I) -> Self {
        let input_base = FileManager::base_name(input);
        let root = output_root.as_ref().join(target_language).join(&input_base);
        Self {
            root,
            input_base,
            target_language: target_language.to_string(),
        }
    }

    /// Directory holding everything produced for this document
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_base(&self) -> &str {
        &self.input_base
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Working directory handed to the backend for one chunk
    pub fn chunk_dir(&self, index: usize) -> PathBuf {
        self.root.join(chunk_base_name(index))
    }

    /// Canonical location of a merged artifact
    pub fn final_artifact(&self, kind: ArtifactKind) -> PathBuf {
        self.root
            .join(artifact_file_name(&self.input_base, &self.target_language, kind))
    }
}
