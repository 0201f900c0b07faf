/*!
 * Merge chunk working directories left on disk by earlier runs.
 *
 * Scans a tree for `chunk_NNN` directories, groups their PDFs by project
 * (the name of the directory holding the chunk directories) and kind, and
 * merges each group into `{project}_{kind}_merged.pdf`.
 */

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::ReassemblyError;
use crate::merger;
use crate::translation::ArtifactKind;

// @const: Chunk working directory name
static CHUNK_DIR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^chunk_(\d+)$").unwrap());

/// Which kinds of artifact to merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KindFilter {
    /// Mono artifacts only
    Translated,
    /// Dual artifacts only
    Bilingual,
    #[default]
    Both,
}

impl KindFilter {
    pub fn accepts(&self, kind: ArtifactKind) -> bool {
        match self {
            Self::Translated => kind == ArtifactKind::Mono,
            Self::Bilingual => kind == ArtifactKind::Dual,
            Self::Both => true,
        }
    }
}

/// PDFs of one kind from the chunk directories of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGroup {
    pub project: String,
    pub kind: ArtifactKind,
    /// `(chunk index, path)`, sorted by index
    pub files: Vec<(usize, PathBuf)>,
}

impl ChunkGroup {
    /// `{project}_{kind}_merged.pdf`
    pub fn output_file_name(&self) -> String {
        format!("{}_{}_merged.pdf", self.project, self.kind.suffix())
    }
}

/// Options for [`merge_chunk_groups`]
#[derive(Debug, Clone, Default)]
pub struct ReassemblyOptions {
    /// Where merged files go; defaults to the scanned directory
    pub output_dir: Option<PathBuf>,
    /// Keep the chunk PDFs after a successful merge
    pub keep_originals: bool,
    /// Only merge this project
    pub project: Option<String>,
    pub kind: KindFilter,
}

/// Result of a reassembly run
#[derive(Debug, Clone, Default)]
pub struct ReassemblySummary {
    /// Groups that passed the filters
    pub processed: usize,
    /// Merged files written
    pub outputs: Vec<PathBuf>,
    /// `(output file name, reason)` for each failed group
    pub failures: Vec<(String, String)>,
}

impl ReassemblySummary {
    pub fn succeeded(&self) -> usize {
        self.outputs.len()
    }

    /// True when every processed group merged
    pub fn is_success(&self) -> bool {
        self.processed > 0 && self.failures.is_empty()
    }
}

/// Classify an artifact by its file name
fn artifact_kind(file_name: &str) -> Option<ArtifactKind> {
    let stem = file_name.strip_suffix(".pdf")?;
    ArtifactKind::ALL.into_iter().find(|kind| {
        stem.ends_with(&format!("_{}", kind.suffix())) || stem.ends_with(&format!("-{}", kind.native_suffix()))
    })
}

/// Find and group the chunk PDFs under `dir`
pub fn find_chunk_groups(dir: &Path) -> Vec<ChunkGroup> {
    let mut groups: BTreeMap<(String, usize), Vec<(usize, PathBuf)>> = BTreeMap::new();

    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(chunk_dir) = path.parent() else { continue };
        let Some(index) = chunk_dir
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| CHUNK_DIR_REGEX.captures(name))
            .and_then(|caps| caps[1].parse::<usize>().ok())
        else {
            continue;
        };

        let file_name = entry.file_name().to_string_lossy();
        let Some(kind) = artifact_kind(&file_name) else {
            debug!("Ignoring {:?}: not a translation artifact", path);
            continue;
        };

        let project = chunk_dir
            .parent()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let kind_order = if kind == ArtifactKind::Mono { 0 } else { 1 };
        groups
            .entry((project, kind_order))
            .or_default()
            .push((index, path.to_path_buf()));
    }

    groups
        .into_iter()
        .map(|((project, kind_order), mut files)| {
            files.sort_by_key(|(index, _)| *index);
            ChunkGroup {
                project,
                kind: ArtifactKind::ALL[kind_order],
                files,
            }
        })
        .collect()
}

/// Merge every chunk group under `dir` that passes the filters
///
/// Fails when `dir` is missing or nothing matches; per-group merge failures
/// are reported in the summary.
pub fn merge_chunk_groups(dir: &Path, options: &ReassemblyOptions) -> Result<ReassemblySummary, ReassemblyError> {
    if !dir.is_dir() {
        return Err(ReassemblyError::NotADirectory(dir.to_path_buf()));
    }

    let groups = find_chunk_groups(dir);
    if groups.is_empty() {
        return Err(ReassemblyError::NoChunkGroups(dir.to_path_buf()));
    }

    let output_dir = options.output_dir.clone().unwrap_or_else(|| dir.to_path_buf());
    let mut summary = ReassemblySummary::default();

    for group in groups {
        if options.project.as_ref().is_some_and(|project| *project != group.project) {
            continue;
        }
        if !options.kind.accepts(group.kind) {
            continue;
        }

        summary.processed += 1;
        let output = output_dir.join(group.output_file_name());
        info!(
            "Merging {} {} file(s) of '{}' into {:?}",
            group.files.len(),
            group.kind.suffix(),
            group.project,
            output
        );

        match merger::merge(&group.files, &output) {
            Ok(result) => {
                if !options.keep_originals {
                    for (index, path) in group.files.iter().filter(|(i, _)| result.merged.contains(i)) {
                        match fs::remove_file(path) {
                            Ok(()) => debug!("Deleted chunk {} file {:?}", index, path),
                            Err(e) => warn!("Could not delete {:?}: {}", path, e),
                        }
                    }
                }
                summary.outputs.push(result.output);
            }
            Err(e) => {
                warn!("Failed to merge {}: {}", group.output_file_name(), e);
                summary.failures.push((group.output_file_name(), e.to_string()));
            }
        }
    }

    if summary.processed == 0 {
        return Err(ReassemblyError::NoMatchingGroups);
    }

    Ok(summary)
}
