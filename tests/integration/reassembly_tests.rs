/*!
 * Integration tests for merging chunk directories from earlier runs
 */

use std::fs;
use std::path::{Path, PathBuf};

use pdftrans::errors::ReassemblyError;
use pdftrans::reassembly::{KindFilter, ReassemblyOptions, find_chunk_groups, merge_chunk_groups};
use pdftrans::translation::ArtifactKind;

use crate::common;

/// Write a one-page PDF labelled `{label} 1` into `{root}/{project}/{chunk_dir}/{file_name}`
fn write_chunk_file(root: &Path, project: &str, chunk_dir: &str, file_name: &str, label: &str) -> PathBuf {
    let dir = root.join(project).join(chunk_dir);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file_name);
    common::build_test_document(1, label).save(&path).unwrap();
    path
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| format!("{} 1", name)).collect()
}

#[test]
fn test_mergeChunkGroups_shouldMergeEachProjectAndKind() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    let a10 = write_chunk_file(root, "alpha", "chunk_10", "chunk_10_french_translated.pdf", "a10");
    write_chunk_file(root, "alpha", "chunk_2", "chunk_2_french_translated.pdf", "a2");
    write_chunk_file(root, "alpha", "chunk_2", "chunk_2_french_bilingual.pdf", "a2d");
    write_chunk_file(root, "beta", "chunk_001", "chunk_001-mono.pdf", "b1");
    write_chunk_file(root, "beta", "chunk_002", "chunk_002-mono.pdf", "b2");

    let summary = merge_chunk_groups(root, &ReassemblyOptions::default()).unwrap();

    assert_eq!(summary.processed, 3);
    assert!(summary.is_success());
    // Numeric, not lexical, chunk order
    assert_eq!(
        common::page_labels(&root.join("alpha_translated_merged.pdf")),
        labels(&["a2", "a10"])
    );
    assert_eq!(
        common::page_labels(&root.join("alpha_bilingual_merged.pdf")),
        labels(&["a2d"])
    );
    assert_eq!(
        common::page_labels(&root.join("beta_translated_merged.pdf")),
        labels(&["b1", "b2"])
    );
    assert!(!a10.exists());
}

#[test]
fn test_mergeChunkGroups_withFilters_shouldOnlyTouchMatchingGroups() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    let out = root.join("merged");
    let kept = write_chunk_file(root, "alpha", "chunk_001", "chunk_001_de_bilingual.pdf", "a1");
    write_chunk_file(root, "alpha", "chunk_001", "chunk_001_de_translated.pdf", "a1m");
    write_chunk_file(root, "beta", "chunk_001", "chunk_001_de_bilingual.pdf", "b1");

    let options = ReassemblyOptions {
        output_dir: Some(out.clone()),
        keep_originals: true,
        project: Some("alpha".to_string()),
        kind: KindFilter::Bilingual,
    };
    let summary = merge_chunk_groups(root, &options).unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.outputs, vec![out.join("alpha_bilingual_merged.pdf")]);
    assert!(kept.is_file());
    assert!(!out.join("alpha_translated_merged.pdf").exists());
    assert!(!out.join("beta_bilingual_merged.pdf").exists());
}

#[test]
fn test_mergeChunkGroups_withUnknownProject_shouldReportNoMatch() {
    let dir = common::create_temp_dir().unwrap();
    write_chunk_file(dir.path(), "alpha", "chunk_001", "chunk_001-dual.pdf", "a1");

    let options = ReassemblyOptions {
        project: Some("gamma".to_string()),
        ..ReassemblyOptions::default()
    };
    let result = merge_chunk_groups(dir.path(), &options);
    assert!(matches!(result, Err(ReassemblyError::NoMatchingGroups)));
}

#[test]
fn test_mergeChunkGroups_withMissingDirectory_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let result = merge_chunk_groups(&dir.path().join("absent"), &ReassemblyOptions::default());
    assert!(matches!(result, Err(ReassemblyError::NotADirectory(_))));
}

#[test]
fn test_mergeChunkGroups_withUnreadableGroup_shouldRecordFailure() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    write_chunk_file(root, "alpha", "chunk_001", "chunk_001_ja_translated.pdf", "a1");
    let broken_dir = root.join("beta").join("chunk_001");
    fs::create_dir_all(&broken_dir).unwrap();
    let broken = broken_dir.join("chunk_001_ja_translated.pdf");
    fs::write(&broken, b"not a pdf").unwrap();

    let summary = merge_chunk_groups(root, &ReassemblyOptions::default()).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.succeeded(), 1);
    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, "beta_translated_merged.pdf");
    assert!(broken.exists());
}

#[test]
fn test_findChunkGroups_shouldIgnoreUnrelatedFiles() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    write_chunk_file(root, "alpha", "chunk_001", "chunk_001_ja_translated.pdf", "a1");
    // Source chunk and files outside chunk directories
    write_chunk_file(root, "alpha", "chunk_001", "chunk_001.pdf", "src");
    write_chunk_file(root, "alpha", "drafts", "draft_translated.pdf", "draft");
    fs::write(root.join("alpha").join("chunk_001").join("notes.txt"), "x").unwrap();

    let groups = find_chunk_groups(root);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].project, "alpha");
    assert_eq!(groups[0].kind, ArtifactKind::Mono);
    assert_eq!(groups[0].files.len(), 1);
    assert_eq!(groups[0].files[0].0, 1);
}
