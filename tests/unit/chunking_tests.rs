/*!
 * Tests for chunk planning and splitting
 */

use pdftrans::chunking::{ChunkSplitter, plan_ranges};
use pdftrans::errors::PipelineError;

use crate::common;

#[test]
fn test_planRanges_forManyShapes_shouldCoverEveryPageOnce() {
    for total in 1..=64usize {
        for per in 1..=12usize {
            let ranges = plan_ranges(total, per).unwrap();

            assert_eq!(ranges.len(), total.div_ceil(per), "total={} per={}", total, per);
            assert_eq!(ranges[0].0, 0);
            assert_eq!(ranges[ranges.len() - 1].1, total - 1);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].1 + 1, pair[1].0);
            }
            for (start, end) in &ranges[..ranges.len() - 1] {
                assert_eq!(end - start + 1, per);
            }
            let (start, end) = ranges[ranges.len() - 1];
            assert!((1..=per).contains(&(end - start + 1)));
        }
    }
}

#[test]
fn test_planRanges_withZeroPerChunk_shouldBeInvalidInput() {
    assert!(matches!(plan_ranges(10, 0), Err(PipelineError::InvalidInput(_))));
    assert!(matches!(ChunkSplitter::new(0), Err(PipelineError::InvalidInput(_))));
}

#[test]
fn test_split_with45Pages_shouldWriteThreeChunkFiles() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "book.pdf", 45).unwrap();

    let set = ChunkSplitter::new(20).unwrap().split(&input).unwrap();

    assert_eq!(set.total_pages(), 45);
    let sizes: Vec<usize> = set.chunks().iter().map(|c| c.page_count()).collect();
    assert_eq!(sizes, vec![20, 20, 5]);

    let third = &set.chunks()[2];
    assert_eq!(third.index, 3);
    assert_eq!(third.path.file_name().unwrap(), "chunk_003.pdf");
    assert_eq!(common::page_labels(&third.path), common::expected_labels(41..=45));
}

#[test]
fn test_split_withEmptyDocument_shouldYieldNoChunks() {
    let dir = common::create_temp_dir().unwrap();
    let input = dir.path().join("empty.pdf");
    let mut empty = pdftrans::pdf_utils::PdfBuilder::new().finish().unwrap();
    empty.save(&input).unwrap();

    let set = ChunkSplitter::new(20).unwrap().split(&input).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.total_pages(), 0);
}

#[test]
fn test_split_withUnreadableInput_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, b"definitely not a pdf").unwrap();

    let result = ChunkSplitter::new(20).unwrap().split(&input);
    assert!(matches!(result, Err(PipelineError::Split(_))));
}
