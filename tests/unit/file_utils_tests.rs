/*!
 * Tests for file system utilities
 */

use std::fs;
use anyhow::Result;
use subresync::file_utils::FileManager;
use crate::common;

/// Test SRT detection is case-insensitive
#[test]
fn test_isSrtFile_shouldMatchExtensionOnly() {
    assert!(FileManager::is_srt_file("movie.srt"));
    assert!(FileManager::is_srt_file("MOVIE.SRT"));
    assert!(!FileManager::is_srt_file("movie.srt.txt"));
    assert!(!FileManager::is_srt_file("movie"));
}

/// Test stored copies are prefixed with the job id
#[test]
fn test_storeWithPrefix_shouldCopyUnderSanitizedName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "my movie.srt", "content")?;
    let target_dir = temp_dir.path().join("uploads");

    let stored = FileManager::store_with_prefix(&source, &target_dir, "abcd1234")?;

    assert_eq!(stored, target_dir.join("abcd1234_my_movie.srt"));
    assert_eq!(fs::read_to_string(&stored)?, "content");
    Ok(())
}

/// Test recursive SRT discovery returns sorted paths
#[test]
fn test_findSrtFiles_shouldFindNestedFilesSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    fs::create_dir_all(&nested)?;
    common::create_test_file(temp_dir.path(), "b.srt", "x")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "x")?;
    common::create_test_file(&nested, "a.srt", "x")?;

    let files = FileManager::find_srt_files(temp_dir.path())?;

    assert_eq!(files.len(), 2);
    assert!(files.windows(2).all(|w| w[0] <= w[1]));
    assert!(files.iter().all(|f| FileManager::is_srt_file(f)));
    Ok(())
}

/// Test directory cleanup removes files only
#[test]
fn test_cleanDir_shouldRemoveFilesAndKeepSubdirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "one.srt", "x")?;
    common::create_test_file(temp_dir.path(), "two.srt", "x")?;
    fs::create_dir_all(temp_dir.path().join("keep"))?;

    assert_eq!(FileManager::clean_dir(temp_dir.path())?, 2);
    assert!(temp_dir.path().join("keep").is_dir());
    assert_eq!(FileManager::clean_dir(temp_dir.path().join("missing"))?, 0);
    Ok(())
}
