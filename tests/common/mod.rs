/*!
 * Common test utilities for the subresync test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use tempfile::TempDir;

use subresync::app_config::{Config, TranslationProvider};
use subresync::jobs::JobManager;
use subresync::providers::Translator;
use subresync::subtitle_processor::{Cue, Timecode};

/// Captions whose sentences run over several cues, two of them on two lines
pub const FRAGMENTED_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
This is the beginning of

2
00:00:03,000 --> 00:00:05,000
a sentence that was split.

3
00:00:05,500 --> 00:00:07,000
Here comes another one!

4
00:00:07,500 --> 00:00:09,000
And this sentence
spans

5
00:00:09,000 --> 00:00:10,500
across multiple

6
00:00:10,500 --> 00:00:12,000
subtitle blocks.

7
00:00:12,500 --> 00:00:15,000
Final sentence here,
with a second line.
";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes the fragmented sample captions
pub fn create_fragmented_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, FRAGMENTED_SRT)
}

/// Builds in-memory cues with two-second timings
pub fn cues(texts: &[&str]) -> Vec<Cue> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let index = i + 1;
            Cue::new(
                index,
                Timecode::from_millis(index as u64 * 2_000),
                Timecode::from_millis(index as u64 * 2_000 + 1_900),
                text,
            )
        })
        .collect()
}

/// Configuration using the mock provider with job directories under `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "TR".to_string();
    config.translation.provider = TranslationProvider::Mock;
    config.translation.timeout_secs = 2;
    config.jobs.upload_dir = root.join("uploads");
    config.jobs.output_dir = root.join("outputs");
    config.jobs.poll_interval_ms = 10;
    config
}

/// Job manager around `translator` with job directories under `root`
pub fn job_manager(root: &Path, translator: Arc<dyn Translator>) -> JobManager {
    JobManager::from_config(&test_config(root), translator)
}

/// Route library logs to the test output, once per process
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
