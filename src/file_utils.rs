use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;

// @module: File and directory utilities

// @const: Characters not allowed in stored file names
static UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]+").unwrap()
});

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

    // @checks: SRT extension, case-insensitive
    pub fn is_srt_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
    }

    // @generates: Output file name `<stem>_<TARGET>.srt`
    pub fn output_filename<P: AsRef<Path>>(input_file: P, target_language: &str) -> String {
        let stem = input_file
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitles".to_string());
        format!("{}_{}.srt", stem, target_language.trim().to_uppercase())
    }

    /// Reduce a file name to a safe subset of characters
    pub fn sanitize_filename(name: &str) -> String {
        let base = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&base, "_");
        let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
        if cleaned.is_empty() {
            "upload.srt".to_string()
        } else {
            cleaned.to_string()
        }
    }

    /// Copy a submitted file into `dir` as `<prefix>_<sanitized name>`
    pub fn store_with_prefix<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, dir: P2, prefix: &str) -> Result<PathBuf> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(anyhow!("Source file does not exist: {:?}", source));
        }

        Self::ensure_dir(&dir)?;
        let name = Self::sanitize_filename(&source.to_string_lossy());
        let target = dir.as_ref().join(format!("{}_{}", prefix, name));
        fs::copy(source, &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", source, target))?;
        Ok(target)
    }

    /// Find SRT files in a directory, sorted by path
    pub fn find_srt_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::is_srt_file(path) {
                result.push(path.to_path_buf());
            }
        }
        result.sort();
        Ok(result)
    }

    /// Delete the regular files directly inside `dir`. Returns how many were removed.
    pub fn clean_dir<P: AsRef<Path>>(dir: P) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to list directory: {:?}", dir))? {
            let path = entry?.path();
            if path.is_file() {
                match fs::remove_file(&path) {
                    Ok(()) => count += 1,
                    Err(e) => debug!("Could not remove {:?}: {}", path, e),
                }
            }
        }
        Ok(count)
    }
}
