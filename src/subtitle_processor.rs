use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};
use serde::{Serialize, Deserialize};

use crate::errors::CaptionError;
use crate::resync::format_text_with_lines;

// @module: SRT caption parsing, cue model and serialization

// @const: SRT timestamp line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})").unwrap()
});

// @const: Blank-line block separator
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n").unwrap()
});

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Point in time of a cue, kept with millisecond precision and written back unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timecode(u64);

impl Timecode {
    pub fn from_millis(ms: u64) -> Self {
        Timecode(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm). A dot is accepted as the millisecond separator.
    pub fn parse(timestamp: &str) -> Result<Self, CaptionError> {
        let invalid = || CaptionError::InvalidTimestamp(timestamp.to_string());
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(invalid());
        }

        Ok(Timecode(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis))
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ms = self.0;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

// @struct: Caption record as it appears in the file
#[derive(Debug, Clone, PartialEq)]
pub struct RawCue {
    // @field: Index line, untouched
    pub index: String,

    // @field: Start time
    pub start: Timecode,

    // @field: End time
    pub end: Timecode,

    // @field: Text with its original line breaks
    pub text: String,
}

/// One timed caption record.
///
/// The text is held on a single line; the number of lines it had in the source
/// file is kept in `line_count` so the layout can be restored on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    index: usize,
    start: Timecode,
    end: Timecode,
    text: String,
    line_count: usize,
}

impl Cue {
    /// Build a cue from raw fields. `position` is the 1-based position of the
    /// record in its file and is used when the index line is not a positive number.
    pub fn from_raw(raw: &RawCue, position: usize) -> Self {
        let original_text = raw.text.trim();
        let line_count = original_text.matches('\n').count() + 1;
        let text = original_text
            .replace("\r\n", " ")
            .replace('\n', " ")
            .trim()
            .to_string();

        Cue {
            index: Self::normalize_index(&raw.index).unwrap_or(position),
            start: raw.start,
            end: raw.end,
            text,
            line_count,
        }
    }

    /// Convenience constructor for cues built in code
    pub fn new(index: usize, start: Timecode, end: Timecode, text: &str) -> Self {
        let raw = RawCue {
            index: index.to_string(),
            start,
            end,
            text: text.to_string(),
        };
        Self::from_raw(&raw, index)
    }

    fn normalize_index(raw_index: &str) -> Option<usize> {
        let cleaned = raw_index.trim().trim_start_matches(BYTE_ORDER_MARK).trim();
        match cleaned.parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(index) => Some(index),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> Timecode {
        self.start
    }

    pub fn end(&self) -> Timecode {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Number of characters in the single-line text
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cue({}: '{}' [{} chars, {} lines])", self.index, self.text, self.char_count(), self.line_count)
    }
}

/// SRT reading and writing
pub struct SubtitleCollection;

impl SubtitleCollection {
    /// Read and parse an SRT file into raw records
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawCue>, CaptionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CaptionError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_srt_string(&content)
    }

    /// Parse SRT content into raw records, in file order.
    ///
    /// A leading byte-order mark and CRLF line endings are tolerated. Blocks without
    /// a timestamp line are skipped with a warning.
    pub fn parse_srt_string(content: &str) -> Result<Vec<RawCue>, CaptionError> {
        let normalized = content
            .trim_start_matches(BYTE_ORDER_MARK)
            .replace("\r\n", "\n")
            .replace('\r', "\n");

        let mut records = Vec::new();

        for (block_number, block) in BLOCK_SEPARATOR.split(normalized.trim()).enumerate() {
            let lines: Vec<&str> = block.lines().collect();
            let Some(ts_pos) = lines.iter().position(|line| TIMESTAMP_REGEX.is_match(line)) else {
                if !block.trim().is_empty() {
                    warn!("Skipping block {} without timestamp line", block_number + 1);
                }
                continue;
            };

            let (start, end) = match Self::parse_timestamp_line(lines[ts_pos]) {
                Ok(times) => times,
                Err(e) => {
                    warn!("Skipping block {}: {}", block_number + 1, e);
                    continue;
                }
            };

            let index = if ts_pos > 0 { lines[ts_pos - 1].to_string() } else { String::new() };
            let text = lines[ts_pos + 1..].join("\n");

            records.push(RawCue { index, start, end, text });
        }

        if records.is_empty() {
            return Err(CaptionError::NoCues);
        }

        debug!("Parsed {} caption records", records.len());
        Ok(records)
    }

    fn parse_timestamp_line(line: &str) -> Result<(Timecode, Timecode), CaptionError> {
        let caps = TIMESTAMP_REGEX
            .captures(line)
            .ok_or_else(|| CaptionError::InvalidTimestamp(line.to_string()))?;
        let start = Timecode::parse(&format!("{}:{}:{},{}", &caps[1], &caps[2], &caps[3], &caps[4]))?;
        let end = Timecode::parse(&format!("{}:{}:{},{}", &caps[5], &caps[6], &caps[7], &caps[8]))?;
        Ok((start, end))
    }

    /// Parse a file straight into cues
    pub fn read_cues<P: AsRef<Path>>(path: P) -> Result<Vec<Cue>, CaptionError> {
        let records = Self::parse_srt_file(path)?;
        Ok(Self::to_cues(&records))
    }

    /// Turn raw records into cues, normalizing indices
    pub fn to_cues(records: &[RawCue]) -> Vec<Cue> {
        records
            .iter()
            .enumerate()
            .map(|(i, raw)| Cue::from_raw(raw, i + 1))
            .collect()
    }

    /// Render cues with their final texts as SRT content.
    ///
    /// Each text is re-wrapped to the line count of its cue.
    pub fn render_srt(cues: &[Cue], texts: &[String]) -> String {
        let mut output = String::new();
        for (cue, text) in cues.iter().zip(texts) {
            let formatted = format_text_with_lines(text, cue.line_count());
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                cue.index(),
                cue.start(),
                cue.end(),
                formatted
            ));
        }
        output
    }

    /// Write cues with their final texts to an SRT file, one record per cue
    pub fn write_srt<P: AsRef<Path>>(path: P, cues: &[Cue], texts: &[String]) -> Result<()> {
        let path = path.as_ref();
        if cues.len() != texts.len() {
            warn!("Writing {} cues with {} texts, extra entries are dropped", cues.len(), texts.len());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, Self::render_srt(cues, texts))
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}
