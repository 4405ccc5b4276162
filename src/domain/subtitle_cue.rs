use std::sync::OnceLock;

use regex::Regex;

pub const MAX_CUE_LINES: usize = 2;

/// One timed subtitle entry.
///
/// `start_ms < end_ms` and `1..=2` lines hold for every constructed cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    lines: Vec<String>,
}

impl SubtitleCue {
    pub fn new(
        index: u32,
        start_ms: u64,
        end_ms: u64,
        lines: Vec<String>,
    ) -> Result<Self, SubtitleError> {
        if start_ms >= end_ms {
            return Err(SubtitleError::InvalidTiming { start_ms, end_ms });
        }
        let lines = fold_lines(lines);
        if lines.is_empty() {
            return Err(SubtitleError::MalformedCue(format!(
                "cue {} has no text",
                index
            )));
        }
        Ok(Self {
            index,
            start_ms,
            end_ms,
            lines,
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with single spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.split_whitespace().count()).sum()
    }

    pub fn shifted(&self, offset_ms: u64) -> Self {
        Self {
            index: self.index,
            start_ms: self.start_ms.saturating_add(offset_ms),
            end_ms: self.end_ms.saturating_add(offset_ms),
            lines: self.lines.clone(),
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Moves the start forward; `None` when nothing of the cue would remain.
    pub fn starting_at(mut self, start_ms: u64) -> Option<Self> {
        if start_ms >= self.end_ms {
            return None;
        }
        self.start_ms = self.start_ms.max(start_ms);
        Some(self)
    }
}

/// Keeps at most two lines: anything past the second is appended to it.
fn fold_lines(lines: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(MAX_CUE_LINES);
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if kept.len() < MAX_CUE_LINES {
            kept.push(line.to_string());
        } else if let Some(last) = kept.last_mut() {
            last.push(' ');
            last.push_str(line);
        }
    }
    kept
}

/// Parses `HH:MM:SS,mmm` into milliseconds.
pub fn parse_srt_timestamp(raw: &str) -> Result<u64, SubtitleError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2,}):([0-5]\d):([0-5]\d),(\d{3})$").expect("srt timestamp pattern is valid")
    });

    let raw = raw.trim();
    let caps = pattern
        .captures(raw)
        .ok_or_else(|| SubtitleError::MalformedTimestamp(raw.to_string()))?;

    let field = |i: usize| -> Result<u64, SubtitleError> {
        caps[i]
            .parse::<u64>()
            .map_err(|_| SubtitleError::MalformedTimestamp(raw.to_string()))
    };

    let (h, m, s, ms) = (field(1)?, field(2)?, field(3)?, field(4)?);
    Ok((h * 3600 + m * 60 + s) * 1000 + ms)
}

/// Formats milliseconds as `HH:MM:SS,mmm`.
pub fn format_srt_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Formats milliseconds as `H:MM:SS.cc`, dropping the last millisecond digit.
pub fn format_ass_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let centis = (ms % 1000) / 10;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubtitleError {
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
    #[error("malformed cue: {0}")]
    MalformedCue(String),
    #[error("cue must end after it starts: {start_ms}ms --> {end_ms}ms")]
    InvalidTiming { start_ms: u64, end_ms: u64 },
}
