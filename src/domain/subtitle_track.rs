use std::sync::OnceLock;

use regex::Regex;

use super::subtitle_cue::{
    SubtitleCue, SubtitleError, format_srt_timestamp, parse_srt_timestamp,
};

const ARROW: &str = " --> ";

/// Ordered sequence of cues for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self { cues }
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn into_cues(self) -> Vec<SubtitleCue> {
        self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Parses a SubRip document.
    ///
    /// Blocks with fewer than three lines (index, timing, text) are skipped.
    pub fn parse_srt(content: &str) -> Result<Self, SubtitleError> {
        static BLOCK_SEPARATOR: OnceLock<Regex> = OnceLock::new();
        let separator = BLOCK_SEPARATOR
            .get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("block separator pattern is valid"));

        let normalized = content.replace("\r\n", "\n");
        let normalized = normalized.trim_start_matches('\u{feff}').trim();
        if normalized.is_empty() {
            return Ok(Self::default());
        }

        let mut cues = Vec::new();
        for block in separator.split(normalized) {
            let lines: Vec<&str> = block.trim_matches('\n').lines().collect();
            if lines.len() < 3 {
                continue;
            }

            let index = lines[0].trim().parse::<u32>().map_err(|_| {
                SubtitleError::MalformedCue(format!("invalid cue number {:?}", lines[0]))
            })?;

            let (start, end) = lines[1]
                .split_once(ARROW.trim())
                .ok_or_else(|| SubtitleError::MalformedTimestamp(lines[1].to_string()))?;
            let start_ms = parse_srt_timestamp(start)?;
            let end_ms = parse_srt_timestamp(end)?;

            let text = lines[2..].iter().map(|l| l.to_string()).collect();
            cues.push(SubtitleCue::new(index, start_ms, end_ms, text)?);
        }

        Ok(Self { cues })
    }

    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&cue.index.to_string());
            out.push('\n');
            out.push_str(&format_srt_timestamp(cue.start_ms));
            out.push_str(ARROW);
            out.push_str(&format_srt_timestamp(cue.end_ms));
            out.push('\n');
            for line in cue.lines() {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

impl FromIterator<SubtitleCue> for SubtitleTrack {
    fn from_iter<I: IntoIterator<Item = SubtitleCue>>(iter: I) -> Self {
        Self {
            cues: iter.into_iter().collect(),
        }
    }
}
