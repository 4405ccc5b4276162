use std::fmt::Write as _;

use crate::domain::subtitle_cue::format_ass_timestamp;
use crate::domain::{StyleConfig, SubtitleCue, SubtitleError, SubtitleTrack, to_ass_color};

/// Cues with more words than this are wrapped onto two lines.
pub const DEFAULT_MAX_SINGLE_LINE_WORDS: usize = 4;

const LINE_BREAK: &str = "\\N";
const STYLE_NAME: &str = "Default";
const OPAQUE_BLACK: &str = "&H00000000";

/// Compiles a plain subtitle track into an Advanced SubStation Alpha script.
///
/// Output depends only on the track and the style, so compiling the same
/// input twice yields identical bytes.
#[derive(Debug, Clone, Copy)]
pub struct StyleCompiler {
    max_single_line_words: usize,
}

impl Default for StyleCompiler {
    fn default() -> Self {
        Self {
            max_single_line_words: DEFAULT_MAX_SINGLE_LINE_WORDS,
        }
    }
}

impl StyleCompiler {
    pub fn new(max_single_line_words: usize) -> Self {
        Self {
            max_single_line_words,
        }
    }

    /// Parses SubRip text, then compiles it.
    pub fn compile_srt(&self, srt: &str, style: &StyleConfig) -> Result<String, StyleCompileError> {
        let track = SubtitleTrack::parse_srt(srt).map_err(StyleCompileError::from)?;
        Ok(self.compile(&track, style))
    }

    pub fn compile(&self, track: &SubtitleTrack, style: &StyleConfig) -> String {
        let mut out = header(style);
        for cue in track.cues() {
            out.push_str(&self.dialogue_line(cue));
            out.push('\n');
        }
        tracing::debug!(cues = track.len(), "Style track compiled");
        out
    }

    fn dialogue_line(&self, cue: &SubtitleCue) -> String {
        format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_ass_timestamp(cue.start_ms),
            format_ass_timestamp(cue.end_ms),
            STYLE_NAME,
            self.wrap(&cue.text()),
        )
    }

    /// Splits the word list at its midpoint when it is too long for one line.
    pub fn wrap(&self, text: &str) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= self.max_single_line_words {
            return words.join(" ");
        }
        let mid = words.len() / 2;
        format!("{}{}{}", words[..mid].join(" "), LINE_BREAK, words[mid..].join(" "))
    }
}

fn ass_bool(flag: bool) -> i8 {
    if flag { -1 } else { 0 }
}

fn header(style: &StyleConfig) -> String {
    let primary = to_ass_color(&style.primary_color);
    let outline = to_ass_color(&style.outline_color);
    let back = style
        .shadow_color
        .as_deref()
        .map(to_ass_color)
        .unwrap_or_else(|| OPAQUE_BLACK.to_string());

    let mut out = String::new();
    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("PlayResX: 384\n");
    out.push_str("PlayResY: 288\n");
    out.push_str("ScaledBorderAndShadow: yes\n");
    out.push('\n');
    out.push_str("[V4+ Styles]\n");
    out.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
         BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
         BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Style: {},{},{},{},{},{},{},{},{},{},0,100,100,0,0,1,{},{},2,10,10,{},0",
        STYLE_NAME,
        style.font_name.trim(),
        style.font_size,
        primary,
        primary,
        outline,
        back,
        ass_bool(style.bold),
        ass_bool(style.italic),
        ass_bool(style.underline),
        style.outline_thickness,
        u8::from(style.shadow.is_enabled()),
        style.vertical_alignment,
    );
    out.push('\n');
    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
    out
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleCompileError {
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
    #[error("malformed subtitle input: {0}")]
    MalformedInput(String),
}

impl From<SubtitleError> for StyleCompileError {
    fn from(e: SubtitleError) -> Self {
        match e {
            SubtitleError::MalformedTimestamp(raw) => StyleCompileError::MalformedTimestamp(raw),
            other => StyleCompileError::MalformedInput(other.to_string()),
        }
    }
}
