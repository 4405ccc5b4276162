use crate::domain::{SubtitleCue, TranscriptWord};

pub const DEFAULT_WORDS_PER_CUE: usize = 6;

/// Groups a chunk's transcribed words into locally-timed cues.
#[derive(Debug, Clone, Copy)]
pub struct CueBuilder {
    words_per_cue: usize,
}

impl Default for CueBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_CUE)
    }
}

impl CueBuilder {
    pub fn new(words_per_cue: usize) -> Self {
        Self {
            words_per_cue: words_per_cue.max(1),
        }
    }

    /// Cues are numbered from 1, span their first word's start to their last
    /// word's end and split their words at the midpoint into two lines.
    pub fn build(&self, words: &[TranscriptWord]) -> Vec<SubtitleCue> {
        let mut cues = Vec::with_capacity(words.len().div_ceil(self.words_per_cue));

        for group in words.chunks(self.words_per_cue) {
            let texts: Vec<&str> = group
                .iter()
                .map(|w| w.text.trim())
                .filter(|t| !t.is_empty())
                .collect();
            if texts.is_empty() {
                continue;
            }

            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let start_ms = first.start_ms;
            let end_ms = last.end_ms.max(start_ms + 1);

            let lines = if texts.len() > 1 {
                let mid = texts.len() / 2;
                vec![texts[..mid].join(" "), texts[mid..].join(" ")]
            } else {
                vec![texts[0].to_string()]
            };

            let index = cues.len() as u32 + 1;
            match SubtitleCue::new(index, start_ms, end_ms, lines) {
                Ok(cue) => cues.push(cue),
                Err(e) => tracing::warn!(error = %e, "Skipping unusable word group"),
            }
        }

        cues
    }
}
