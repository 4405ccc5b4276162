use std::time::Duration;

use crate::domain::{ChunkIndex, SubtitleCue, SubtitleTrack};

/// Locally-timed cues of one chunk. `index` is `None` when the chunk's
/// position could not be established; such chunks are merged last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTranscript {
    pub index: Option<ChunkIndex>,
    pub cues: Vec<SubtitleCue>,
}

impl ChunkTranscript {
    pub fn new(index: Option<ChunkIndex>, cues: Vec<SubtitleCue>) -> Self {
        Self { index, cues }
    }
}

/// Merges per-chunk cues into one continuously-timed, renumbered track.
///
/// Chunks are ordered by index (unknown indices last, in arrival order). The
/// cues of chunk `i` are shifted by `(i - 1) * window`; a chunk without an
/// index takes the window slot after the previous chunk. Output indices run
/// `1..=M`, cue starts never decrease and cues never overlap: a cue that
/// would begin before the previous one ends is trimmed to start there, and
/// dropped if nothing remains.
pub fn merge_chunks(mut chunks: Vec<ChunkTranscript>, window: Duration) -> SubtitleTrack {
    chunks.sort_by_key(|c| c.index.map_or(u64::MAX, |i| u64::from(i.get())));

    let window_ms = window.as_millis() as u64;
    let mut merged: Vec<SubtitleCue> = Vec::new();
    let mut last_slot: Option<u64> = None;
    let mut previous_end = 0u64;
    let mut dropped = 0usize;

    for chunk in chunks {
        let slot = match chunk.index {
            Some(index) => u64::from(index.preceding_windows()),
            None => last_slot.map_or(0, |s| s + 1),
        };
        last_slot = Some(slot);
        let offset_ms = slot.saturating_mul(window_ms);

        let mut cues = chunk.cues;
        cues.sort_by_key(|c| c.start_ms);

        for cue in cues {
            let Some(cue) = cue.shifted(offset_ms).starting_at(previous_end) else {
                dropped += 1;
                continue;
            };
            previous_end = cue.end_ms;
            let index = merged.len() as u32 + 1;
            merged.push(cue.with_index(index));
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "Dropped cues fully overlapped by earlier cues");
    }
    tracing::debug!(cues = merged.len(), "Subtitle track merged");

    SubtitleTrack::new(merged)
}
