use std::time::Duration;

use substream::application::services::{ChunkTranscript, merge_chunks};
use substream::domain::{SubtitleCue, SubtitleTrack};

use crate::helpers::index;

const WINDOW: Duration = Duration::from_secs(300);

fn cue(start_ms: u64, end_ms: u64, text: &str) -> SubtitleCue {
    SubtitleCue::new(1, start_ms, end_ms, vec![text.to_string()]).unwrap()
}

fn transcript(i: Option<u32>, cues: Vec<SubtitleCue>) -> ChunkTranscript {
    ChunkTranscript::new(i.map(index), cues)
}

fn starts(track: &SubtitleTrack) -> Vec<u64> {
    track.cues().iter().map(|c| c.start_ms).collect()
}

#[test]
fn given_second_chunk_cue_when_merging_then_it_is_shifted_by_one_window() {
    let chunk_two = SubtitleTrack::parse_srt("1\n00:00:10,500 --> 00:00:12,000\nhello\n").unwrap();

    let merged = merge_chunks(
        vec![
            transcript(Some(1), vec![cue(0, 1_000, "intro")]),
            transcript(Some(2), chunk_two.into_cues()),
        ],
        WINDOW,
    );

    let srt = merged.to_srt();
    assert!(srt.contains("2\n00:05:10,500 --> 00:05:12,000\nhello\n"));
}

#[test]
fn given_chunks_in_any_order_when_merging_then_output_is_identical() {
    let a = transcript(Some(1), vec![cue(0, 900, "a1"), cue(1_000, 1_900, "a2")]);
    let b = transcript(Some(2), vec![cue(500, 900, "b1")]);
    let c = transcript(Some(3), vec![cue(0, 400, "c1")]);

    let forward = merge_chunks(vec![a.clone(), b.clone(), c.clone()], WINDOW);
    let shuffled = merge_chunks(vec![c, a, b], WINDOW);

    assert_eq!(forward.to_srt(), shuffled.to_srt());
    assert_eq!(starts(&forward), vec![0, 1_000, 300_500, 600_000]);
}

#[test]
fn given_cues_when_merging_then_indices_run_from_one_without_gaps() {
    let merged = merge_chunks(
        vec![
            transcript(Some(2), vec![cue(0, 100, "x"), cue(200, 300, "y")]),
            transcript(Some(1), vec![cue(0, 100, "z")]),
        ],
        WINDOW,
    );

    let indices: Vec<u32> = merged.cues().iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn given_missing_middle_chunk_when_merging_then_later_chunk_keeps_its_own_slot() {
    let merged = merge_chunks(
        vec![
            transcript(Some(1), vec![cue(0, 100, "one")]),
            transcript(Some(3), vec![cue(0, 100, "three")]),
        ],
        WINDOW,
    );

    assert_eq!(starts(&merged), vec![0, 600_000]);
}

#[test]
fn given_chunk_without_index_when_merging_then_it_is_placed_after_the_last_known_slot() {
    let merged = merge_chunks(
        vec![
            transcript(None, vec![cue(0, 100, "unknown")]),
            transcript(Some(2), vec![cue(0, 100, "two")]),
            transcript(Some(1), vec![cue(0, 100, "one")]),
        ],
        WINDOW,
    );

    let texts: Vec<String> = merged.cues().iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["one", "two", "unknown"]);
    assert_eq!(starts(&merged), vec![0, 300_000, 600_000]);
}

#[test]
fn given_cue_overlapping_previous_when_merging_then_start_is_clamped() {
    let merged = merge_chunks(
        vec![
            transcript(Some(1), vec![cue(299_000, 301_000, "spill")]),
            transcript(Some(2), vec![cue(0, 2_000, "next")]),
        ],
        WINDOW,
    );

    let cues = merged.cues();
    assert_eq!(cues[1].start_ms, 301_000);
    assert_eq!(cues[1].end_ms, 302_000);
    for pair in cues.windows(2) {
        assert!(pair[0].end_ms <= pair[1].start_ms);
    }
}

#[test]
fn given_cue_fully_covered_by_previous_when_merging_then_it_is_dropped() {
    let merged = merge_chunks(
        vec![transcript(Some(1), vec![cue(0, 5_000, "long"), cue(1_000, 2_000, "inside")])],
        WINDOW,
    );

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.cues()[0].text(), "long");
}

#[test]
fn given_no_chunks_when_merging_then_track_is_empty() {
    assert!(merge_chunks(Vec::new(), WINDOW).is_empty());
}
