use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use substream::application::services::{CueBuilder, FanOutError, TranscriptionFanOut};

use crate::helpers::{FakeTranscriptionEngine, chunk, index, numbered_words, words};

fn fan_out(engine: Arc<FakeTranscriptionEngine>, workers: usize) -> TranscriptionFanOut {
    TranscriptionFanOut::new(engine, workers, CueBuilder::default())
}

#[tokio::test]
async fn given_chunks_finishing_out_of_order_when_running_then_results_are_keyed_by_index() {
    let engine = Arc::new(
        FakeTranscriptionEngine::new()
            .with_words("a_1.wav", words(&[("first", 0, 100)]), 60)
            .with_words("a_2.wav", words(&[("second", 0, 100)]), 5)
            .with_words("a_3.wav", words(&[("third", 0, 100)]), 30),
    );

    let results = fan_out(engine, 3)
        .run(
            vec![chunk(1, "a_1.wav"), chunk(2, "a_2.wav"), chunk(3, "a_3.wav")],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let texts: Vec<String> = results.values().map(|cues| cues[0].text()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![index(1), index(2), index(3)]);
}

#[tokio::test]
async fn given_more_chunks_than_workers_when_running_then_every_worker_is_busy_and_no_more() {
    let mut engine = FakeTranscriptionEngine::new();
    let mut chunks = Vec::new();
    for i in 1..=12 {
        let name = format!("b_{}.wav", i);
        engine = engine.with_words(&name, numbered_words(3), 20);
        chunks.push(chunk(i, &name));
    }
    let engine = Arc::new(engine);

    let results = fan_out(Arc::clone(&engine), 5)
        .run(chunks, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 12);
    assert_eq!(engine.max_concurrency(), 5);
}

#[tokio::test]
async fn given_failing_chunk_when_running_then_whole_run_fails_and_pending_chunks_are_skipped() {
    let mut engine = FakeTranscriptionEngine::new().with_failure("c_1.wav", 5);
    let mut chunks = vec![chunk(1, "c_1.wav")];
    for i in 2..=6 {
        let name = format!("c_{}.wav", i);
        engine = engine.with_words(&name, numbered_words(2), 200);
        chunks.push(chunk(i, &name));
    }
    let engine = Arc::new(engine);

    let result = fan_out(Arc::clone(&engine), 1)
        .run(chunks, &CancellationToken::new())
        .await;

    match result {
        Err(FanOutError::ChunkFailed { index: failed, .. }) => assert_eq!(failed, index(1)),
        other => panic!("expected ChunkFailed, got {:?}", other),
    }
    assert_eq!(engine.calls(), vec!["c_1.wav".to_string()]);
}

#[tokio::test]
async fn given_failure_while_others_in_flight_when_running_then_returns_without_waiting_for_them() {
    let engine = Arc::new(
        FakeTranscriptionEngine::new()
            .with_words("d_1.wav", numbered_words(2), 10_000)
            .with_failure("d_2.wav", 10),
    );

    let started = std::time::Instant::now();
    let result = fan_out(engine, 2)
        .run(
            vec![chunk(1, "d_1.wav"), chunk(2, "d_2.wav")],
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(FanOutError::ChunkFailed { .. })));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[tokio::test]
async fn given_duplicate_indices_when_running_then_returns_invalid_input() {
    let engine = Arc::new(FakeTranscriptionEngine::new());

    let result = fan_out(engine, 2)
        .run(
            vec![chunk(1, "e_1.wav"), chunk(1, "e_1_copy.wav")],
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(result, Err(FanOutError::InvalidInput(_))));
}

#[tokio::test]
async fn given_cancelled_token_when_running_then_returns_cancelled() {
    let engine = Arc::new(FakeTranscriptionEngine::new().with_words("f_1.wav", numbered_words(2), 0));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = fan_out(engine, 2).run(vec![chunk(1, "f_1.wav")], &cancel).await;

    assert!(matches!(result, Err(FanOutError::Cancelled)));
}

#[tokio::test]
async fn given_empty_transcript_when_running_then_chunk_has_no_cues() {
    let engine = Arc::new(FakeTranscriptionEngine::new().with_words("g_1.wav", Vec::new(), 0));

    let results = fan_out(engine, 5)
        .run(vec![chunk(1, "g_1.wav")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(results[&index(1)].is_empty());
}
