use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use substream::application::ports::{TranscriptionEngine, TranscriptionError};
use substream::domain::TranscriptWord;
use substream::infrastructure::audio::{
    AssemblyAiEngine, OpenAiWhisperEngine, TranscriptionEngineFactory, TranscriptionProvider,
};

async fn serve(app: Router) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (format!("http://{}", addr), shutdown_tx)
}

fn write_audio() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("job_1.wav");
    std::fs::write(&path, b"RIFF fake wav").unwrap();
    (dir, path)
}

async fn start_mock_whisper_server(status: u16) -> (String, oneshot::Sender<()>) {
    let app = Router::new().route(
        "/audio/transcriptions",
        post(move |headers: HeaderMap, body: Bytes| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer test-key");
            let asks_for_words = String::from_utf8_lossy(&body).contains("timestamp_granularities[]");
            if status != 200 || !authorized || !asks_for_words {
                let code = if status != 200 { status } else { 400 };
                return (StatusCode::from_u16(code).unwrap(), Json(serde_json::json!({"error": "bad"})));
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "text": "Hello world",
                    "words": [
                        {"word": " Hello", "start": 0.0, "end": 0.42},
                        {"word": "world", "start": 0.5, "end": 1.0}
                    ]
                })),
            )
        }),
    );
    serve(app).await
}

#[tokio::test]
async fn given_verbose_json_response_when_transcribing_then_returns_millisecond_words() {
    let (base_url, shutdown_tx) = start_mock_whisper_server(200).await;
    let (_dir, audio) = write_audio();
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let words = engine.transcribe(&audio).await.unwrap();

    assert_eq!(
        words,
        vec![
            TranscriptWord::new("Hello", 0, 420),
            TranscriptWord::new("world", 500, 1000),
        ]
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_error_status_when_transcribing_with_whisper_then_api_request_failed() {
    let (base_url, shutdown_tx) = start_mock_whisper_server(500).await;
    let (_dir, audio) = write_audio();
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some(base_url), None);

    let result = engine.transcribe(&audio).await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_audio_file_when_transcribing_then_audio_unreadable() {
    let engine = OpenAiWhisperEngine::new("test-key".to_string(), Some("http://127.0.0.1:1".to_string()), None);

    let result = engine
        .transcribe(std::path::Path::new("/nonexistent/job_1.wav"))
        .await;

    assert!(matches!(result, Err(TranscriptionError::AudioUnreadable(_))));
}

#[derive(Clone)]
struct AssemblyAiMock {
    polls: Arc<AtomicUsize>,
    final_status: &'static str,
    upload_auth: Arc<std::sync::Mutex<Option<String>>>,
}

async fn start_mock_assemblyai_server(final_status: &'static str) -> (String, AssemblyAiMock, oneshot::Sender<()>) {
    let mock = AssemblyAiMock {
        polls: Arc::new(AtomicUsize::new(0)),
        final_status,
        upload_auth: Arc::new(std::sync::Mutex::new(None)),
    };

    let app = Router::new()
        .route(
            "/v2/upload",
            post(|State(mock): State<AssemblyAiMock>, headers: HeaderMap, _body: Bytes| async move {
                *mock.upload_auth.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                Json(serde_json::json!({"upload_url": "https://cdn.example/upload/1"}))
            }),
        )
        .route(
            "/v2/transcript",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["audio_url"], "https://cdn.example/upload/1");
                assert_eq!(body["language_detection"], true);
                Json(serde_json::json!({"id": "t-1", "status": "queued"}))
            }),
        )
        .route(
            "/v2/transcript/t-1",
            get(|State(mock): State<AssemblyAiMock>| async move {
                let n = mock.polls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    return Json(serde_json::json!({"id": "t-1", "status": "processing"}));
                }
                match mock.final_status {
                    "completed" => Json(serde_json::json!({
                        "id": "t-1",
                        "status": "completed",
                        "words": [
                            {"text": "Bonjour", "start": 120, "end": 480, "confidence": 0.9},
                            {"text": "monde", "start": 500, "end": 900, "confidence": 0.8}
                        ]
                    })),
                    _ => Json(serde_json::json!({
                        "id": "t-1",
                        "status": "error",
                        "error": "audio too short"
                    })),
                }
            }),
        )
        .with_state(mock.clone());

    let (base_url, shutdown_tx) = serve(app).await;
    (base_url, mock, shutdown_tx)
}

#[tokio::test]
async fn given_completed_transcript_when_transcribing_with_assemblyai_then_polls_until_done() {
    let (base_url, mock, shutdown_tx) = start_mock_assemblyai_server("completed").await;
    let (_dir, audio) = write_audio();
    let engine = AssemblyAiEngine::new("aai-key".to_string(), Some(format!("{}/", base_url)))
        .with_polling(Duration::from_millis(10), Duration::from_secs(5));

    let words = engine.transcribe(&audio).await.unwrap();

    assert_eq!(
        words,
        vec![
            TranscriptWord::new("Bonjour", 120, 480),
            TranscriptWord::new("monde", 500, 900),
        ]
    );
    assert_eq!(mock.polls.load(Ordering::SeqCst), 2);
    assert_eq!(mock.upload_auth.lock().unwrap().as_deref(), Some("aai-key"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_errored_transcript_when_transcribing_with_assemblyai_then_transcription_failed() {
    let (base_url, _mock, shutdown_tx) = start_mock_assemblyai_server("error").await;
    let (_dir, audio) = write_audio();
    let engine = AssemblyAiEngine::new("aai-key".to_string(), Some(base_url))
        .with_polling(Duration::from_millis(10), Duration::from_secs(5));

    let result = engine.transcribe(&audio).await;

    match result {
        Err(TranscriptionError::TranscriptionFailed(reason)) => assert_eq!(reason, "audio too short"),
        other => panic!("expected TranscriptionFailed, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[test]
fn given_no_api_key_when_creating_engine_then_configuration_error() {
    let result = TranscriptionEngineFactory::create(
        TranscriptionProvider::AssemblyAi,
        None,
        Some(String::new()),
        None,
        Duration::from_secs(3),
    );

    assert!(matches!(result, Err(TranscriptionError::Configuration(_))));
}

#[test]
fn given_api_key_when_creating_openai_engine_then_succeeds() {
    let result = TranscriptionEngineFactory::create(
        TranscriptionProvider::OpenAi,
        Some("whisper-1".to_string()),
        Some("sk-test".to_string()),
        None,
        Duration::from_secs(3),
    );

    assert!(result.is_ok());
}
