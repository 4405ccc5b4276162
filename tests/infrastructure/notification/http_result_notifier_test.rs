use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use substream::application::ports::{NotifierError, ResultNotifier};
use substream::domain::{StageOutcome, StreamId, SubtitleStyled, TaskKind};
use substream::infrastructure::notification::HttpResultNotifier;

#[derive(Debug, Clone)]
struct Received {
    endpoint: String,
    authorization: Option<String>,
    body: serde_json::Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

async fn start_mock_callback_server(status: u16) -> (String, Log, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route(
            "/processor/{endpoint}",
            post(
                move |State(log): State<Log>,
                      Path(endpoint): Path<String>,
                      headers: HeaderMap,
                      body: axum::Json<serde_json::Value>| async move {
                    log.lock().unwrap().push(Received {
                        endpoint,
                        authorization: headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from),
                        body: body.0,
                    });
                    StatusCode::from_u16(status).unwrap()
                },
            ),
        )
        .with_state(Arc::clone(&log));

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

    (format!("http://{}", addr), log, shutdown_tx)
}

#[tokio::test]
async fn given_success_outcome_when_notifying_then_posts_payload_to_stage_endpoint() {
    let (base_url, log, shutdown_tx) = start_mock_callback_server(200).await;
    let notifier = HttpResultNotifier::new(format!("{}/", base_url), "secret-token");
    let outcome = StageOutcome::SubtitleStyled(SubtitleStyled {
        subtitle_ass_file: "abc.ass".to_string(),
        stream_id: StreamId::parse("abc").unwrap(),
    });

    notifier.notify_success(&outcome).await.unwrap();

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].endpoint, "transform-subtitle");
    assert_eq!(received[0].authorization.as_deref(), Some("secret-token"));
    assert_eq!(
        received[0].body,
        serde_json::json!({"subtitle_ass_file": "abc.ass", "stream_id": "abc"})
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_failure_when_notifying_then_posts_only_stream_id_to_failure_endpoint() {
    let (base_url, log, shutdown_tx) = start_mock_callback_server(200).await;
    let notifier = HttpResultNotifier::new(base_url, "secret-token");

    notifier
        .notify_failure(TaskKind::ExtractSound, &StreamId::parse("abc").unwrap())
        .await
        .unwrap();

    let received = log.lock().unwrap().clone();
    assert_eq!(received[0].endpoint, "extract-sound-failure");
    assert_eq!(received[0].body, serde_json::json!({"stream_id": "abc"}));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_callback_rejects_when_notifying_then_returns_rejected_status() {
    let (base_url, _log, shutdown_tx) = start_mock_callback_server(500).await;
    let notifier = HttpResultNotifier::new(base_url, "secret-token");

    let result = notifier
        .notify_failure(TaskKind::GetVideo, &StreamId::parse("abc").unwrap())
        .await;

    assert!(matches!(result, Err(NotifierError::Rejected { status: 500, .. })));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_callback_when_notifying_then_request_failed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let notifier = HttpResultNotifier::new(format!("http://{}", addr), "secret-token");

    let result = notifier
        .notify_failure(TaskKind::GetVideo, &StreamId::parse("abc").unwrap())
        .await;

    assert!(matches!(result, Err(NotifierError::RequestFailed(_))));
}
