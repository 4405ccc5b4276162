use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use substream::application::ports::JobRepository;
use substream::application::services::{
    PipelineConfig, PipelineContext, StageOrchestrator, TaskWorker,
};
use substream::infrastructure::audio::{TranscriptionEngineFactory, TranscriptionProvider};
use substream::infrastructure::media::{FfmpegToolkit, YtDlpDownloader};
use substream::infrastructure::notification::HttpResultNotifier;
use substream::infrastructure::observability::{TracingConfig, init_tracing};
use substream::infrastructure::persistence::InMemoryJobRepository;
use substream::infrastructure::storage::MediaStoreFactory;
use substream::presentation::config::TranscriptionProviderSetting;
use substream::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::new(
            environment.as_str(),
            settings.logging.enable_json,
            Some(&settings.logging.level),
        ),
        settings.server.port,
    );

    let store = MediaStoreFactory::create(&settings.storage).context("Failed to open media store")?;

    let provider = match settings.transcription.provider {
        TranscriptionProviderSetting::AssemblyAi => TranscriptionProvider::AssemblyAi,
        TranscriptionProviderSetting::OpenAi => TranscriptionProvider::OpenAi,
    };
    let transcription_engine = TranscriptionEngineFactory::create(
        provider,
        settings.transcription.model.clone(),
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        settings.transcription.poll_interval(),
    )
    .context("Failed to configure transcription engine")?;

    if settings.notifier.processor_token.is_empty() {
        tracing::warn!("notifier.processor_token is empty, task intake will reject every request");
    }

    let job_repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let ctx = PipelineContext {
        store,
        transcription_engine,
        media_toolkit: Arc::new(FfmpegToolkit::new(
            &settings.media.ffmpeg_path,
            &settings.media.ffprobe_path,
        )),
        downloader: Arc::new(YtDlpDownloader::new(
            &settings.media.ytdlp_path,
            &settings.media.download_format,
        )),
        notifier: Arc::new(HttpResultNotifier::new(
            &settings.notifier.api_url,
            &settings.notifier.processor_token,
        )),
        job_repository: Arc::clone(&job_repository),
    };
    let orchestrator = Arc::new(StageOrchestrator::new(
        ctx,
        PipelineConfig {
            chunk_window: settings.pipeline.chunk_window(),
            fan_out_workers: settings.pipeline.fan_out_workers,
            words_per_cue: settings.pipeline.words_per_cue,
            work_dir: settings.pipeline.work_dir.clone(),
        },
    ));

    let shutdown = CancellationToken::new();
    let (task_sender, task_receiver) = mpsc::channel(settings.pipeline.task_queue_capacity);
    let worker = TaskWorker::new(
        task_receiver,
        orchestrator,
        settings.pipeline.max_concurrent_tasks,
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let state = AppState {
        job_repository,
        task_sender,
        processor_token: Arc::from(settings.notifier.processor_token.as_str()),
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    worker_handle.await.context("Task worker panicked")?;
    Ok(())
}
