mod job_repository;
mod media_store;
mod media_toolkit;
mod repository_error;
mod result_notifier;
mod transcription_engine;
mod video_downloader;

pub use job_repository::JobRepository;
pub use media_store::{MediaStore, MediaStoreError};
pub use media_toolkit::{MediaToolError, MediaToolkit};
pub use repository_error::RepositoryError;
pub use result_notifier::{NotifierError, ResultNotifier};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
pub use video_downloader::{DownloadError, DownloadedVideo, VideoDownloader};
