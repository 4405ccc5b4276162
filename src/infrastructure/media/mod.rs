mod ffmpeg_toolkit;
mod ytdlp_downloader;

pub use ffmpeg_toolkit::{FfmpegToolkit, parse_probe_duration};
pub use ytdlp_downloader::{DEFAULT_DOWNLOAD_FORMAT, YtDlpDownloader};
