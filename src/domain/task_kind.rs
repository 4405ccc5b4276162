use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage task names accepted at the queue boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    GetVideo,
    ExtractSound,
    GenerateSubtitles,
    TransformSubtitle,
    TransformVideo,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::GetVideo => "get_video",
            TaskKind::ExtractSound => "extract_sound",
            TaskKind::GenerateSubtitles => "generate_subtitles",
            TaskKind::TransformSubtitle => "transform_subtitle",
            TaskKind::TransformVideo => "transform_video",
        }
    }

    /// Callback route segment for a successful run.
    pub fn success_endpoint(&self) -> &'static str {
        match self {
            TaskKind::GetVideo => "get-video-url",
            TaskKind::ExtractSound => "extract-sound",
            TaskKind::GenerateSubtitles => "generate-subtitles",
            TaskKind::TransformSubtitle => "transform-subtitle",
            TaskKind::TransformVideo => "transform-video",
        }
    }

    pub fn failure_endpoint(&self) -> String {
        format!("{}-failure", self.success_endpoint())
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
