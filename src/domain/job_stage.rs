use std::fmt;
use std::str::FromStr;

/// Milestones a job reaches; `Reframed` is independent of the subtitle chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStage {
    Downloaded,
    Chunked,
    Transcribed,
    Merged,
    Styled,
    Reframed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Downloaded => "DOWNLOADED",
            JobStage::Chunked => "CHUNKED",
            JobStage::Transcribed => "TRANSCRIBED",
            JobStage::Merged => "MERGED",
            JobStage::Styled => "STYLED",
            JobStage::Reframed => "REFRAMED",
        }
    }
}

impl FromStr for JobStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOWNLOADED" => Ok(JobStage::Downloaded),
            "CHUNKED" => Ok(JobStage::Chunked),
            "TRANSCRIBED" => Ok(JobStage::Transcribed),
            "MERGED" => Ok(JobStage::Merged),
            "STYLED" => Ok(JobStage::Styled),
            "REFRAMED" => Ok(JobStage::Reframed),
            _ => Err(format!("Invalid job stage: {}", s)),
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
