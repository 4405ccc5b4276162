use std::time::Duration;

use crate::domain::{ChunkIndex, ChunkWindow};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(300);

/// Splits an audio timeline of length `total` into `ceil(total / window)`
/// consecutive windows. Every window is `window` long except possibly the
/// last, which takes the remainder, so the durations sum to `total`.
pub fn split_windows(
    total: Duration,
    window: Duration,
) -> Result<Vec<ChunkWindow>, ChunkSplitError> {
    if total.is_zero() {
        return Err(ChunkSplitError::InvalidInput(
            "audio duration must be positive".to_string(),
        ));
    }
    if window.is_zero() {
        return Err(ChunkSplitError::InvalidInput(
            "chunk window must be positive".to_string(),
        ));
    }

    let count = total.as_nanos().div_ceil(window.as_nanos());
    let count = u32::try_from(count).map_err(|_| {
        ChunkSplitError::InvalidInput(format!("{} chunks exceed the supported count", count))
    })?;

    let mut windows = Vec::with_capacity(count as usize);
    let mut start = Duration::ZERO;
    for position in 1..=count {
        let index = ChunkIndex::new(position).ok_or_else(|| {
            ChunkSplitError::InvalidInput(format!("chunk position {} out of range", position))
        })?;
        let remaining = total - start;
        let duration = remaining.min(window);
        windows.push(ChunkWindow {
            index,
            start_offset: start,
            duration,
        });
        start += duration;
    }

    tracing::debug!(
        total_secs = total.as_secs_f64(),
        window_secs = window.as_secs_f64(),
        chunks = windows.len(),
        "Audio split into windows"
    );

    Ok(windows)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkSplitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
