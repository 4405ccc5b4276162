use crate::domain::{CropRect, ReframeDecision, ReframeTarget, ScaleTarget, VideoDimensions};

/// Ratios closer than this are treated as equal.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// Decides how to bring `source` to the aspect ratio of `target`.
///
/// Matching ratios pass through when the source fits the bounds and are
/// scaled down to the bounds otherwise. Differing ratios get the largest
/// centred crop of the target ratio, followed by a scale to the bounds when
/// the crop does not fit.
pub fn decide(
    source: VideoDimensions,
    target: ReframeTarget,
) -> Result<ReframeDecision, ReframeError> {
    if source.width == 0 || source.height == 0 {
        return Err(ReframeError::UnsupportedGeometry(format!(
            "source dimensions must be positive, got {}",
            source
        )));
    }
    if target.max_width == 0 || target.max_height == 0 {
        return Err(ReframeError::UnsupportedGeometry(format!(
            "target bounds must be positive, got {}x{}",
            target.max_width, target.max_height
        )));
    }

    let target_ratio = target.ratio();
    let source_ratio = source.width as f64 / source.height as f64;
    let bounds = ScaleTarget {
        width: target.max_width,
        height: target.max_height,
    };

    if (source_ratio - target_ratio).abs() < RATIO_TOLERANCE {
        let decision = if source.width <= target.max_width && source.height <= target.max_height {
            ReframeDecision::pass_through()
        } else {
            ReframeDecision::transform(None, Some(bounds))
        };
        tracing::debug!(source = %source, ?decision, "Aspect ratio already matches");
        return Ok(decision);
    }

    let crop = centered_crop(source, source_ratio, target_ratio);
    if crop.width == 0 || crop.height == 0 {
        return Err(ReframeError::UnsupportedGeometry(format!(
            "{} leaves no pixels at ratio {:.4}",
            source, target_ratio
        )));
    }
    let fits = crop.width <= target.max_width && crop.height <= target.max_height;
    let decision = ReframeDecision::transform(Some(crop), (!fits).then_some(bounds));

    tracing::debug!(
        source = %source,
        source_ratio,
        target_ratio,
        ?decision,
        "Reframe geometry decided"
    );

    Ok(decision)
}

fn centered_crop(source: VideoDimensions, source_ratio: f64, target_ratio: f64) -> CropRect {
    if source_ratio > target_ratio {
        let width = (source.height as f64 * target_ratio).floor() as u32;
        CropRect {
            x: (source.width - width) / 2,
            y: 0,
            width,
            height: source.height,
        }
    } else {
        let height = (source.width as f64 / target_ratio).floor() as u32;
        CropRect {
            x: 0,
            y: (source.height - height) / 2,
            width: source.width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReframeError {
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}
