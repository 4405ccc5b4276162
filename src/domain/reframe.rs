use std::fmt;

use serde::{Deserialize, Serialize};

/// Short side of every zoomed output.
const ZOOMED_SHORT_SIDE: u32 = 1080;
/// Upper bound for the long side a zoomed ratio may imply.
pub const MAX_ZOOMED_LONG_SIDE: u32 = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for VideoDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Maximum output geometry; its ratio is the target aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReframeTarget {
    pub max_width: u32,
    pub max_height: u32,
}

impl ReframeTarget {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.max_width as f64 / self.max_height as f64
    }
}

impl Default for ReframeTarget {
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

/// Requested output framing: `original` or `zoomed_<w>_<h>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReframeMode {
    Original,
    Zoomed { ratio_width: u32, ratio_height: u32 },
}

impl ReframeMode {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("original") {
            return Ok(ReframeMode::Original);
        }

        let ratio = raw
            .strip_prefix("zoomed_")
            .ok_or_else(|| format!("invalid video format: {}. Expected original or zoomed_<w>_<h>", raw))?;
        let (w, h) = ratio
            .split_once(['_', ':'])
            .ok_or_else(|| format!("invalid aspect ratio: {}", ratio))?;
        let ratio_width: u32 = w
            .parse()
            .map_err(|_| format!("invalid aspect ratio width: {}", w))?;
        let ratio_height: u32 = h
            .parse()
            .map_err(|_| format!("invalid aspect ratio height: {}", h))?;
        if ratio_width == 0 || ratio_height == 0 {
            return Err(format!("aspect ratio terms must be positive: {}", ratio));
        }
        let elongation = ratio_width.max(ratio_height) as f64 / ratio_width.min(ratio_height) as f64;
        if ZOOMED_SHORT_SIDE as f64 * elongation > MAX_ZOOMED_LONG_SIDE as f64 {
            return Err(format!(
                "aspect ratio {} implies a long side above {}",
                ratio, MAX_ZOOMED_LONG_SIDE
            ));
        }

        Ok(ReframeMode::Zoomed {
            ratio_width,
            ratio_height,
        })
    }

    /// Output bounds implied by the mode; `None` keeps the source untouched.
    pub fn target(&self) -> Option<ReframeTarget> {
        match *self {
            ReframeMode::Original => None,
            ReframeMode::Zoomed {
                ratio_width,
                ratio_height,
            } => {
                let short = ZOOMED_SHORT_SIDE as f64;
                let target = if ratio_width <= ratio_height {
                    let height = short * ratio_height as f64 / ratio_width as f64;
                    ReframeTarget::new(ZOOMED_SHORT_SIDE, round_to_even(height))
                } else {
                    let width = short * ratio_width as f64 / ratio_height as f64;
                    ReframeTarget::new(round_to_even(width), ZOOMED_SHORT_SIDE)
                };
                Some(target)
            }
        }
    }
}

// MAX_ZOOMED_LONG_SIDE is even, so the clamp leaves room for the bump.
fn round_to_even(value: f64) -> u32 {
    let rounded = value.round().min(MAX_ZOOMED_LONG_SIDE as f64) as u32;
    rounded + rounded % 2
}

impl TryFrom<String> for ReframeMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReframeMode> for String {
    fn from(mode: ReframeMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for ReframeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReframeMode::Original => f.write_str("original"),
            ReframeMode::Zoomed {
                ratio_width,
                ratio_height,
            } => write!(f, "zoomed_{}_{}", ratio_width, ratio_height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTarget {
    pub width: u32,
    pub height: u32,
}

/// Geometry chosen for one job, consumed by the encode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReframeDecision {
    pub crop: Option<CropRect>,
    pub scale: Option<ScaleTarget>,
    pub pass_through: bool,
}

impl ReframeDecision {
    pub fn pass_through() -> Self {
        Self {
            crop: None,
            scale: None,
            pass_through: true,
        }
    }

    pub fn transform(crop: Option<CropRect>, scale: Option<ScaleTarget>) -> Self {
        Self {
            crop,
            scale,
            pass_through: false,
        }
    }

    /// ffmpeg `-vf` chain, e.g. `crop=607:1080:656:0,scale=1080:1920`.
    pub fn filter_chain(&self) -> Option<String> {
        let mut filters = Vec::new();
        if let Some(crop) = self.crop {
            filters.push(format!(
                "crop={}:{}:{}:{}",
                crop.width, crop.height, crop.x, crop.y
            ));
        }
        if let Some(scale) = self.scale {
            filters.push(format!("scale={}:{}", scale.width, scale.height));
        }
        (!filters.is_empty()).then(|| filters.join(","))
    }

    /// Fixed encode policy; absent for pass-through.
    pub fn encode_parameters(&self) -> Option<EncodeParameters> {
        (!self.pass_through).then(EncodeParameters::default)
    }

    /// Frame size the decision produces from `source`.
    pub fn output_dimensions(&self, source: VideoDimensions) -> VideoDimensions {
        if let Some(scale) = self.scale {
            return VideoDimensions::new(scale.width, scale.height);
        }
        if let Some(crop) = self.crop {
            return VideoDimensions::new(crop.width, crop.height);
        }
        source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParameters {
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub crf: u8,
    pub preset: &'static str,
    pub maxrate: &'static str,
    pub bufsize: &'static str,
    pub pixel_format: &'static str,
    pub fast_start: bool,
}

impl Default for EncodeParameters {
    fn default() -> Self {
        Self {
            video_codec: "libx264",
            audio_codec: "aac",
            crf: 23,
            preset: "fast",
            maxrate: "4M",
            bufsize: "8M",
            pixel_format: "yuv420p",
            fast_start: true,
        }
    }
}

impl EncodeParameters {
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.video_codec.to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-preset".to_string(),
            self.preset.to_string(),
            "-maxrate".to_string(),
            self.maxrate.to_string(),
            "-bufsize".to_string(),
            self.bufsize.to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.to_string(),
            "-c:a".to_string(),
            self.audio_codec.to_string(),
        ];
        if self.fast_start {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }
        args
    }
}
