use std::fmt;

use serde::{Deserialize, Serialize};

/// Colour used when a configured colour is not `#RRGGBB`.
pub const FALLBACK_ASS_COLOR: &str = "&HFFFFFF";

/// Caller-supplied presentation style for one compile call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(rename = "subtitle_font")]
    pub font_name: String,
    #[serde(rename = "subtitle_size")]
    pub font_size: u32,
    #[serde(rename = "subtitle_color")]
    pub primary_color: String,
    #[serde(rename = "subtitle_bold")]
    pub bold: bool,
    #[serde(rename = "subtitle_italic")]
    pub italic: bool,
    #[serde(rename = "subtitle_underline")]
    pub underline: bool,
    #[serde(rename = "subtitle_outline_color")]
    pub outline_color: String,
    #[serde(rename = "subtitle_outline_thickness")]
    pub outline_thickness: u32,
    #[serde(rename = "subtitle_shadow")]
    pub shadow: ShadowMode,
    #[serde(rename = "subtitle_shadow_color", default)]
    pub shadow_color: Option<String>,
    #[serde(rename = "y_axis_alignment")]
    pub vertical_alignment: f64,
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.font_name.trim().is_empty() {
            return Err("subtitle_font must not be empty".to_string());
        }
        if self.font_name.contains(',') || self.font_name.contains('\n') {
            return Err("subtitle_font must not contain ',' or line breaks".to_string());
        }
        if self.font_size == 0 {
            return Err("subtitle_size must be positive".to_string());
        }
        if !self.vertical_alignment.is_finite() {
            return Err("y_axis_alignment must be a finite number".to_string());
        }
        Ok(())
    }
}

/// Converts `#RRGGBB` to the byte-reversed `&HBBGGRR` form.
pub fn to_ass_color(hex: &str) -> String {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return FALLBACK_ASS_COLOR.to_string();
    }
    let (r, g, b) = (&digits[0..2], &digits[2..4], &digits[4..6]);
    format!("&H{}{}{}", b, g, r)
}

/// Shadow setting; rendered as on/off only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShadowMode", into = "String")]
pub enum ShadowMode {
    None,
    Soft,
    Hard,
}

impl ShadowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowMode::None => "NONE",
            ShadowMode::Soft => "SOFT",
            ShadowMode::Hard => "HARD",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ShadowMode::None)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawShadowMode {
    Level(i64),
    Name(String),
}

impl TryFrom<RawShadowMode> for ShadowMode {
    type Error = String;

    fn try_from(raw: RawShadowMode) -> Result<Self, Self::Error> {
        match raw {
            RawShadowMode::Level(level) if level <= 0 => Ok(ShadowMode::None),
            RawShadowMode::Level(1) => Ok(ShadowMode::Soft),
            RawShadowMode::Level(_) => Ok(ShadowMode::Hard),
            RawShadowMode::Name(name) => match name.to_ascii_uppercase().as_str() {
                "NONE" => Ok(ShadowMode::None),
                "SOFT" => Ok(ShadowMode::Soft),
                "HARD" => Ok(ShadowMode::Hard),
                other => Err(format!(
                    "invalid shadow mode: {}. Expected: NONE, SOFT or HARD",
                    other
                )),
            },
        }
    }
}

impl From<ShadowMode> for String {
    fn from(mode: ShadowMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for ShadowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
