//! The per-submission generation request and its validation rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{self, DEFAULT_FG_COLOR};
use crate::error::{Field, ValidationErrors};

pub const TEXT_REQUIRED: &str = "Please enter a valid URL or text.";
pub const COLOR_INVALID: &str = "Please enter a hex color like #FFFFFF.";
pub const SIZE_INVALID: &str = "Size must be a positive number of pixels.";
pub const SIZE_TOO_LARGE: &str = "Size must be at most 4096 pixels.";

/// Largest edge, in pixels, that is ever rendered or read back from storage.
pub const MAX_SIZE: u32 = 4096;

/// Output dimension of a QR code, in pixels.
///
/// The form offers three sizes; any other value in `1..=MAX_SIZE` read back
/// from storage is kept as `Custom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum QrSize {
    Small,
    #[default]
    Medium,
    Large,
    Custom(u32),
}

impl QrSize {
    /// The sizes offered by the form, smallest first.
    pub const OPTIONS: [QrSize; 3] = [QrSize::Small, QrSize::Medium, QrSize::Large];

    pub fn pixels(self) -> u32 {
        match self {
            Self::Small => 150,
            Self::Medium => 250,
            Self::Large => 350,
            Self::Custom(px) => px,
        }
    }

    pub fn from_pixels(px: u32) -> Self {
        match px {
            150 => Self::Small,
            250 => Self::Medium,
            350 => Self::Large,
            other => Self::Custom(other),
        }
    }

    pub fn label(self) -> String {
        let px = self.pixels();
        match self {
            Self::Small => format!("Small ({px}x{px})"),
            Self::Medium => format!("Medium ({px}x{px})"),
            Self::Large => format!("Large ({px}x{px})"),
            Self::Custom(_) => format!("{px}x{px}"),
        }
    }
}

impl TryFrom<u32> for QrSize {
    type Error = String;

    fn try_from(px: u32) -> Result<Self, Self::Error> {
        if px == 0 {
            Err("QR size must be a positive integer".to_owned())
        } else if px > MAX_SIZE {
            Err(format!("QR size {px} exceeds the maximum of {MAX_SIZE}"))
        } else {
            Ok(Self::from_pixels(px))
        }
    }
}

impl From<QrSize> for u32 {
    fn from(size: QrSize) -> Self {
        size.pixels()
    }
}

impl fmt::Display for QrSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.pixels())
    }
}

/// What the user asked to encode, and how.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub text: String,
    #[serde(default)]
    pub size: QrSize,
    #[serde(default = "default_fg_color")]
    pub fg_color: String,
}

fn default_fg_color() -> String {
    DEFAULT_FG_COLOR.to_owned()
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: QrSize::default(),
            fg_color: default_fg_color(),
        }
    }
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, size: QrSize, fg_color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size,
            fg_color: fg_color.into(),
        }
    }

    /// Request for `text` with the form defaults.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.text.trim().is_empty() {
            errors.add(Field::Text, TEXT_REQUIRED);
        }
        match self.size.pixels() {
            0 => errors.add(Field::Size, SIZE_INVALID),
            px if px > MAX_SIZE => errors.add(Field::Size, SIZE_TOO_LARGE),
            _ => {}
        }
        if color::parse_hex(&self.fg_color).is_none() {
            errors.add(Field::FgColor, COLOR_INVALID);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_form() {
        let request = GenerationRequest::default();
        assert_eq!(request.size.pixels(), 250);
        assert_eq!(request.fg_color, "#FFFFFF");
        assert!(request.text.is_empty());
    }

    #[test]
    fn empty_or_blank_text_is_rejected() {
        for text in ["", "   ", "\n\t"] {
            let errors = GenerationRequest::text(text).validate().unwrap_err();
            assert_eq!(errors.get(Field::Text), Some(TEXT_REQUIRED));
        }
    }

    #[test]
    fn bad_color_and_zero_size_are_reported_together() {
        let request = GenerationRequest::new("hello", QrSize::Custom(0), "white");
        let errors = request.validate().unwrap_err();

        assert_eq!(errors.get(Field::Size), Some(SIZE_INVALID));
        assert_eq!(errors.get(Field::FgColor), Some(COLOR_INVALID));
        assert_eq!(errors.get(Field::Text), None);
    }

    #[test]
    fn valid_request_passes() {
        let request = GenerationRequest::new("https://example.com", QrSize::Small, "#123456");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn size_serializes_as_bare_pixels() {
        let request = GenerationRequest::new("x", QrSize::Large, "#000000");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "x", "size": 350, "fgColor": "#000000" })
        );
    }

    #[test]
    fn unknown_sizes_survive_a_round_trip_but_zero_does_not() {
        let size: QrSize = serde_json::from_str("512").unwrap();
        assert_eq!(size, QrSize::Custom(512));
        assert_eq!(serde_json::to_string(&size).unwrap(), "512");

        assert!(serde_json::from_str::<QrSize>("0").is_err());
        assert_eq!(serde_json::from_str::<QrSize>("150").unwrap(), QrSize::Small);
    }

    #[test]
    fn sizes_beyond_the_maximum_are_rejected() {
        assert_eq!(
            serde_json::from_str::<QrSize>("4096").unwrap(),
            QrSize::Custom(MAX_SIZE)
        );
        assert!(serde_json::from_str::<QrSize>("4097").is_err());
        assert!(serde_json::from_str::<QrSize>("4294967295").is_err());

        let request = GenerationRequest::new("hello", QrSize::Custom(1_000_000), "#000000");
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.get(Field::Size), Some(SIZE_TOO_LARGE));
    }

    #[test]
    fn size_labels() {
        assert_eq!(QrSize::Small.label(), "Small (150x150)");
        assert_eq!(QrSize::Medium.label(), "Medium (250x250)");
        assert_eq!(QrSize::Large.label(), "Large (350x350)");
        assert_eq!(QrSize::Custom(99).to_string(), "99px");
    }
}
