//! Error taxonomy shared by the controller, the renderer and the backends.

use std::fmt;

use thiserror::Error;

/// A form field that can carry an inline validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Text,
    Size,
    FgColor,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Size => write!(f, "size"),
            Self::FgColor => write!(f, "fgColor"),
        }
    }
}

/// Field-level validation failures for a generation request.
///
/// Surfaced inline next to the offending field. The renderer is never invoked
/// for a request that fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: &'static str) {
        self.errors.push((field, message));
    }

    /// Returns the message attached to `field`, if any.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.iter().map(|(f, _)| *f)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request")?;
        for (i, (field, message)) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The QR renderer rejected the text/options combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("data is too long to be stored in a QR code")]
    DataTooLong,
    #[error("QR code needs {required} modules but only {size} pixels are available")]
    TooDense { required: usize, size: u32 },
    #[error("{size}x{size} pixels is larger than the {max}x{max} limit")]
    TooLarge { size: u32, max: u32 },
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("failed to encode QR code: {0}")]
    Encode(String),
}

impl From<qrcode::types::QrError> for RenderError {
    fn from(err: qrcode::types::QrError) -> Self {
        match err {
            qrcode::types::QrError::DataTooLong => Self::DataTooLong,
            other => Self::Encode(other.to_string()),
        }
    }
}

/// Durable store failures. Always recoverable: the caller keeps working in memory.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read stored history: {0}")]
    Read(String),
    #[error("stored history is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("failed to write history: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("browser refused the download: {0}")]
    Browser(String),
}

/// Failure of a generation attempt.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(ValidationErrors),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("a QR code is already being generated")]
    Busy,
}

impl GenerateError {
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_lookup_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Text, "Please enter a valid URL or text.");

        assert_eq!(errors.get(Field::Text), Some("Please enter a valid URL or text."));
        assert_eq!(errors.get(Field::FgColor), None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn validation_errors_display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Text, "missing");
        errors.add(Field::FgColor, "bad");

        assert_eq!(errors.to_string(), "invalid request: text: missing; fgColor: bad");
    }

    #[test]
    fn qr_data_too_long_maps_to_render_error() {
        let err: RenderError = qrcode::types::QrError::DataTooLong.into();
        assert_eq!(err, RenderError::DataTooLong);
    }
}
