use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the toolshed library.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Invalid option values supplied to one of the tools.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// Image decoding or encoding failure.
    #[error("Image error for '{path}': {message}")]
    Image {
        /// Image file involved
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// No usable font could be found on the system.
    #[error("Font error: {message}")]
    Font {
        /// Error message
        message: String,
    },

    /// Data could not be encoded as a QR symbol.
    #[error("QR encoding failed: {message}")]
    QrEncode {
        /// Error message
        message: String,
    },

    /// A planned rename would overwrite an existing or planned entry.
    #[error("Rename collision: '{from}' -> '{to}' (target already exists)")]
    RenameCollision {
        /// Source name
        from: String,
        /// Colliding target name
        to: String,
    },

    /// PLCopen XML could not be parsed.
    #[error("Failed to parse XML '{path}': {message}")]
    Xml {
        /// XML file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// No PLCopen XML export was found during discovery.
    #[error("No .xml file found under '{path}'. Export the project to PLCopen XML first.")]
    NoXmlFound {
        /// Directory that was searched
        path: PathBuf,
    },

    /// CSV writing failure.
    #[error("CSV error for '{path}': {message}")]
    Csv {
        /// Output file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// System time error.
    #[error("System time error: {message}")]
    SystemTime {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an image error with path context.
    #[must_use]
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a font error.
    #[must_use]
    pub fn font(message: impl Into<String>) -> Self {
        Self::Font {
            message: message.into(),
        }
    }

    /// Creates an XML parse error with path context.
    #[must_use]
    pub fn xml(path: impl Into<PathBuf>, source: roxmltree::Error) -> Self {
        Self::Xml {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a CSV error with path context.
    #[must_use]
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Self::QrEncode {
            message: format!("{e:?}"),
        }
    }
}

impl From<std::time::SystemTimeError> for Error {
    fn from(e: std::time::SystemTimeError) -> Self {
        Self::SystemTime {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_collision_message() {
        let err = Error::RenameCollision {
            from: "a.txt".to_string(),
            to: "b.txt".to_string(),
        };
        assert!(err.to_string().contains("a.txt"));
        assert!(err.to_string().contains("b.txt"));
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }
}
