use std::error::Error;
use std::fmt;
use serde::Serialize;

/// Stage of the load or prediction pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Weights could not be fetched or placed on the device
    Load,
    /// Chat template rendering failed
    Template,
    /// Image and prompt could not be turned into model inputs
    Encoding,
    /// Inputs could not be moved to the compute device
    Device,
    /// The generation call failed
    Generation,
    /// Generated tokens could not be turned back into text
    Decoding,
    /// The backend panicked
    Panic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::Load => "load",
            ErrorKind::Template => "template",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Device => "device",
            ErrorKind::Generation => "generation",
            ErrorKind::Decoding => "decoding",
            ErrorKind::Panic => "panic",
        };
        write!(f, "{}", name)
    }
}

/// Error raised by a model backend.
///
/// `Display` prints only the message so the legacy `Error: <message>` string
/// stays identical to what the backend reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    kind: ErrorKind,
    message: String,
}

impl ModelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Load, message)
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Template, message)
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encoding, message)
    }

    pub fn device(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Device, message)
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generation, message)
    }

    pub fn decoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decoding, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ModelError {}
