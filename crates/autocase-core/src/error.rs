use std::path::PathBuf;

use thiserror::Error;

/// Shown when a failure carries no server-provided detail.
pub const GENERIC_FAILURE: &str = "Backend server error.";

/// Why a single analysis attempt failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned {status}")]
    Server { status: u16, detail: Option<String> },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("could not read {}: {message}", path.display())]
    File { path: PathBuf, message: String },
}

impl AnalyzeError {
    /// The message to put in front of the user.
    ///
    /// Server-provided detail is shown verbatim; transport and response
    /// failures collapse to [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            AnalyzeError::File { .. } => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no files selected")]
    NoFiles,

    #[error("an analysis is already in progress")]
    Busy,

    #[error("results are on screen; start another analysis first")]
    NotInUpload,

    #[error("no analysis results to act on")]
    NotInResults,
}
