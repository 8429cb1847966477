use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fatal error taxonomy of the control layer.
///
/// Expected failures never show up here: assembler diagnostics travel as
/// [`AssemblerError`] values, runtime faults as
/// [`ExecutionMode::Invalid`](super::ExecutionMode::Invalid) and rejected
/// memory reads as `None`. Everything below means the session is broken,
/// either because the backend is gone or because it violated the protocol
/// contract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- transport errors ------------------------------------------
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("engine connection closed")]
    Disconnected,
    #[error("malformed frame from engine: {0}")]
    BadFrame(String),
    #[error("malformed message from engine: {0}")]
    Malformed(#[from] serde_json::Error),

    // --------------------------------- protocol contract violations ------------------------------
    #[error("unexpected `{command}` response shape: {body}")]
    UnexpectedResponse {
        command: &'static str,
        body: Value,
    },
    #[error("engine rejected `{command}`: {message}")]
    EngineFailure {
        command: &'static str,
        message: String,
    },
}

impl Error {
    /// Return a hint to an interface - a contract violation is a programming
    /// error and must abort the session loudly, a lost backend can be
    /// surfaced and the session discarded.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Io(_) => false,
            Error::Disconnected => false,

            Error::BadFrame(_) => true,
            Error::Malformed(_) => true,
            Error::UnexpectedResponse { .. } => true,
            Error::EngineFailure { .. } => true,
        }
    }
}

/// Position of an assembler diagnostic inside the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMarker {
    pub line: u32,
    pub offset: u32,
}

/// Diagnostic produced when configuring a session fails.
///
/// Assembly profiles carry the engine's structured diagnostic verbatim;
/// rejected ELF images only get a generic message (no line information is
/// available for a binary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct AssemblerError {
    pub marker: Option<LineMarker>,
    pub body: Option<String>,
    pub message: String,
}

impl AssemblerError {
    /// Generic diagnostic for a binary the engine refused to load.
    pub fn invalid_elf() -> Self {
        AssemblerError {
            marker: None,
            body: None,
            message: "configured ELF was not valid".to_string(),
        }
    }
}
