use crate::debugger::error::AssemblerError;
use crate::debugger::registers::RegisterFile;
use serde::{Deserialize, Serialize};

/// Classification of the engine's answer to a control command.
///
/// `BuildFailed` is the one variant the engine never sends: it is
/// synthesized locally when a session with a broken build is resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ExecutionMode {
    Running,
    Paused,
    Breakpoint,
    Finished(i32),
    Invalid(String),
    BuildFailed(AssemblerError),
}

impl ExecutionMode {
    /// True for modes after which the session cannot be resumed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionMode::Finished(_) | ExecutionMode::Invalid(_) | ExecutionMode::BuildFailed(_)
        )
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Running => f.write_str("running"),
            ExecutionMode::Paused => f.write_str("paused"),
            ExecutionMode::Breakpoint => f.write_str("breakpoint"),
            ExecutionMode::Finished(code) => write!(f, "finished with code {code}"),
            ExecutionMode::Invalid(msg) => write!(f, "invalid: {msg}"),
            ExecutionMode::BuildFailed(err) => write!(f, "build failed: {err}"),
        }
    }
}

/// Mode plus register snapshot, exactly one per control-command response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub mode: ExecutionMode,
    pub registers: RegisterFile,
}

impl From<ExecutionMode> for ExecutionReport {
    /// Report synthesized on the client side, registers zeroed.
    fn from(mode: ExecutionMode) -> Self {
        ExecutionReport {
            mode,
            registers: RegisterFile::default(),
        }
    }
}
