//! Wire types of the engine protocol.
//!
//! Every call is a `{seq, command, arguments}` request answered by exactly
//! one `{request_seq, success, body}` response; call-specific payloads ride
//! in `arguments` and `body`.

use crate::debugger::error::LineMarker;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Request envelope.
#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    pub seq: u64,
    pub command: &'a str,
    pub arguments: Value,
}

/// Response envelope. `body` may be absent entirely for calls that return
/// nothing (`stop`, `swap_breakpoints`).
#[derive(Debug, Deserialize)]
pub(crate) struct Response {
    pub request_seq: u64,
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub body: Value,
}

/// Outcome of assembling source text, `configure_asm`'s body.
///
/// The status tag is closed: any other value is a contract violation and
/// fails the parse rather than being swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum AssemblerResult {
    Success {
        /// pc → source line, the raw material of the breakpoint map.
        breakpoints: HashMap<u32, u32>,
    },
    Error {
        message: String,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        marker: Option<LineMarker>,
    },
}

/// `disassemble`'s body: a printable listing plus the pc → line table for
/// an ELF image. Upstream of a debug session - profiles for binaries are
/// built from this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisassembleResult {
    #[serde(default)]
    pub error: Option<String>,
    pub lines: Vec<String>,
    pub breakpoints: HashMap<u32, u32>,
}
