//! Interface to the backend execution engine.
//!
//! [`Engine`] is the typed surface of the remote calls; [`RemoteEngine`]
//! implements it over a framed JSON transport. The debug session is
//! generic over the trait so the state machine can be exercised against a
//! scripted engine in tests.

pub mod proto;
pub mod transport;

use crate::debugger::error::Error;
use crate::debugger::mode::ExecutionReport;
use log::debug;
use proto::{AssemblerResult, DisassembleResult, Request, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};
use transport::Transport;

/// The remote calls this layer depends on, one method per engine command.
///
/// Expected failures are part of the return types (assembler diagnostics,
/// boolean ELF validity, `None` memory reads); [`Error`] covers transport
/// loss and contract violations only.
pub trait Engine {
    fn configure_asm(&self, text: &str) -> Result<AssemblerResult, Error>;
    fn configure_elf(&self, image: &[u8]) -> Result<bool, Error>;
    fn resume(&self, breakpoints: &[u32]) -> Result<ExecutionReport, Error>;
    fn pause(&self) -> Result<ExecutionReport, Error>;
    fn step(&self) -> Result<ExecutionReport, Error>;
    fn stop(&self) -> Result<(), Error>;
    fn swap_breakpoints(&self, breakpoints: &[u32]) -> Result<(), Error>;
    fn read_bytes(&self, address: u32, count: u32) -> Result<Option<Vec<Option<u8>>>, Error>;
    fn disassemble(&self, named: &str, image: &[u8]) -> Result<DisassembleResult, Error>;
}

struct Wire<T> {
    transport: T,
    next_seq: u64,
}

/// Engine client over a framed transport.
///
/// The transport and sequence counter sit behind one mutex, so a single
/// handle can serve a session shared between threads; calls are strictly
/// serialized, one request and one response at a time.
pub struct RemoteEngine<T> {
    wire: Mutex<Wire<T>>,
}

impl<T: Transport> RemoteEngine<T> {
    pub fn new(transport: T) -> Self {
        RemoteEngine {
            wire: Mutex::new(Wire {
                transport,
                next_seq: 1,
            }),
        }
    }

    fn call<R: DeserializeOwned>(
        &self,
        command: &'static str,
        arguments: Value,
    ) -> Result<R, Error> {
        let mut wire = self.wire.lock().unwrap_or_else(PoisonError::into_inner);

        let seq = wire.next_seq;
        wire.next_seq += 1;

        debug!(target: "engine", "-> {command} (seq {seq})");
        let request = serde_json::to_value(Request {
            seq,
            command,
            arguments,
        })?;
        wire.transport.write_message(&request)?;
        let reply = wire.transport.read_message()?;
        drop(wire);

        let envelope: Response = serde_json::from_value(reply.clone()).map_err(|_| {
            Error::UnexpectedResponse {
                command,
                body: reply.clone(),
            }
        })?;

        if envelope.request_seq != seq {
            return Err(Error::UnexpectedResponse {
                command,
                body: reply,
            });
        }

        if !envelope.success {
            return Err(Error::EngineFailure {
                command,
                message: envelope
                    .message
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        serde_json::from_value(envelope.body.clone()).map_err(|_| Error::UnexpectedResponse {
            command,
            body: envelope.body,
        })
    }
}

impl<T: Transport> Engine for RemoteEngine<T> {
    fn configure_asm(&self, text: &str) -> Result<AssemblerResult, Error> {
        self.call("configure_asm", json!({ "text": text }))
    }

    fn configure_elf(&self, image: &[u8]) -> Result<bool, Error> {
        self.call("configure_elf", json!({ "bytes": image }))
    }

    fn resume(&self, breakpoints: &[u32]) -> Result<ExecutionReport, Error> {
        self.call("resume", json!({ "breakpoints": breakpoints }))
    }

    fn pause(&self) -> Result<ExecutionReport, Error> {
        self.call("pause", Value::Null)
    }

    fn step(&self) -> Result<ExecutionReport, Error> {
        self.call("step", Value::Null)
    }

    fn stop(&self) -> Result<(), Error> {
        self.call("stop", Value::Null)
    }

    fn swap_breakpoints(&self, breakpoints: &[u32]) -> Result<(), Error> {
        self.call("swap_breakpoints", json!({ "breakpoints": breakpoints }))
    }

    fn read_bytes(&self, address: u32, count: u32) -> Result<Option<Vec<Option<u8>>>, Error> {
        self.call("read_bytes", json!({ "address": address, "count": count }))
    }

    fn disassemble(&self, named: &str, image: &[u8]) -> Result<DisassembleResult, Error> {
        self.call("disassemble", json!({ "named": named, "bytes": image }))
    }
}
