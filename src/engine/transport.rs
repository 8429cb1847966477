//! Framed message exchange with the backend engine process.
//!
//! One JSON value per frame, `Content-Length: N` header, blank line, then
//! N bytes of payload. The engine either listens on a TCP socket or is
//! spawned as a child speaking the same framing over stdio.

use crate::debugger::error::Error;
use log::trace;
use serde_json::Value;
use std::ffi::OsStr;
use std::io;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Blocking, strictly request/response message exchange.
pub trait Transport: Send {
    fn read_message(&mut self) -> Result<Value, Error>;
    fn write_message(&mut self, message: &Value) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_message(&mut self) -> Result<Value, Error> {
        (**self).read_message()
    }

    fn write_message(&mut self, message: &Value) -> Result<(), Error> {
        (**self).write_message(message)
    }
}

fn read_frame(reader: &mut impl BufRead) -> Result<Value, Error> {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::Disconnected);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let len = value.trim().parse().map_err(|_| {
                Error::BadFrame(format!("bad Content-Length `{}`", value.trim()))
            })?;
            content_length = Some(len);
        }
    }

    let len =
        content_length.ok_or_else(|| Error::BadFrame("missing Content-Length".to_string()))?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    let message: Value = serde_json::from_slice(&buf)?;
    trace!(target: "engine", "<- {message}");
    Ok(message)
}

fn write_frame(writer: &mut impl Write, message: &Value) -> Result<(), Error> {
    trace!(target: "engine", "-> {message}");

    let payload = serde_json::to_vec(message)?;
    write!(writer, "Content-Length: {}\r\n\r\n", payload.len())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Engine reachable over TCP.
pub struct TcpTransport {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TcpTransport {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(TcpTransport { stream, reader })
    }
}

impl Transport for TcpTransport {
    fn read_message(&mut self) -> Result<Value, Error> {
        read_frame(&mut self.reader)
    }

    fn write_message(&mut self, message: &Value) -> Result<(), Error> {
        write_frame(&mut self.stream, message)
    }
}

/// Engine spawned as a child process, framing over its stdin/stdout. The
/// child's stderr is inherited so its own logging stays visible. Dropping
/// the transport kills the child.
pub struct ChildTransport {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl ChildTransport {
    pub fn spawn(program: impl AsRef<OsStr>, args: &[String]) -> Result<Self, Error> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdout not piped"))?;

        Ok(ChildTransport {
            child,
            stdin,
            reader: BufReader::new(stdout),
        })
    }
}

impl Transport for ChildTransport {
    fn read_message(&mut self) -> Result<Value, Error> {
        read_frame(&mut self.reader)
    }

    fn write_message(&mut self, message: &Value) -> Result<(), Error> {
        write_frame(&mut self.stdin, message)
    }
}

impl Drop for ChildTransport {
    fn drop(&mut self) {
        if self.child.kill().is_ok() {
            let _ = self.child.wait();
        }
    }
}
