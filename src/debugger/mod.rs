//! Debug session state machine.
//!
//! One [`DebugSession`] per debugging attempt: it configures the remote
//! engine lazily (exactly once), translates the user's line breakpoints
//! into machine addresses and classifies every engine response into an
//! [`ExecutionMode`]. After `stop` the session is discarded; editing the
//! source or rebuilding requires a fresh session.

pub mod breakpoint;
pub mod error;
pub mod mode;
pub mod profile;
pub mod registers;

pub use breakpoint::BreakpointMap;
pub use error::{AssemblerError, Error, LineMarker};
pub use mode::{ExecutionMode, ExecutionReport};
pub use profile::ExecutionProfile;
pub use registers::RegisterFile;

use crate::engine::proto::AssemblerResult;
use crate::engine::Engine;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Execution controller for one debug session.
///
/// All commands take `&self`: the session is safe to share between a thread
/// driving execution and readers consulting the breakpoint map. Commands
/// are still expected to be issued sequentially - the session does not
/// queue or reorder concurrent control commands, only the configuration
/// handshake is guarded against duplication.
pub struct DebugSession<E> {
    engine: E,
    text: String,
    profile: ExecutionProfile,
    breakpoints: OnceLock<BreakpointMap>,
    configured: AtomicBool,
    build_error: OnceLock<AssemblerError>,
}

impl<E: Engine> DebugSession<E> {
    /// An ELF profile carries its breakpoint table from disassembly time,
    /// so the map exists before the engine was ever contacted. Assembly
    /// profiles get theirs from the `configure` handshake.
    pub fn new(engine: E, text: impl Into<String>, profile: ExecutionProfile) -> Self {
        let breakpoints = OnceLock::new();
        if let ExecutionProfile::Elf {
            breakpoints: table, ..
        } = &profile
        {
            let _ = breakpoints.set(BreakpointMap::new(table));
        }

        DebugSession {
            engine,
            text: text.into(),
            profile,
            breakpoints,
            configured: AtomicBool::new(false),
            build_error: OnceLock::new(),
        }
    }

    /// One-time handshake sending the source (or binary image) to the
    /// engine. Idempotent and safe to call defensively before any control
    /// command: repeat calls return the recorded outcome without touching
    /// the engine.
    ///
    /// The `configured` flag is taken *before* the remote call is issued,
    /// so a second caller racing the in-flight handshake observes it and
    /// does not send a duplicate configuration request. A caller that loses
    /// the race may see `None` while the winning call is still running;
    /// the session-level guarantee is only that at most one configuration
    /// request ever reaches the engine.
    ///
    /// Returns `None` on success, the assembler diagnostic on a build
    /// failure. Transport loss and protocol violations surface as [`Error`]
    /// and leave the session unusable.
    pub fn configure(&self) -> Result<Option<AssemblerError>, Error> {
        if self.configured.swap(true, Ordering::AcqRel) {
            return Ok(self.build_error.get().cloned());
        }

        match &self.profile {
            ExecutionProfile::Elf { image, .. } => {
                debug!(target: "session", "configuring ELF image, {} bytes", image.len());

                if self.engine.configure_elf(image)? {
                    Ok(None)
                } else {
                    Ok(Some(self.record_failure(AssemblerError::invalid_elf())))
                }
            }

            ExecutionProfile::Assembly => {
                debug!(target: "session", "assembling {} bytes of source", self.text.len());

                match self.engine.configure_asm(&self.text)? {
                    AssemblerResult::Success { breakpoints } => {
                        let map = BreakpointMap::new(&breakpoints);
                        info!(target: "session", "configured, {} breakpointable lines", map.len());
                        let _ = self.breakpoints.set(map);
                        Ok(None)
                    }

                    AssemblerResult::Error {
                        message,
                        body,
                        marker,
                    } => Ok(Some(self.record_failure(AssemblerError {
                        marker,
                        body,
                        message,
                    }))),
                }
            }
        }
    }

    fn record_failure(&self, err: AssemblerError) -> AssemblerError {
        warn!(target: "session", "configuration failed: {err}");
        let _ = self.build_error.set(err.clone());
        err
    }

    /// Start or continue execution with breakpoints on the given source
    /// lines. Configures first if needed; a session whose build failed
    /// reports [`ExecutionMode::BuildFailed`] without ever asking the
    /// engine to run.
    pub fn resume(&self, lines: &[u32]) -> Result<ExecutionReport, Error> {
        if let Some(err) = self.configure()? {
            return Ok(ExecutionMode::BuildFailed(err).into());
        }

        self.engine.resume(&self.translate(lines))
    }

    /// Replace the breakpoint set of a session the engine is already
    /// running. Before the first `resume` this is a no-op: the pending set
    /// rides along with the resume request anyway, and the engine's
    /// start/update operations are distinct remote calls with different
    /// preconditions.
    pub fn set_breakpoints(&self, lines: &[u32]) -> Result<(), Error> {
        if !self.configured.load(Ordering::Acquire) {
            return Ok(());
        }

        self.engine.swap_breakpoints(&self.translate(lines))
    }

    /// Passthrough. Calling this before `resume` is a caller error, the
    /// engine is expected to reject it.
    pub fn pause(&self) -> Result<ExecutionReport, Error> {
        self.engine.pause()
    }

    /// Passthrough, see [`DebugSession::pause`].
    pub fn step(&self) -> Result<ExecutionReport, Error> {
        self.engine.step()
    }

    /// Tear down execution on the engine side. The session stays marked
    /// configured - debugging again requires a fresh session.
    pub fn stop(&self) -> Result<(), Error> {
        self.engine.stop()
    }

    /// Read `count` bytes starting at `address`. Unmapped bytes come back
    /// as `None` entries; a rejected read (invalid start address) is `None`
    /// as a whole.
    pub fn memory_at(&self, address: u32, count: u32) -> Result<Option<Vec<Option<u8>>>, Error> {
        self.engine.read_bytes(address, count)
    }

    /// Source line for a reported program counter, for stop-location
    /// highlighting. `None` until the session has a breakpoint map.
    pub fn line_for_pc(&self, pc: u32) -> Option<u32> {
        self.breakpoints.get().and_then(|map| map.line_for_pc(pc))
    }

    /// The line↔address map, once one exists.
    pub fn breakpoint_map(&self) -> Option<&BreakpointMap> {
        self.breakpoints.get()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn translate(&self, lines: &[u32]) -> Vec<u32> {
        self.breakpoints
            .get()
            .map(|map| map.translate_lines(lines))
            .unwrap_or_default()
    }
}
