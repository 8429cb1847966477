//! Marlin is the control layer of a MIPS debugger frontend: it owns the
//! debug session state machine, translates source-line breakpoints into
//! machine addresses and drives a remote execution engine over a framed
//! JSON protocol. The engine itself (assembler, disassembler, CPU) runs in
//! a separate backend process and is reached only through [`engine::Engine`].

pub mod debugger;
pub mod engine;
