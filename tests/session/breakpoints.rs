use crate::common::{report_at, table, Call, MockEngine};
use marlin::debugger::{
    AssemblerError, DebugSession, ExecutionMode, ExecutionProfile, LineMarker, RegisterFile,
};
use marlin::engine::proto::AssemblerResult;

#[test]
fn test_resume_translates_lines() {
    let engine = MockEngine::new()
        .with_asm_result(AssemblerResult::Success {
            breakpoints: table(&[(10, 2), (20, 5)]),
        })
        .with_report(report_at(ExecutionMode::Breakpoint, 10));
    let session = DebugSession::new(engine, "main: nop", ExecutionProfile::Assembly);

    let report = session.resume(&[2, 5, 9]).unwrap();

    // Line 9 has no emitted instruction and is silently dropped.
    assert_eq!(
        session.engine().calls(),
        vec![
            Call::ConfigureAsm("main: nop".to_string()),
            Call::Resume(vec![10, 20]),
        ]
    );
    assert_eq!(report.mode, ExecutionMode::Breakpoint);
    assert_eq!(session.line_for_pc(report.registers.pc), Some(2));
}

#[test]
fn test_resume_short_circuits_on_build_failure() {
    let engine = MockEngine::new().with_asm_result(AssemblerResult::Error {
        message: "undefined label FOO".to_string(),
        body: Some("j FOO".to_string()),
        marker: Some(LineMarker { line: 3, offset: 4 }),
    });
    let session = DebugSession::new(engine, "j FOO", ExecutionProfile::Assembly);

    let report = session.resume(&[1]).unwrap();

    assert_eq!(
        report.mode,
        ExecutionMode::BuildFailed(AssemblerError {
            marker: Some(LineMarker { line: 3, offset: 4 }),
            body: Some("j FOO".to_string()),
            message: "undefined label FOO".to_string(),
        })
    );
    assert_eq!(report.registers, RegisterFile::default());
    assert_eq!(session.engine().resume_requests(), 0);

    // Still terminal on the next attempt, still no engine resume.
    let report = session.resume(&[1]).unwrap();
    assert!(matches!(report.mode, ExecutionMode::BuildFailed(_)));
    assert_eq!(session.engine().resume_requests(), 0);
}

#[test]
fn test_set_breakpoints_before_configure_is_noop() {
    let engine = MockEngine::new().with_asm_result(AssemblerResult::Success {
        breakpoints: table(&[(10, 2)]),
    });
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    session.set_breakpoints(&[2]).unwrap();

    // No remote call of any kind, and the session still configures
    // normally afterwards.
    assert!(session.engine().calls().is_empty());
    assert_eq!(session.configure().unwrap(), None);
    assert_eq!(session.engine().configure_requests(), 1);
}

#[test]
fn test_set_breakpoints_after_configure_swaps() {
    let engine = MockEngine::new();
    let profile = ExecutionProfile::Elf {
        image: vec![0x7f, b'E', b'L', b'F'],
        breakpoints: table(&[(100, 1), (104, 2)]),
    };
    let session = DebugSession::new(engine, "", profile);

    assert_eq!(session.configure().unwrap(), None);
    session.set_breakpoints(&[2]).unwrap();

    assert_eq!(
        session.engine().calls(),
        vec![Call::ConfigureElf(4), Call::SwapBreakpoints(vec![104])]
    );
}

#[test]
fn test_resume_without_map_sends_empty_set() {
    let engine = MockEngine::new().with_asm_result(AssemblerResult::Success {
        breakpoints: table(&[]),
    });
    let session = DebugSession::new(engine, "# comments only", ExecutionProfile::Assembly);

    session.resume(&[1, 2, 3]).unwrap();

    assert_eq!(
        session.engine().calls(),
        vec![
            Call::ConfigureAsm("# comments only".to_string()),
            Call::Resume(Vec::new()),
        ]
    );
}
