use crate::common::{report_at, table, Call, MockEngine};
use marlin::debugger::{DebugSession, ExecutionMode, ExecutionProfile};
use marlin::engine::proto::AssemblerResult;

#[test]
fn test_pause_and_step_are_passthroughs() {
    let engine = MockEngine::new().with_report(report_at(ExecutionMode::Paused, 0x40_0000));
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    let paused = session.pause().unwrap();
    let stepped = session.step().unwrap();

    assert_eq!(paused.mode, ExecutionMode::Paused);
    assert_eq!(stepped.registers.pc, 0x40_0000);

    // Neither implicitly configures the session.
    assert_eq!(session.engine().calls(), vec![Call::Pause, Call::Step]);
    assert_eq!(session.engine().configure_requests(), 0);
}

#[test]
fn test_stop_is_passthrough() {
    let engine = MockEngine::new();
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    session.stop().unwrap();

    assert_eq!(session.engine().calls(), vec![Call::Stop]);
}

#[test]
fn test_memory_read_passthrough() {
    let engine = MockEngine::new().with_memory(Some(vec![Some(0xde), None, Some(0xad)]));
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    let bytes = session.memory_at(0x1000_0000, 3).unwrap();

    assert_eq!(bytes, Some(vec![Some(0xde), None, Some(0xad)]));
    assert_eq!(
        session.engine().calls(),
        vec![Call::ReadBytes(0x1000_0000, 3)]
    );
}

#[test]
fn test_memory_read_rejected() {
    let engine = MockEngine::new().with_memory(None);
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    assert_eq!(session.memory_at(3, 16).unwrap(), None);
}

#[test]
fn test_finished_report_carries_exit_code() {
    let engine = MockEngine::new()
        .with_asm_result(AssemblerResult::Success {
            breakpoints: table(&[(10, 2)]),
        })
        .with_report(report_at(ExecutionMode::Finished(3), 0x40_0010));
    let session = DebugSession::new(engine, "nop", ExecutionProfile::Assembly);

    let report = session.resume(&[]).unwrap();

    assert_eq!(report.mode, ExecutionMode::Finished(3));
    assert!(report.mode.is_terminal());
}
