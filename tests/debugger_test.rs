//! Integration tests for the debugger-wait hook as seen through dispatch.

use std::sync::Arc;
use std::time::Duration;

use clihost::application::debugger::WaitState;
use clihost::application::{
    AppInfo, CommandDispatcher, CommandRegistry, WaitForDebuggerInterceptor,
};
use clihost::commands::register_commands;
use clihost::domain::CancellationSignal;
use clihost::infrastructure::di::ServiceCollection;
use clihost::util::testing::{init_test_setup, AttachAfterProbe};

fn dispatcher(interceptor: Arc<WaitForDebuggerInterceptor>) -> CommandDispatcher {
    let mut registry = CommandRegistry::new();
    register_commands(&mut registry).unwrap();
    let mut services = ServiceCollection::new();
    services.add_instance(AppInfo::new("testapp", "1.0.0"));
    registry.register_handlers(&mut services);
    CommandDispatcher::new(
        registry,
        Arc::new(services.into_container()),
        interceptor,
        AppInfo::new("testapp", "1.0.0"),
    )
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn given_wait_flag_when_debugger_attaches_after_polls_then_command_runs() {
    init_test_setup();
    // Arrange
    let probe = Arc::new(AttachAfterProbe::new(5));
    let interceptor = Arc::new(WaitForDebuggerInterceptor::with_poll_interval(
        probe.clone(),
        Duration::from_millis(1),
    ));
    let dispatcher = dispatcher(interceptor.clone());

    // Act
    let code = dispatcher
        .run(&args(&["hello", "--wait-for-debugger"]), &CancellationSignal::new())
        .await
        .unwrap();

    // Assert
    assert_eq!(code, 0);
    assert_eq!(probe.probes(), 6);
    assert_eq!(interceptor.state(), WaitState::Released);
}

#[tokio::test]
async fn given_no_wait_flag_when_dispatching_then_probe_untouched() {
    init_test_setup();
    let probe = Arc::new(AttachAfterProbe::new(usize::MAX));
    let interceptor = Arc::new(WaitForDebuggerInterceptor::new(probe.clone()));
    let dispatcher = dispatcher(interceptor.clone());

    let code = dispatcher
        .run(&args(&["hello", "-m", "world"]), &CancellationSignal::new())
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(probe.probes(), 0);
    assert_eq!(interceptor.state(), WaitState::Idle);
}

#[test]
fn given_wait_flag_and_no_debugger_when_dispatching_then_blocks_in_polling() {
    init_test_setup();
    // Arrange: a probe that never reports attached
    let probe = Arc::new(AttachAfterProbe::new(usize::MAX));
    let interceptor = Arc::new(WaitForDebuggerInterceptor::with_poll_interval(
        probe.clone(),
        Duration::from_millis(1),
    ));
    let dispatcher = dispatcher(interceptor.clone());

    // Act: dispatch on a detached thread; it never returns
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _ = rt.block_on(dispatcher.run(&args(&["hello", "-w"]), &CancellationSignal::new()));
    });

    // Assert: still polling well after many intervals
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(interceptor.state(), WaitState::Polling);
    assert!(probe.probes() > 10);
}
