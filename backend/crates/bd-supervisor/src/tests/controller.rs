use crate::tests::{
    CRASHING_SERVER, FAKE_SERVER, fast_timing, install_server, layout_in, recorded_commands,
};
use crate::{ControllerState, ProcessController, ShutdownRequest, ShutdownTiming, SupervisorError};

use std::time::{Duration, Instant};

use bd_config::ShutdownConfig;
use googletest::assert_that;
use googletest::prelude::{eq, none, some};
use serial_test::serial;
use tempfile::TempDir;

fn controller(temp: &TempDir) -> ProcessController {
    ProcessController::new(layout_in(temp.path()), fast_timing())
}

fn countdown_lines(commands: &[String]) -> usize {
    commands
        .iter()
        .filter(|c| c.starts_with("say shutting down in "))
        .count()
}

// =========================================================================
// Launch
// =========================================================================

#[test]
#[serial]
fn given_installed_server_when_launching_then_running_with_pid() {
    // Given
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    controller.activate(None).unwrap();

    // When
    let pid = controller.launch().unwrap();

    // Then
    assert_that!(controller.state(), eq(ControllerState::Running { pid }));
    assert_that!(controller.pid(), some(eq(pid)));

    controller.immediate_stop().unwrap();
}

#[test]
#[serial]
fn given_missing_binary_when_launching_then_process_error() {
    // Given
    let temp = TempDir::new().unwrap();
    let mut controller = controller(&temp);

    // When
    let result = controller.launch();

    // Then
    assert!(matches!(result, Err(SupervisorError::Process { .. })));
    assert_that!(controller.pid(), none());
}

#[test]
#[serial]
fn given_running_server_when_launching_again_then_rejected() {
    // Given
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    controller.launch().unwrap();

    // When
    let result = controller.launch();

    // Then
    assert!(result.is_err());

    controller.immediate_stop().unwrap();
}

#[test]
#[serial]
fn given_running_server_when_sending_command_then_server_receives_line() {
    // Given
    let temp = TempDir::new().unwrap();
    let dir = install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    controller.launch().unwrap();

    // When
    controller.send_command("list").unwrap();
    controller.immediate_stop().unwrap();

    // Then
    let commands = recorded_commands(&dir);
    assert_that!(commands.first().map(String::as_str), some(eq("list")));
}

// =========================================================================
// Stop sequences
// =========================================================================

#[test]
#[serial]
fn given_running_server_when_graceful_stop_then_countdown_final_warning_and_stop() {
    // Given
    let temp = TempDir::new().unwrap();
    let dir = install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    controller.launch().unwrap();

    // When
    controller.graceful_stop().unwrap();

    // Then
    let commands = recorded_commands(&dir);
    assert_that!(countdown_lines(&commands), eq(6));
    assert_that!(commands.len(), eq(8));
    assert_that!(commands[6].as_str(), eq("say shutting down NOW..."));
    assert_that!(commands[7].as_str(), eq("stop"));
    assert_that!(controller.state(), eq(ControllerState::Stopped));
    assert_that!(controller.pid(), none());
}

#[test]
#[serial]
fn given_running_server_when_immediate_stop_then_single_warning_and_stop() {
    // Given
    let temp = TempDir::new().unwrap();
    let dir = install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    controller.launch().unwrap();

    // When
    controller.stop(ShutdownRequest::Immediate).unwrap();

    // Then
    let commands = recorded_commands(&dir);
    assert_that!(
        commands,
        eq(&vec![
            "say shutting down NOW...".to_string(),
            "stop".to_string()
        ])
    );
    assert_that!(controller.state(), eq(ControllerState::Stopped));
}

#[test]
#[serial]
fn given_stop_when_returning_then_child_has_exited() {
    // Given
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    let pid = controller.launch().unwrap();

    // When
    controller.immediate_stop().unwrap();

    // Then
    let liveness = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None);
    assert!(liveness.is_err());
}

#[test]
fn given_no_server_when_stopping_then_noop_and_stopped() {
    // Given
    let temp = TempDir::new().unwrap();
    let mut controller = controller(&temp);

    // When
    let result = controller.stop(ShutdownRequest::Graceful);

    // Then
    assert!(result.is_ok());
    assert_that!(controller.state(), eq(ControllerState::Stopped));
}

#[test]
#[serial]
fn given_server_that_crashes_when_polling_then_exit_reported() {
    // Given
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), CRASHING_SERVER);
    let mut controller = controller(&temp);
    controller.launch().unwrap();

    // When
    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = controller.poll_exit().unwrap() {
            break status;
        }
        assert!(Instant::now() < deadline, "server never exited");
        std::thread::sleep(Duration::from_millis(20));
    };

    // Then
    assert_that!(status.code(), some(eq(3)));
    assert_that!(controller.state(), eq(ControllerState::Stopped));
    assert_that!(controller.pid(), none());
}

// =========================================================================
// State and timing
// =========================================================================

#[test]
#[serial]
fn given_subscriber_when_lifecycle_runs_then_observes_latest_state() {
    // Given
    let temp = TempDir::new().unwrap();
    install_server(temp.path(), FAKE_SERVER);
    let mut controller = controller(&temp);
    let rx = controller.subscribe();
    assert_that!(*rx.borrow(), eq(ControllerState::Uninitialized));

    // When
    controller.activate(None).unwrap();
    let activating = *rx.borrow();
    controller.launch().unwrap();
    let running = *rx.borrow();
    controller.immediate_stop().unwrap();

    // Then
    assert_that!(activating, eq(ControllerState::Activating));
    assert!(running.has_process());
    assert_that!(*rx.borrow(), eq(ControllerState::Stopped));
}

#[test]
fn given_default_config_when_building_timing_then_thirty_second_countdown() {
    // Given
    let config = ShutdownConfig::default();

    // When
    let timing = ShutdownTiming::from(&config);

    // Then
    assert_that!(timing.countdown_steps, eq(6));
    assert_that!(timing.announced_secs(6), eq(30));
    assert_that!(timing.announced_secs(1), eq(5));
    assert_that!(timing.grace, eq(Duration::from_secs(5)));
}
