//! # Supervisor Integration Tests
//!
//! The supervisor drives real child processes, so these tests launch real
//! ones: the run entry is a shell that logs its launch and parks in `sleep`,
//! the off entry is a shell one-shot that logs its pass. This makes every
//! lifecycle transition (spawn, kill, off pass) observable from the outside.

use mbit_control::{ControlError, LightSupervisor, PeripheralKind, PeripheralSpec};
use std::path::Path;

/// Spec whose entries append to log files under `dir`.
fn logging_spec(dir: &Path) -> PeripheralSpec {
    let dir = dir.display();
    PeripheralSpec {
        program: "/bin/sh".into(),
        run_args: vec!["-c".into(), format!("echo run >> {dir}/run.log; exec sleep 30")],
        off_args: vec!["-c".into(), format!("echo off >> {dir}/off.log")],
    }
}

/// Spec pointing at a program that cannot exist.
fn broken_spec() -> PeripheralSpec {
    PeripheralSpec {
        program: "/nonexistent/peripheral-binary".into(),
        run_args: vec!["run".into()],
        off_args: vec!["off".into()],
    }
}

fn count_lines(path: &Path) -> usize {
    std::fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

#[test]
fn start_records_a_live_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    assert!(!sup.is_running(PeripheralKind::TrafficLight));
    sup.start(PeripheralKind::TrafficLight).unwrap();
    assert!(sup.is_running(PeripheralKind::TrafficLight));
    assert!(sup.pid(PeripheralKind::TrafficLight).is_some());

    sup.stop_all();
}

#[test]
fn second_start_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    sup.start(PeripheralKind::TrafficLight).unwrap();
    let first_pid = sup.pid(PeripheralKind::TrafficLight).unwrap();
    sup.start(PeripheralKind::TrafficLight).unwrap();

    assert_eq!(sup.pid(PeripheralKind::TrafficLight), Some(first_pid), "pid must not change");
    assert_eq!(count_lines(&dir.path().join("run.log")), 1, "exactly one spawn");

    sup.stop_all();
}

#[test]
fn stop_kills_and_runs_the_off_pass() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    sup.start(PeripheralKind::TrafficLight).unwrap();
    let pid = sup.pid(PeripheralKind::TrafficLight).unwrap();
    sup.stop(PeripheralKind::TrafficLight).unwrap();

    assert!(!sup.is_running(PeripheralKind::TrafficLight));
    assert_eq!(count_lines(&dir.path().join("off.log")), 1, "exactly one off pass");

    // The recorded pid was reaped, so a probe signal must not find it.
    let probe = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None);
    assert!(probe.is_err(), "killed run-loop should no longer exist");
}

#[test]
fn stop_twice_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    sup.start(PeripheralKind::PlatformLight).unwrap();
    sup.stop(PeripheralKind::PlatformLight).unwrap();
    sup.stop(PeripheralKind::PlatformLight).unwrap();

    assert!(!sup.is_running(PeripheralKind::PlatformLight));
    // The second stop found nothing running: no extra off pass.
    assert_eq!(count_lines(&dir.path().join("off.log")), 1);
}

#[test]
fn stop_when_never_started_is_a_safe_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    sup.stop(PeripheralKind::TrafficLight).unwrap();

    assert!(!sup.is_running(PeripheralKind::TrafficLight));
    assert_eq!(count_lines(&dir.path().join("off.log")), 0, "no kill, no off pass");
}

#[test]
fn spawn_failure_is_surfaced_and_nothing_is_recorded() {
    let mut sup = LightSupervisor::new(broken_spec(), broken_spec());

    let err = sup.start(PeripheralKind::TrafficLight);
    assert!(matches!(err, Err(ControlError::PeripheralSpawn { .. })));
    assert!(!sup.is_running(PeripheralKind::TrafficLight));

    // A later stop must still be a clean no-op.
    sup.stop(PeripheralKind::TrafficLight).unwrap();
}

#[test]
fn kinds_are_independent() {
    let traffic_dir = tempfile::tempdir().unwrap();
    let platform_dir = tempfile::tempdir().unwrap();
    let mut sup =
        LightSupervisor::new(logging_spec(platform_dir.path()), logging_spec(traffic_dir.path()));

    sup.start(PeripheralKind::TrafficLight).unwrap();
    assert!(!sup.is_running(PeripheralKind::PlatformLight));

    // Toggling the platform light off must not disturb the traffic light.
    sup.stop(PeripheralKind::PlatformLight).unwrap();
    assert!(sup.is_running(PeripheralKind::TrafficLight));
    assert_eq!(count_lines(&platform_dir.path().join("off.log")), 0);

    sup.stop_all();
    assert!(!sup.is_running(PeripheralKind::TrafficLight));
    assert_eq!(count_lines(&traffic_dir.path().join("off.log")), 1);
}

#[test]
fn toggle_on_off_on_leaves_exactly_one_live_process() {
    let dir = tempfile::tempdir().unwrap();
    let mut sup = LightSupervisor::new(logging_spec(dir.path()), logging_spec(dir.path()));

    sup.start(PeripheralKind::TrafficLight).unwrap();
    sup.stop(PeripheralKind::TrafficLight).unwrap();
    sup.start(PeripheralKind::TrafficLight).unwrap();

    assert!(sup.is_running(PeripheralKind::TrafficLight));
    assert_eq!(count_lines(&dir.path().join("run.log")), 2, "two spawns across the toggles");
    assert_eq!(count_lines(&dir.path().join("off.log")), 1, "one off pass for the one stop");

    sup.stop_all();
}
