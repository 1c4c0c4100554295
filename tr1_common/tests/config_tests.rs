//! Hardware configuration file tests.
//!
//! Loads complete files from disk through `ConfigLoader` and checks the
//! validation rules that halt startup.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tr1_common::prelude::*;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("hardware.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/hardware.toml");
    let config = HardwareConfig::load(&path).expect("shipped config parses");
    config.validate().expect("shipped config validates");

    assert_eq!(config.hardware_interface.joints.len(), 7);
    assert_eq!(config.hardware_interface.control_mode, ControlMode::Effort);
    assert_eq!(config.controllers.len(), 3);
}

#[test]
fn test_full_config_round_trip_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[shared]
service_name = "bench-arm"
log_level = "debug"

[hardware_interface]
joints = ["j1", "j2"]
loop_hz = 100.0
control_mode = "position"
driver = "dry_run"

[[controllers]]
type = "position_forward"
name = "j1_pos"
joint = "j1"
command = 0.25
"#,
    );

    let config = HardwareConfig::load(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.hardware_interface.loop_hz, 100.0);
    assert_eq!(config.hardware_interface.control_mode, ControlMode::Position);
    assert_eq!(config.hardware_interface.driver, "dry_run");
    assert_eq!(config.controllers[0].name(), "j1_pos");
    assert_eq!(config.controllers[0].joint(), Some("j1"));
}

#[test]
fn test_empty_joint_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[shared]
service_name = "tr1_hal"

[hardware_interface]
joints = []
"#,
    );

    let config = HardwareConfig::load(&path).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("no joints"));
}

#[test]
fn test_controller_on_unknown_joint_is_rejected() {
    let config = HardwareConfig::from_toml(
        r#"
[shared]
service_name = "tr1_hal"

[hardware_interface]
joints = ["j1"]

[[controllers]]
type = "effort_forward"
name = "ghost"
joint = "j7"
"#,
    )
    .unwrap();

    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_control_mode_is_parse_error() {
    let result = HardwareConfig::from_toml(
        r#"
[shared]
service_name = "tr1_hal"

[hardware_interface]
joints = ["j1"]
control_mode = "impedance"
"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
