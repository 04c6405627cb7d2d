//! File-level round-trip tests for the conf codec.

use tellstick_conf::{read_config, write_config, Device};

fn sample_devices() -> Vec<Device> {
    let mut lamp = Device::new(1, "Lamp", "arctech");
    lamp.model = "selflearning".to_string();
    lamp.parameters.set("house", "A");
    lamp.parameters.set("code", "1");

    let mut dimmer = Device::new(2, "Dimmer", "everflourish");
    dimmer.parameters.set("unit", "3");
    dimmer.parameters.set("fade", "true");

    vec![lamp, dimmer, Device::new(3, "Bare", "risingsun")]
}

#[test]
fn read_of_missing_file_returns_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tellstick.conf");
    let devices = read_config(&path).unwrap();
    assert!(devices.is_empty());
}

#[test]
fn write_then_read_preserves_devices() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tellstick.conf");

    let devices = sample_devices();
    write_config(&devices, &path).unwrap();
    let reread = read_config(&path).unwrap();

    assert_eq!(reread, devices);
    let normalized: Vec<_> = reread.iter().map(Device::normalized).collect();
    let expected: Vec<_> = devices.iter().map(Device::normalized).collect();
    assert_eq!(normalized, expected);
}

#[test]
fn write_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tellstick.conf");

    write_config(&sample_devices(), &path).unwrap();
    write_config(&[Device::new(42, "Only", "arctech")], &path).unwrap();

    let reread = read_config(&path).unwrap();
    assert_eq!(reread.len(), 1);
    assert_eq!(reread[0].id, 42);
}

#[test]
fn uppercase_protocol_survives_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tellstick.conf");

    write_config(&[Device::new(1, "Lamp", "ARCTECH")], &path).unwrap();
    let reread = read_config(&path).unwrap();
    // Case preserved on disk, erased only in the normalized projection
    assert_eq!(reread[0].protocol, "ARCTECH");
    assert_eq!(reread[0].normalized().protocol, "arctech");
}
