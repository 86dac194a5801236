//! End-to-end session tests against the simulator backend.
//!
//! These drive the public `Cryostat` API exactly as an experiment script
//! would, with the mock standing in for the vendor DLL. Fault injection
//! goes through the same status-translation path as real hardware codes.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use attodry::{
    status, Cryostat, Error, LoggingInterval, MockCryostat, SetupVersion, MESSAGE_LEN,
};

fn session() -> (Cryostat, Arc<MockCryostat>) {
    let mock = Arc::new(MockCryostat::new());
    (Cryostat::with_mock(mock.clone()), mock)
}

#[test]
fn example_flow_runs_end_to_end() {
    let (cryostat, mock) = session();

    cryostat.begin(SetupVersion::AttoDry2100).unwrap();
    assert_eq!(mock.began_with(), Some(1));

    cryostat.connect("COM4").unwrap();
    cryostat
        .wait_until_initialised(Duration::from_secs(1))
        .unwrap();
    assert!(cryostat.is_device_connected().unwrap());
    assert!(cryostat.is_device_initialised().unwrap());

    // room temperature, no field
    assert_eq!(cryostat.magnetic_field().unwrap(), 0.0);
    assert_eq!(cryostat.sample_temperature().unwrap(), 295.0);

    cryostat.set_user_magnetic_field(0.01).unwrap();
    cryostat.set_user_temperature(1.9).unwrap();
    assert_eq!(cryostat.magnetic_field_set_point().unwrap(), 0.01);
    assert_eq!(cryostat.user_temperature().unwrap(), 1.9);

    cryostat.toggle_magnetic_field_control().unwrap();
    cryostat.toggle_full_temperature_control().unwrap();
    assert!(cryostat.is_controlling_field().unwrap());
    assert!(cryostat.is_controlling_temperature().unwrap());

    cryostat.shutdown().unwrap();
    assert!(!cryostat.is_device_connected().unwrap());
    assert_eq!(mock.began_with(), None);
}

#[test]
fn injected_fault_surfaces_the_exact_table_message() {
    let (cryostat, mock) = session();
    mock.fail_next(37);
    let err = cryostat.toggle_magnetic_field_control().unwrap_err();
    assert_eq!(
        err.to_string(),
        status::fault_message(37).unwrap(),
        "fault text must match the table verbatim"
    );
}

#[test]
fn injected_negative_code_reports_operation_and_arguments() {
    let (cryostat, mock) = session();
    mock.fail_next(-1);
    let err = cryostat.set_user_temperature(4.2).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("setUserTemperature"), "{text}");
    assert!(text.contains("4.2"), "{text}");
}

#[test]
fn injected_unknown_code_reports_the_raw_code() {
    let (cryostat, mock) = session();
    mock.fail_next(999);
    let err = cryostat.toggle_pump().unwrap_err();
    assert!(matches!(err, Error::UnknownCode { code: 999 }));
}

#[test]
fn toggles_flip_valve_state() {
    let (cryostat, _mock) = session();
    assert!(!cryostat.helium_valve().unwrap());
    cryostat.toggle_helium_valve().unwrap();
    assert!(cryostat.helium_valve().unwrap());
    cryostat.toggle_helium_valve().unwrap();
    assert!(!cryostat.helium_valve().unwrap());

    cryostat.toggle_sample_space_800_valve().unwrap();
    assert!(cryostat.sample_space_800_valve().unwrap());
}

#[test]
fn procedures_latch_their_progress_flags() {
    let (cryostat, _mock) = session();
    cryostat.go_to_base_temperature().unwrap();
    assert!(cryostat.is_going_to_base_temperature().unwrap());

    cryostat.set_user_magnetic_field(2.0).unwrap();
    cryostat.sweep_field_to_zero().unwrap();
    assert!(cryostat.is_zeroing_field().unwrap());
    assert_eq!(cryostat.magnetic_field_set_point().unwrap(), 0.0);
}

#[test]
fn logging_start_and_stop() {
    let (cryostat, mock) = session();
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cooldown.log");

    cryostat
        .start_logging(&log_path, LoggingInterval::FiveSeconds, true)
        .unwrap();
    let (path, interval, append) = mock.logging_target().unwrap();
    assert_eq!(Path::new(&path), log_path);
    assert_eq!(interval, 1);
    assert!(append);

    cryostat.stop_logging().unwrap();
    assert!(mock.logging_target().is_none());
}

#[test]
fn messages_come_back_decoded() {
    let (cryostat, mock) = session();
    mock.set_action_message("Exchanging sample");
    mock.set_error(8, "Temperature monitor timeout");

    assert_eq!(
        cryostat.action_message(MESSAGE_LEN).unwrap(),
        "Exchanging sample"
    );
    assert_eq!(
        cryostat.error_message(MESSAGE_LEN).unwrap(),
        "Temperature monitor timeout"
    );
    assert_eq!(cryostat.error_status().unwrap(), 8);

    cryostat.lower_error().unwrap();
    assert_eq!(cryostat.error_status().unwrap(), 0);
    assert_eq!(cryostat.error_message(MESSAGE_LEN).unwrap(), "");
}

#[test]
fn curve_transfer_validates_and_passes_through() {
    let (cryostat, mock) = session();
    let dir = tempfile::tempdir().unwrap();
    let curve_path = dir.path().join("sensor.crv");

    cryostat
        .upload_temperature_calibration_curve(3, &curve_path)
        .unwrap();
    cryostat
        .download_temperature_sensor_calibration_curve(8, &curve_path)
        .unwrap();
    cryostat
        .upload_sample_temperature_calibration_curve(&curve_path)
        .unwrap();
    cryostat
        .download_sample_temperature_sensor_calibration_curve(&curve_path)
        .unwrap();

    let err = cryostat
        .download_temperature_sensor_calibration_curve(9, &curve_path)
        .unwrap_err();
    assert!(matches!(err, Error::CurveNumber { curve: 9 }));

    // the failed download never reached the backend, so a queued fault is
    // still pending for the next call
    mock.fail_next(24);
    let err = cryostat
        .download_temperature_sensor_calibration_curve(0, &curve_path)
        .unwrap_err();
    assert!(matches!(err, Error::CurveNumber { curve: 0 }));
    let err = cryostat.confirm().unwrap_err();
    assert!(matches!(err, Error::Fault { code: 24, .. }));
}

#[test]
fn queries_and_gains_round_trip() {
    let (cryostat, mock) = session();
    cryostat.query_sample_heater_resistance().unwrap();
    mock.set_value("getSampleHeaterResistance", 49.9);
    assert_eq!(cryostat.sample_heater_resistance().unwrap(), 49.9);

    cryostat.set_proportional_gain(12.5).unwrap();
    assert_eq!(cryostat.proportional_gain().unwrap(), 12.5);
}
