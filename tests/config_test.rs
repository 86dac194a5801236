//! Settings loading tests: defaults, file, environment override.
//!
//! Environment-touching tests are serialised because the process
//! environment is shared.

use std::io::Write;

use serial_test::serial;

use attodry::{SetupVersion, Settings};

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let settings = Settings::load_from("does_not_exist.toml").unwrap();
    assert_eq!(settings.com_port, "COM4");
    assert_eq!(settings.setup, SetupVersion::AttoDry2100);
    assert_eq!(settings.log_level, "info");
    settings.validate().unwrap();
}

#[test]
#[serial]
fn file_values_are_loaded() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(
        file,
        r#"
library = "/opt/attodry/attoDRYLib.so"
com_port = "COM7"
setup = "attodry800"
log_level = "debug"
"#
    )
    .unwrap();

    let settings = Settings::load_from(file.path()).unwrap();
    assert_eq!(settings.library.to_str().unwrap(), "/opt/attodry/attoDRYLib.so");
    assert_eq!(settings.com_port, "COM7");
    assert_eq!(settings.setup, SetupVersion::AttoDry800);
    assert_eq!(settings.log_level, "debug");
}

#[test]
#[serial]
fn environment_overrides_the_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(file, r#"com_port = "COM7""#).unwrap();

    std::env::set_var("ATTODRY_COM_PORT", "COM9");
    let settings = Settings::load_from(file.path()).unwrap();
    std::env::remove_var("ATTODRY_COM_PORT");

    assert_eq!(settings.com_port, "COM9");
}

#[test]
#[serial]
fn setup_version_from_environment() {
    std::env::set_var("ATTODRY_SETUP", "attodry1100");
    let settings = Settings::load_from("does_not_exist.toml").unwrap();
    std::env::remove_var("ATTODRY_SETUP");

    assert_eq!(settings.setup, SetupVersion::AttoDry1100);
}
