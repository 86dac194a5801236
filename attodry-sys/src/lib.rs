//! Raw FFI bindings for the attocube `attoDRYLib` shared library.
//!
//! The vendor ships `attoDRYLib.dll` alongside a LabVIEW runtime rather than
//! as a linkable import library, so the bindings resolve symbols at runtime
//! with `libloading`. [`AttoDryLib::open`] loads the library and binds every
//! export exactly once into an immutable table of typed function pointers;
//! the table is then passed by reference to whatever needs to call into the
//! device. There is no process-global state.
//!
//! Every entry point returns a `c_int` status code (0 is success). Status
//! translation, argument marshalling, and a safe API live in the `attodry`
//! crate; everything here is `unsafe` and as close to the C surface as
//! possible.
//!
//! All exports carry the `AttoDRY_Interface_` prefix and use the stdcall
//! convention on 32-bit Windows, which is what `extern "system"` selects
//! there. Off Windows, `system` is plain `C`, so the crate still compiles
//! for host-side tests.

use std::os::raw::{c_char, c_float, c_int};
use std::path::Path;

use libloading::Library;

/// Entry points taking no arguments: commands, toggles, parameter queries.
pub type RawCommand = unsafe extern "system" fn() -> c_int;
/// Scalar getters writing a 32-bit float through an out-pointer.
pub type RawReadF32 = unsafe extern "system" fn(*mut c_float) -> c_int;
/// Scalar setters taking a 32-bit float by value.
pub type RawWriteF32 = unsafe extern "system" fn(c_float) -> c_int;
/// Integer getters (booleans and the error status) via out-pointer.
pub type RawReadI32 = unsafe extern "system" fn(*mut c_int) -> c_int;
/// `begin`: selects the setup version (0 = 1100, 1 = 2100, 2 = 800).
pub type RawBegin = unsafe extern "system" fn(u16) -> c_int;
/// Entry points taking one NUL-terminated string (COM port or file path).
pub type RawSendPath = unsafe extern "system" fn(*const c_char) -> c_int;
/// Numbered-curve operations: user curve number, then a file path.
pub type RawSendCurve = unsafe extern "system" fn(c_int, *const c_char) -> c_int;
/// Message retrieval into a caller-supplied buffer of the given length.
pub type RawReadMessage = unsafe extern "system" fn(*mut c_char, c_int) -> c_int;
/// `startLogging`: log file path, interval selector, append flag.
pub type RawStartLogging = unsafe extern "system" fn(*const c_char, c_int, c_int) -> c_int;

macro_rules! attodry_symbols {
    ($( $field:ident : $ty:ty = $symbol:literal; )+) => {
        /// Immutable table of bound `attoDRYLib` entry points.
        ///
        /// Construct with [`AttoDryLib::open`]. The backing [`Library`] is
        /// kept alive by the table itself, so the function pointers stay
        /// valid for as long as the table exists.
        pub struct AttoDryLib {
            $( pub $field: $ty, )+
            _lib: Library,
        }

        impl AttoDryLib {
            /// Loads the shared library at `path` and resolves every export.
            ///
            /// Any missing symbol fails the whole load; a partially bound
            /// table is never observable.
            ///
            /// # Safety
            ///
            /// The file at `path` must be the vendor's `attoDRYLib` (or a
            /// binary-compatible stand-in): library initialisers run on
            /// load, and the signatures declared here are trusted blindly
            /// when the pointers are later called.
            pub unsafe fn open(path: &Path) -> Result<Self, libloading::Error> {
                let lib = Library::new(path)?;
                $(
                    let $field = *lib.get::<$ty>(
                        concat!("AttoDRY_Interface_", $symbol, "\0").as_bytes(),
                    )?;
                )+
                Ok(Self { $( $field, )+ _lib: lib })
            }
        }
    };
}

attodry_symbols! {
    // Session control
    begin: RawBegin = "begin";
    connect: RawSendPath = "Connect";
    disconnect: RawCommand = "Disconnect";
    end: RawCommand = "end";
    cancel: RawCommand = "Cancel";
    confirm: RawCommand = "Confirm";
    lower_error: RawCommand = "lowerError";

    // Messages and error state
    get_action_message: RawReadMessage = "getActionMessage";
    get_attodry_error_message: RawReadMessage = "getAttodryErrorMessage";
    get_attodry_error_status: RawReadI32 = "getAttodryErrorStatus";

    // Procedures
    go_to_base_temperature: RawCommand = "goToBaseTemperature";
    start_sample_exchange: RawCommand = "startSampleExchange";
    sweep_field_to_zero: RawCommand = "sweepFieldToZero";

    // Data logging
    start_logging: RawStartLogging = "startLogging";
    stop_logging: RawCommand = "stopLogging";

    // Calibration curves
    download_sample_temperature_sensor_calibration_curve: RawSendPath =
        "downloadSampleTemperatureSensorCalibrationCurve";
    download_temperature_sensor_calibration_curve: RawSendCurve =
        "downloadTemperatureSensorCalibrationCurve";
    upload_sample_temperature_calibration_curve: RawSendPath =
        "uploadSampleTemperatureCalibrationCurve";
    upload_temperature_calibration_curve: RawSendCurve =
        "uploadTemperatureCalibrationCurve";

    // Status queries
    is_controlling_field: RawReadI32 = "isControllingField";
    is_controlling_temperature: RawReadI32 = "isControllingTemperature";
    is_device_connected: RawReadI32 = "isDeviceConnected";
    is_device_initialised: RawReadI32 = "isDeviceInitialised";
    is_going_to_base_temperature: RawReadI32 = "isGoingToBaseTemperature";
    is_exchange_heater_on: RawReadI32 = "isExchangeHeaterOn";
    is_persistent_mode_set: RawReadI32 = "isPersistentModeSet";
    is_pumping: RawReadI32 = "isPumping";
    is_sample_exchange_in_progress: RawReadI32 = "isSampleExchangeInProgress";
    is_sample_heater_on: RawReadI32 = "isSampleHeaterOn";
    is_sample_ready_to_exchange: RawReadI32 = "isSampleReadyToExchange";
    is_system_running: RawReadI32 = "isSystemRunning";
    is_zeroing_field: RawReadI32 = "isZeroingField";

    // Parameter queries (request a value from the device; read it back with
    // the corresponding getter once the status message arrives)
    query_reservoir_tset_cold_sample: RawCommand = "queryReservoirTsetColdSample";
    query_reservoir_tset_warm_magnet: RawCommand = "queryReservoirTsetWarmMagnet";
    query_reservoir_tset_warm_sample: RawCommand = "queryReservoirTsetWarmSample";
    query_sample_heater_maximum_power: RawCommand = "querySampleHeaterMaximumPower";
    query_sample_heater_resistance: RawCommand = "querySampleHeaterResistance";
    query_sample_heater_wire_resistance: RawCommand = "querySampleHeaterWireResistance";

    // Toggles
    toggle_cryostat_in_valve: RawCommand = "toggleCryostatInValve";
    toggle_cryostat_out_valve: RawCommand = "toggleCryostatOutValve";
    toggle_dump_in_valve: RawCommand = "toggleDumpInValve";
    toggle_dump_out_valve: RawCommand = "toggleDumpOutValve";
    toggle_exchange_heater_control: RawCommand = "toggleExchangeHeaterControl";
    toggle_full_temperature_control: RawCommand = "toggleFullTemperatureControl";
    toggle_helium_valve: RawCommand = "toggleHeliumValve";
    toggle_inner_volume_valve: RawCommand = "toggleInnerVolumeValve";
    toggle_outer_volume_valve: RawCommand = "toggleOuterVolumeValve";
    toggle_magnetic_field_control: RawCommand = "toggleMagneticFieldControl";
    toggle_persistent_mode: RawCommand = "togglePersistentMode";
    toggle_pump: RawCommand = "togglePump";
    toggle_pump_valve: RawCommand = "togglePumpValve";
    toggle_sample_temperature_control: RawCommand = "toggleSampleTemperatureControl";
    toggle_start_up_shutdown: RawCommand = "toggleStartUpShutdown";

    // Valve state getters
    get_cryostat_in_valve: RawReadI32 = "getCryostatInValve";
    get_cryostat_out_valve: RawReadI32 = "getCryostatOutValve";
    get_dump_in_valve: RawReadI32 = "getDumpInValve";
    get_dump_out_valve: RawReadI32 = "getDumpOutValve";
    get_helium_valve: RawReadI32 = "getHeliumValve";
    get_inner_volume_valve: RawReadI32 = "getInnerVolumeValve";
    get_outer_volume_valve: RawReadI32 = "getOuterVolumeValve";
    get_pump_valve: RawReadI32 = "getPumpValve";

    // Scalar getters
    get_cryostat_in_pressure: RawReadF32 = "getCryostatInPressure";
    get_cryostat_out_pressure: RawReadF32 = "getCryostatOutPressure";
    get_dump_pressure: RawReadF32 = "getDumpPressure";
    get_pressure: RawReadF32 = "getPressure";
    get_40k_stage_temperature: RawReadF32 = "get40KStageTemperature";
    get_4k_stage_temperature: RawReadF32 = "get4KStageTemperature";
    get_derivative_gain: RawReadF32 = "getDerivativeGain";
    get_integral_gain: RawReadF32 = "getIntegralGain";
    get_proportional_gain: RawReadF32 = "getProportionalGain";
    get_magnetic_field: RawReadF32 = "getMagneticField";
    get_magnetic_field_set_point: RawReadF32 = "getMagneticFieldSetPoint";
    get_reservoir_heater_power: RawReadF32 = "getReservoirHeaterPower";
    get_reservoir_temperature: RawReadF32 = "getReservoirTemperature";
    get_reservoir_tset_cold_sample: RawReadF32 = "getReservoirTsetColdSample";
    get_reservoir_tset_warm_magnet: RawReadF32 = "getReservoirTsetWarmMagnet";
    get_reservoir_tset_warm_sample: RawReadF32 = "getReservoirTsetWarmSample";
    get_sample_heater_maximum_power: RawReadF32 = "getSampleHeaterMaximumPower";
    get_sample_heater_power: RawReadF32 = "getSampleHeaterPower";
    get_sample_heater_resistance: RawReadF32 = "getSampleHeaterResistance";
    get_sample_heater_wire_resistance: RawReadF32 = "getSampleHeaterWireResistance";
    get_sample_temperature: RawReadF32 = "getSampleTemperature";
    get_user_temperature: RawReadF32 = "getUserTemperature";
    get_vti_heater_power: RawReadF32 = "getVtiHeaterPower";
    get_vti_temperature: RawReadF32 = "getVtiTemperature";
    get_turbopump_frequency: RawReadF32 = "getTurbopumpFrequency";

    // Scalar setters
    set_derivative_gain: RawWriteF32 = "setDerivativeGain";
    set_integral_gain: RawWriteF32 = "setIntegralGain";
    set_proportional_gain: RawWriteF32 = "setProportionalGain";
    set_reservoir_tset_cold_sample: RawWriteF32 = "setReservoirTsetColdSample";
    set_reservoir_tset_warm_magnet: RawWriteF32 = "setReservoirTsetWarmMagnet";
    set_reservoir_tset_warm_sample: RawWriteF32 = "setReservoirTsetWarmSample";
    set_sample_heater_maximum_power: RawWriteF32 = "setSampleHeaterMaximumPower";
    set_sample_heater_power: RawWriteF32 = "setSampleHeaterPower";
    set_sample_heater_resistance: RawWriteF32 = "setSampleHeaterResistance";
    set_sample_heater_wire_resistance: RawWriteF32 = "setSampleHeaterWireResistance";
    set_user_magnetic_field: RawWriteF32 = "setUserMagneticField";
    set_user_temperature: RawWriteF32 = "setUserTemperature";
    set_vti_heater_power: RawWriteF32 = "setVTIHeaterPower";

    // attoDRY800 family
    get_break_vac_800_valve: RawReadI32 = "getBreakVac800Valve";
    get_pump_800_valve: RawReadI32 = "getPump800Valve";
    get_sample_space_800_valve: RawReadI32 = "getSampleSpace800Valve";
    toggle_break_vac_800_valve: RawCommand = "toggleBreakVac800Valve";
    toggle_pump_800_valve: RawCommand = "togglePump800Valve";
    toggle_sample_space_800_valve: RawCommand = "toggleSampleSpace800Valve";
    get_pressure_800: RawReadF32 = "getPressure800";
    get_turbopump_frequency_800: RawReadF32 = "GetTurbopumpFrequ800";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_missing_library() {
        let result = unsafe { AttoDryLib::open(Path::new("/nonexistent/attoDRYLib.dll")) };
        assert!(result.is_err());
    }
}
