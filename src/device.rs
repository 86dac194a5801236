//! Safe convenience wrapper around the attoDRY control library.
//!
//! [`Cryostat`] exposes one typed method per vendor entry point. Each method
//! marshals its arguments, makes exactly one call into the backend, and
//! translates the returned status code through [`crate::status::check`];
//! there is no retry, no caching, and no call-order enforcement (session
//! state lives inside the vendor library). The backend is either the real
//! symbol table from `attodry-sys` or the in-memory simulator from
//! [`crate::mock`].
//!
//! The method set mirrors the vendor's LabVIEW interface: session control,
//! status queries, scalar getters and setters, valve and control-mode
//! toggles, parameter queries, data logging, and calibration-curve
//! transfer, including the attoDRY1100/2100/800-specific entry points.

use std::fmt;
use std::os::raw::{c_char, c_float, c_int};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use attodry_sys::{self as sys, AttoDryLib};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::marshal;
use crate::mock::MockCryostat;
use crate::status;

/// Buffer length used by the vendor's own clients for message retrieval.
pub const MESSAGE_LEN: usize = 500;

/// User curve numbers the temperature monitor accepts.
pub const USER_CURVE_NUMBERS: std::ops::RangeInclusive<i32> = 1..=8;

const INIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Hardware setup selector passed to [`Cryostat::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum SetupVersion {
    /// attoDRY1100: cryostat without magnet, single valve block.
    AttoDry1100 = 0,
    /// attoDRY2100: cryostat with magnet and full valve set.
    AttoDry2100 = 1,
    /// attoDRY800: compact optical-table cryostat.
    AttoDry800 = 2,
}

impl SetupVersion {
    /// Raw selector value expected by `begin`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Vendor name of the setup.
    pub fn as_str(self) -> &'static str {
        match self {
            SetupVersion::AttoDry1100 => "attoDRY1100",
            SetupVersion::AttoDry2100 => "attoDRY2100",
            SetupVersion::AttoDry800 => "attoDRY800",
        }
    }
}

impl fmt::Display for SetupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sampling interval selector for [`Cryostat::start_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LoggingInterval {
    /// One sample per second.
    OneSecond = 0,
    /// One sample every five seconds.
    FiveSeconds = 1,
    /// One sample every thirty seconds.
    ThirtySeconds = 2,
    /// One sample per minute.
    OneMinute = 3,
    /// One sample every five minutes.
    FiveMinutes = 4,
}

impl LoggingInterval {
    /// Raw selector value expected by `startLogging`.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

enum Backend {
    Dll(AttoDryLib),
    Mock(Arc<MockCryostat>),
}

/// Handle to an attoDRY cryostat.
///
/// All calls are synchronous and blocking; any waiting happens inside the
/// vendor library. The handle holds no mutable state of its own, but the
/// device session it drives is a single shared resource, so callers that
/// share a `Cryostat` across threads must serialise access themselves.
pub struct Cryostat {
    backend: Backend,
}

impl Cryostat {
    /// Loads the vendor library from `library` and binds every entry point.
    ///
    /// # Safety
    ///
    /// The file at `library` must be the vendor's `attoDRYLib`; loading runs
    /// its initialisers and the resolved symbols are called with the
    /// signatures declared in `attodry-sys`.
    pub unsafe fn open(library: &Path) -> Result<Self> {
        let lib = unsafe { AttoDryLib::open(library) }?;
        log::info!("loaded attoDRYLib from {}", library.display());
        Ok(Cryostat {
            backend: Backend::Dll(lib),
        })
    }

    /// Wraps an existing simulator so tests can keep a handle on its state.
    pub fn with_mock(mock: Arc<MockCryostat>) -> Self {
        Cryostat {
            backend: Backend::Mock(mock),
        }
    }

    /// Creates a handle backed by a fresh simulator.
    pub fn simulated() -> Self {
        Self::with_mock(Arc::new(MockCryostat::new()))
    }

    // ---- session control -------------------------------------------------

    /// Starts the server that communicates with the attoDRY and loads the
    /// software for the given setup version. Run this before sending
    /// commands or reading data.
    pub fn begin(&self, setup: SetupVersion) -> Result<()> {
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { (lib.begin)(setup.as_u16()) },
            Backend::Mock(mock) => mock.begin(setup.as_u16()),
        };
        self.checked(code, "begin", format_args!("{setup}"))?;
        log::info!("attoDRY server started for {setup}");
        Ok(())
    }

    /// Connects to the attoDRY on the given COM port.
    ///
    /// The device is not usable immediately after connecting; poll
    /// [`Cryostat::is_device_initialised`] or use
    /// [`Cryostat::wait_until_initialised`] before sending commands.
    pub fn connect(&self, port: &str) -> Result<()> {
        self.send_str(|lib| lib.connect, "Connect", port)?;
        log::info!("connected to attoDRY on {port}");
        Ok(())
    }

    /// Disconnects from the attoDRY, if connected. Run this before
    /// [`Cryostat::end`].
    pub fn disconnect(&self) -> Result<()> {
        self.command(|lib| lib.disconnect, "Disconnect")
    }

    /// Stops the server communicating with the attoDRY. Run
    /// [`Cryostat::disconnect`] first, and this before exiting.
    pub fn end(&self) -> Result<()> {
        self.command(|lib| lib.end, "end")
    }

    /// Disconnects and stops the server, in that order.
    pub fn shutdown(&self) -> Result<()> {
        self.disconnect()?;
        self.end()
    }

    /// Sends a `Cancel` to the attoDRY: aborts the current action or
    /// answers a pop-up negatively.
    pub fn cancel(&self) -> Result<()> {
        self.command(|lib| lib.cancel, "Cancel")
    }

    /// Sends a `Confirm` to the attoDRY: answers a pop-up positively.
    pub fn confirm(&self) -> Result<()> {
        self.command(|lib| lib.confirm, "Confirm")
    }

    /// Lowers any raised error.
    pub fn lower_error(&self) -> Result<()> {
        self.command(|lib| lib.lower_error, "lowerError")
    }

    /// Polls [`Cryostat::is_device_initialised`] until it reports true,
    /// failing with [`Error::InitTimeout`] after `timeout`.
    ///
    /// Commands sent before initialisation completes can drop the
    /// connection, so call this right after [`Cryostat::connect`].
    pub fn wait_until_initialised(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            if self.is_device_initialised()? {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::InitTimeout(timeout));
            }
            thread::sleep(INIT_POLL_INTERVAL.min(timeout));
        }
    }

    // ---- messages and error state ----------------------------------------

    /// Current action message, as shown in the display pop-ups. The device
    /// writes at most `max_len` bytes; the decoded text is returned.
    pub fn action_message(&self, max_len: usize) -> Result<String> {
        self.read_message(|lib| lib.get_action_message, "getActionMessage", max_len)
    }

    /// Current error message. The device writes at most `max_len` bytes;
    /// the decoded text is returned.
    pub fn error_message(&self, max_len: usize) -> Result<String> {
        self.read_message(
            |lib| lib.get_attodry_error_message,
            "getAttodryErrorMessage",
            max_len,
        )
    }

    /// Current raised error code, 0 if none.
    pub fn error_status(&self) -> Result<i32> {
        self.read_i32(|lib| lib.get_attodry_error_status, "getAttodryErrorStatus")
    }

    // ---- status queries --------------------------------------------------

    /// True while magnetic field control is active (orange field icon).
    pub fn is_controlling_field(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_controlling_field, "isControllingField")
    }

    /// True while temperature control is active (orange temperature icon).
    pub fn is_controlling_temperature(&self) -> Result<bool> {
        self.read_bool(
            |lib| lib.is_controlling_temperature,
            "isControllingTemperature",
        )
    }

    /// True if the attoDRY is connected.
    pub fn is_device_connected(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_device_connected, "isDeviceConnected")
    }

    /// True once the attoDRY has initialised. Check this after connecting
    /// and before sending any command.
    pub fn is_device_initialised(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_device_initialised, "isDeviceInitialised")
    }

    /// True while the base-temperature procedure is running.
    pub fn is_going_to_base_temperature(&self) -> Result<bool> {
        self.read_bool(
            |lib| lib.is_going_to_base_temperature,
            "isGoingToBaseTemperature",
        )
    }

    /// True if the exchange/VTI heater is on, meaning PID control is active
    /// or a constant heater power is set.
    pub fn is_exchange_heater_on(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_exchange_heater_on, "isExchangeHeaterOn")
    }

    /// True if persistent mode is set for the magnet. The switch heater may
    /// still be on while the field is changing.
    pub fn is_persistent_mode_set(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_persistent_mode_set, "isPersistentModeSet")
    }

    /// True if the pump is running.
    pub fn is_pumping(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_pumping, "isPumping")
    }

    /// True while the sample-exchange procedure is running.
    pub fn is_sample_exchange_in_progress(&self) -> Result<bool> {
        self.read_bool(
            |lib| lib.is_sample_exchange_in_progress,
            "isSampleExchangeInProgress",
        )
    }

    /// True if the sample heater is on, meaning PID control is active or a
    /// constant heater power is set.
    pub fn is_sample_heater_on(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_sample_heater_on, "isSampleHeaterOn")
    }

    /// True when the sample stick is ready to be removed or inserted.
    pub fn is_sample_ready_to_exchange(&self) -> Result<bool> {
        self.read_bool(
            |lib| lib.is_sample_ready_to_exchange,
            "isSampleReadyToExchange",
        )
    }

    /// True while the system is running.
    pub fn is_system_running(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_system_running, "isSystemRunning")
    }

    /// True while the field is being swept to zero.
    pub fn is_zeroing_field(&self) -> Result<bool> {
        self.read_bool(|lib| lib.is_zeroing_field, "isZeroingField")
    }

    // ---- procedures ------------------------------------------------------

    /// Starts the "Base Temperature" procedure, as on the touch screen.
    pub fn go_to_base_temperature(&self) -> Result<()> {
        self.command(|lib| lib.go_to_base_temperature, "goToBaseTemperature")
    }

    /// Starts the sample-exchange procedure.
    pub fn start_sample_exchange(&self) -> Result<()> {
        self.command(|lib| lib.start_sample_exchange, "startSampleExchange")
    }

    /// Starts the "Zero Field" procedure, as on the touch screen.
    pub fn sweep_field_to_zero(&self) -> Result<()> {
        self.command(|lib| lib.sweep_field_to_zero, "sweepFieldToZero")
    }

    // ---- data logging ----------------------------------------------------

    /// Starts logging device data to `path` at the given interval. The file
    /// is created if it does not exist; `append` controls whether an
    /// existing file is extended or replaced.
    pub fn start_logging(
        &self,
        path: &Path,
        interval: LoggingInterval,
        append: bool,
    ) -> Result<()> {
        let c_path = marshal::path_to_cstring(path)?;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe {
                (lib.start_logging)(c_path.as_ptr(), interval.as_i32(), c_int::from(append))
            },
            Backend::Mock(mock) => {
                mock.start_logging(&c_path, interval.as_i32(), c_int::from(append))
            }
        };
        self.checked(
            code,
            "startLogging",
            format_args!("{}, {interval:?}, {append}", path.display()),
        )?;
        log::debug!("logging to {} ({interval:?})", path.display());
        Ok(())
    }

    /// Stops logging device data.
    pub fn stop_logging(&self) -> Result<()> {
        self.command(|lib| lib.stop_logging, "stopLogging")
    }

    // ---- calibration curves ----------------------------------------------

    /// Starts the download of the sample temperature sensor calibration
    /// curve to `save_path`.
    pub fn download_sample_temperature_sensor_calibration_curve(
        &self,
        save_path: &Path,
    ) -> Result<()> {
        self.send_file(
            |lib| lib.download_sample_temperature_sensor_calibration_curve,
            "downloadSampleTemperatureSensorCalibrationCurve",
            save_path,
        )
    }

    /// Starts the download of the temperature-monitor calibration curve at
    /// `curve` (1-8) to `save_path`.
    pub fn download_temperature_sensor_calibration_curve(
        &self,
        curve: i32,
        save_path: &Path,
    ) -> Result<()> {
        self.send_curve(
            |lib| lib.download_temperature_sensor_calibration_curve,
            "downloadTemperatureSensorCalibrationCurve",
            curve,
            save_path,
        )
    }

    /// Starts the upload of a `.crv` calibration curve file to the sample
    /// temperature sensor.
    pub fn upload_sample_temperature_calibration_curve(&self, load_path: &Path) -> Result<()> {
        self.send_file(
            |lib| lib.upload_sample_temperature_calibration_curve,
            "uploadSampleTemperatureCalibrationCurve",
            load_path,
        )
    }

    /// Starts the upload of a `.crv` calibration curve file to user curve
    /// number `curve` (1-8) on the temperature monitor.
    pub fn upload_temperature_calibration_curve(&self, curve: i32, load_path: &Path) -> Result<()> {
        self.send_curve(
            |lib| lib.upload_temperature_calibration_curve,
            "uploadTemperatureCalibrationCurve",
            curve,
            load_path,
        )
    }

    // ---- parameter queries -----------------------------------------------
    //
    // Request a value from the device; once the next status message has
    // arrived, read it back with the matching getter.

    /// Requests the cold-sample reservoir set point from the device.
    pub fn query_reservoir_tset_cold_sample(&self) -> Result<()> {
        self.command(
            |lib| lib.query_reservoir_tset_cold_sample,
            "queryReservoirTsetColdSample",
        )
    }

    /// Requests the warm-magnet reservoir set point from the device.
    pub fn query_reservoir_tset_warm_magnet(&self) -> Result<()> {
        self.command(
            |lib| lib.query_reservoir_tset_warm_magnet,
            "queryReservoirTsetWarmMagnet",
        )
    }

    /// Requests the warm-sample reservoir set point from the device.
    pub fn query_reservoir_tset_warm_sample(&self) -> Result<()> {
        self.command(
            |lib| lib.query_reservoir_tset_warm_sample,
            "queryReservoirTsetWarmSample",
        )
    }

    /// Requests the sample heater maximum power from the device.
    pub fn query_sample_heater_maximum_power(&self) -> Result<()> {
        self.command(
            |lib| lib.query_sample_heater_maximum_power,
            "querySampleHeaterMaximumPower",
        )
    }

    /// Requests the sample heater resistance from the device.
    pub fn query_sample_heater_resistance(&self) -> Result<()> {
        self.command(
            |lib| lib.query_sample_heater_resistance,
            "querySampleHeaterResistance",
        )
    }

    /// Requests the sample heater wire resistance from the device.
    pub fn query_sample_heater_wire_resistance(&self) -> Result<()> {
        self.command(
            |lib| lib.query_sample_heater_wire_resistance,
            "querySampleHeaterWireResistance",
        )
    }

    // ---- control-mode toggles --------------------------------------------

    /// Toggles magnetic field control, like the field icon on the touch
    /// screen.
    pub fn toggle_magnetic_field_control(&self) -> Result<()> {
        self.command(
            |lib| lib.toggle_magnetic_field_control,
            "toggleMagneticFieldControl",
        )
    }

    /// Toggles persistent mode for the magnet. When enabled, the switch
    /// heater is turned off once the desired field is reached.
    pub fn toggle_persistent_mode(&self) -> Result<()> {
        self.command(|lib| lib.toggle_persistent_mode, "togglePersistentMode")
    }

    /// Toggles full temperature control, like the temperature icon on the
    /// touch screen: pumps the volumes and controls the sample temperature.
    pub fn toggle_full_temperature_control(&self) -> Result<()> {
        self.command(
            |lib| lib.toggle_full_temperature_control,
            "toggleFullTemperatureControl",
        )
    }

    /// Toggles only the sample temperature controller, without pumping the
    /// volumes. Use [`Cryostat::toggle_full_temperature_control`] for the
    /// touch-screen behaviour.
    pub fn toggle_sample_temperature_control(&self) -> Result<()> {
        self.command(
            |lib| lib.toggle_sample_temperature_control,
            "toggleSampleTemperatureControl",
        )
    }

    /// Toggles the exchange/VTI temperature controller. Controls the sample
    /// sensor if one is connected, otherwise the exchange-tube temperature.
    pub fn toggle_exchange_heater_control(&self) -> Result<()> {
        self.command(
            |lib| lib.toggle_exchange_heater_control,
            "toggleExchangeHeaterControl",
        )
    }

    /// Starts or stops the pump.
    pub fn toggle_pump(&self) -> Result<()> {
        self.command(|lib| lib.toggle_pump, "togglePump")
    }

    /// Toggles the start-up/shutdown procedure: a started-up attoDRY shuts
    /// down and vice versa.
    pub fn toggle_start_up_shutdown(&self) -> Result<()> {
        self.command(|lib| lib.toggle_start_up_shutdown, "toggleStartUpShutdown")
    }

    // ---- valve toggles ---------------------------------------------------

    /// ATTODRY2100 only. Toggles the cryostat in valve.
    pub fn toggle_cryostat_in_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_cryostat_in_valve, "toggleCryostatInValve")
    }

    /// ATTODRY2100 only. Toggles the cryostat out valve.
    pub fn toggle_cryostat_out_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_cryostat_out_valve, "toggleCryostatOutValve")
    }

    /// ATTODRY2100 only. Toggles the dump in valve.
    pub fn toggle_dump_in_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_dump_in_valve, "toggleDumpInValve")
    }

    /// ATTODRY2100 only. Toggles the dump out valve.
    pub fn toggle_dump_out_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_dump_out_valve, "toggleDumpOutValve")
    }

    /// ATTODRY1100 only. Toggles the helium valve.
    pub fn toggle_helium_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_helium_valve, "toggleHeliumValve")
    }

    /// ATTODRY1100 only. Toggles the inner volume valve.
    pub fn toggle_inner_volume_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_inner_volume_valve, "toggleInnerVolumeValve")
    }

    /// ATTODRY1100 only. Toggles the outer volume valve.
    pub fn toggle_outer_volume_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_outer_volume_valve, "toggleOuterVolumeValve")
    }

    /// ATTODRY1100 only. Toggles the pump valve.
    pub fn toggle_pump_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_pump_valve, "togglePumpValve")
    }

    // ---- valve state -----------------------------------------------------

    /// ATTODRY2100 only. State of the cryostat in valve; true is open.
    pub fn cryostat_in_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_cryostat_in_valve, "getCryostatInValve")
    }

    /// ATTODRY2100 only. State of the cryostat out valve; true is open.
    pub fn cryostat_out_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_cryostat_out_valve, "getCryostatOutValve")
    }

    /// ATTODRY2100 only. State of the dump in valve; true is open.
    pub fn dump_in_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_dump_in_valve, "getDumpInValve")
    }

    /// ATTODRY2100 only. State of the dump out valve; true is open.
    pub fn dump_out_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_dump_out_valve, "getDumpOutValve")
    }

    /// ATTODRY1100 only. State of the helium valve; true is open.
    pub fn helium_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_helium_valve, "getHeliumValve")
    }

    /// ATTODRY1100 only. State of the inner volume valve; true is open.
    pub fn inner_volume_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_inner_volume_valve, "getInnerVolumeValve")
    }

    /// ATTODRY1100 only. State of the outer volume valve; true is open.
    pub fn outer_volume_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_outer_volume_valve, "getOuterVolumeValve")
    }

    /// ATTODRY1100 only. State of the pump valve; true is open.
    pub fn pump_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_pump_valve, "getPumpValve")
    }

    // ---- temperatures, field, pressures ----------------------------------

    /// Sample temperature in Kelvin, updated with every status message from
    /// the attoDRY.
    pub fn sample_temperature(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_sample_temperature, "getSampleTemperature")
    }

    /// User set-point temperature in Kelvin.
    pub fn user_temperature(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_user_temperature, "getUserTemperature")
    }

    /// VTI temperature in Kelvin.
    pub fn vti_temperature(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_vti_temperature, "getVtiTemperature")
    }

    /// ATTODRY2100 only. Liquid helium reservoir temperature in Kelvin.
    pub fn reservoir_temperature(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_reservoir_temperature, "getReservoirTemperature")
    }

    /// Temperature of the 4 K stage in Kelvin.
    pub fn stage_temperature_4k(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_4k_stage_temperature, "get4KStageTemperature")
    }

    /// ATTODRY1100 only. Temperature of the 40 K stage in Kelvin.
    pub fn stage_temperature_40k(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_40k_stage_temperature, "get40KStageTemperature")
    }

    /// Current magnetic field in Tesla.
    pub fn magnetic_field(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_magnetic_field, "getMagneticField")
    }

    /// Magnetic field set point in Tesla.
    pub fn magnetic_field_set_point(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_magnetic_field_set_point,
            "getMagneticFieldSetPoint",
        )
    }

    /// ATTODRY2100 only. Pressure at the cryostat inlet in millibar.
    pub fn cryostat_in_pressure(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_cryostat_in_pressure, "getCryostatInPressure")
    }

    /// Pressure at the cryostat outlet in millibar.
    pub fn cryostat_out_pressure(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_cryostat_out_pressure, "getCryostatOutPressure")
    }

    /// ATTODRY2100 only. Pressure at the helium dump in millibar.
    pub fn dump_pressure(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_dump_pressure, "getDumpPressure")
    }

    /// ATTODRY1100 only. Pressure in the valve junction block in millibar.
    pub fn pressure(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_pressure, "getPressure")
    }

    /// ATTODRY1100 only. Turbopump frequency in Hertz.
    pub fn turbopump_frequency(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_turbopump_frequency, "getTurbopumpFrequency")
    }

    // ---- heaters and gains -----------------------------------------------

    /// Sample heater power in Watts.
    pub fn sample_heater_power(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_sample_heater_power, "getSampleHeaterPower")
    }

    /// Maximum power limit of the sample heater in Watts, as stored on the
    /// computer. Use [`Cryostat::query_sample_heater_maximum_power`] first
    /// to request the value from the attoDRY.
    pub fn sample_heater_maximum_power(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_sample_heater_maximum_power,
            "getSampleHeaterMaximumPower",
        )
    }

    /// Sample heater resistance in Ohms, as stored on the computer. Use
    /// [`Cryostat::query_sample_heater_resistance`] first to request the
    /// value from the attoDRY.
    ///
    /// Together with the wire resistance this determines the output power:
    /// `Power = Voltage^2 / (HeaterResistance + WireResistance)^2 *
    /// HeaterResistance`.
    pub fn sample_heater_resistance(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_sample_heater_resistance,
            "getSampleHeaterResistance",
        )
    }

    /// Sample heater wire resistance in Ohms, as stored on the computer.
    /// Use [`Cryostat::query_sample_heater_wire_resistance`] first to
    /// request the value from the attoDRY.
    pub fn sample_heater_wire_resistance(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_sample_heater_wire_resistance,
            "getSampleHeaterWireResistance",
        )
    }

    /// VTI heater power in Watts.
    pub fn vti_heater_power(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_vti_heater_power, "getVtiHeaterPower")
    }

    /// ATTODRY2100 only. Reservoir heater power in Watts.
    pub fn reservoir_heater_power(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_reservoir_heater_power,
            "getReservoirHeaterPower",
        )
    }

    /// Proportional gain of the active temperature controller. Which
    /// controller that is depends on which heater is on: the sample heater
    /// gain if no heater or the sample heater is on, the VTI heater gain if
    /// the VTI heater is on and a sample sensor is connected, otherwise the
    /// exchange heater gain.
    pub fn proportional_gain(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_proportional_gain, "getProportionalGain")
    }

    /// Integral gain of the active temperature controller; see
    /// [`Cryostat::proportional_gain`] for which controller is active.
    pub fn integral_gain(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_integral_gain, "getIntegralGain")
    }

    /// Derivative gain of the active temperature controller; see
    /// [`Cryostat::proportional_gain`] for which controller is active.
    pub fn derivative_gain(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_derivative_gain, "getDerivativeGain")
    }

    // ---- reservoir set points --------------------------------------------

    /// Reservoir set point for a cold sample, in Kelvin.
    pub fn reservoir_tset_cold_sample(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_reservoir_tset_cold_sample,
            "getReservoirTsetColdSample",
        )
    }

    /// Reservoir set point for a warm magnet, in Kelvin.
    pub fn reservoir_tset_warm_magnet(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_reservoir_tset_warm_magnet,
            "getReservoirTsetWarmMagnet",
        )
    }

    /// Reservoir set point for a warm sample, in Kelvin.
    pub fn reservoir_tset_warm_sample(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_reservoir_tset_warm_sample,
            "getReservoirTsetWarmSample",
        )
    }

    // ---- setters ---------------------------------------------------------

    /// Sets the user temperature in Kelvin, used while temperature control
    /// is active.
    pub fn set_user_temperature(&self, kelvin: f32) -> Result<()> {
        self.write_f32(|lib| lib.set_user_temperature, "setUserTemperature", kelvin)
    }

    /// Sets the user magnetic field in Tesla, used as the set point while
    /// field control is active.
    pub fn set_user_magnetic_field(&self, tesla: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_user_magnetic_field,
            "setUserMagneticField",
            tesla,
        )
    }

    /// Sets the proportional gain of the active temperature controller;
    /// see [`Cryostat::proportional_gain`] for which controller is active.
    pub fn set_proportional_gain(&self, gain: f32) -> Result<()> {
        self.write_f32(|lib| lib.set_proportional_gain, "setProportionalGain", gain)
    }

    /// Sets the integral gain of the active temperature controller.
    pub fn set_integral_gain(&self, gain: f32) -> Result<()> {
        self.write_f32(|lib| lib.set_integral_gain, "setIntegralGain", gain)
    }

    /// Sets the derivative gain of the active temperature controller.
    pub fn set_derivative_gain(&self, gain: f32) -> Result<()> {
        self.write_f32(|lib| lib.set_derivative_gain, "setDerivativeGain", gain)
    }

    /// Sets the sample heater power in Watts.
    pub fn set_sample_heater_power(&self, watts: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_sample_heater_power,
            "setSampleHeaterPower",
            watts,
        )
    }

    /// Sets the maximum power limit of the sample heater in Watts. Stored
    /// in non-volatile memory rated for about 100,000 write cycles, so
    /// avoid setting it in a tight loop.
    pub fn set_sample_heater_maximum_power(&self, watts: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_sample_heater_maximum_power,
            "setSampleHeaterMaximumPower",
            watts,
        )
    }

    /// Sets the sample heater resistance in Ohms. Stored in non-volatile
    /// memory; see [`Cryostat::set_sample_heater_maximum_power`].
    pub fn set_sample_heater_resistance(&self, ohms: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_sample_heater_resistance,
            "setSampleHeaterResistance",
            ohms,
        )
    }

    /// Sets the sample heater wire resistance in Ohms. Stored in
    /// non-volatile memory; see
    /// [`Cryostat::set_sample_heater_maximum_power`].
    pub fn set_sample_heater_wire_resistance(&self, ohms: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_sample_heater_wire_resistance,
            "setSampleHeaterWireResistance",
            ohms,
        )
    }

    /// Sets the VTI heater power in Watts.
    pub fn set_vti_heater_power(&self, watts: f32) -> Result<()> {
        self.write_f32(|lib| lib.set_vti_heater_power, "setVTIHeaterPower", watts)
    }

    /// Sets the reservoir set point for a cold sample, in Kelvin.
    pub fn set_reservoir_tset_cold_sample(&self, kelvin: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_reservoir_tset_cold_sample,
            "setReservoirTsetColdSample",
            kelvin,
        )
    }

    /// Sets the reservoir set point for a warm magnet, in Kelvin.
    pub fn set_reservoir_tset_warm_magnet(&self, kelvin: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_reservoir_tset_warm_magnet,
            "setReservoirTsetWarmMagnet",
            kelvin,
        )
    }

    /// Sets the reservoir set point for a warm sample, in Kelvin.
    pub fn set_reservoir_tset_warm_sample(&self, kelvin: f32) -> Result<()> {
        self.write_f32(
            |lib| lib.set_reservoir_tset_warm_sample,
            "setReservoirTsetWarmSample",
            kelvin,
        )
    }

    // ---- attoDRY800 family -----------------------------------------------

    /// ATTODRY800 only. State of the break-vacuum valve; true is open.
    pub fn break_vac_800_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_break_vac_800_valve, "getBreakVac800Valve")
    }

    /// ATTODRY800 only. State of the pump valve; true is open.
    pub fn pump_800_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_pump_800_valve, "getPump800Valve")
    }

    /// ATTODRY800 only. State of the sample-space valve; true is open.
    pub fn sample_space_800_valve(&self) -> Result<bool> {
        self.read_bool(|lib| lib.get_sample_space_800_valve, "getSampleSpace800Valve")
    }

    /// ATTODRY800 only. Toggles the break-vacuum valve.
    pub fn toggle_break_vac_800_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_break_vac_800_valve, "toggleBreakVac800Valve")
    }

    /// ATTODRY800 only. Toggles the pump valve.
    pub fn toggle_pump_800_valve(&self) -> Result<()> {
        self.command(|lib| lib.toggle_pump_800_valve, "togglePump800Valve")
    }

    /// ATTODRY800 only. Toggles the sample-space valve.
    pub fn toggle_sample_space_800_valve(&self) -> Result<()> {
        self.command(
            |lib| lib.toggle_sample_space_800_valve,
            "toggleSampleSpace800Valve",
        )
    }

    /// ATTODRY800 only. Pressure at the cryostat inlet in millibar.
    pub fn pressure_800(&self) -> Result<f32> {
        self.read_f32(|lib| lib.get_pressure_800, "getPressure800")
    }

    /// ATTODRY800 only. Turbopump frequency in Hertz.
    pub fn turbopump_frequency_800(&self) -> Result<f32> {
        self.read_f32(
            |lib| lib.get_turbopump_frequency_800,
            "GetTurbopumpFrequ800",
        )
    }

    // ---- dispatch helpers ------------------------------------------------

    fn checked(&self, code: c_int, op: &'static str, args: fmt::Arguments<'_>) -> Result<()> {
        match status::check(code, op, args) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("{op} failed: {err}");
                Err(err)
            }
        }
    }

    fn command(&self, sym: fn(&AttoDryLib) -> sys::RawCommand, op: &'static str) -> Result<()> {
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)() },
            Backend::Mock(mock) => mock.command(op),
        };
        self.checked(code, op, format_args!(""))
    }

    fn read_f32(&self, sym: fn(&AttoDryLib) -> sys::RawReadF32, op: &'static str) -> Result<f32> {
        let mut value: c_float = 0.0;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(&mut value) },
            Backend::Mock(mock) => mock.read_f32(op, &mut value),
        };
        self.checked(code, op, format_args!(""))?;
        Ok(value)
    }

    fn write_f32(
        &self,
        sym: fn(&AttoDryLib) -> sys::RawWriteF32,
        op: &'static str,
        value: f32,
    ) -> Result<()> {
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(value) },
            Backend::Mock(mock) => mock.write_f32(op, value),
        };
        self.checked(code, op, format_args!("{value}"))
    }

    fn read_i32(&self, sym: fn(&AttoDryLib) -> sys::RawReadI32, op: &'static str) -> Result<i32> {
        let mut value: c_int = 0;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(&mut value) },
            Backend::Mock(mock) => mock.read_i32(op, &mut value),
        };
        self.checked(code, op, format_args!(""))?;
        Ok(value)
    }

    fn read_bool(&self, sym: fn(&AttoDryLib) -> sys::RawReadI32, op: &'static str) -> Result<bool> {
        Ok(self.read_i32(sym, op)? != 0)
    }

    fn send_str(
        &self,
        sym: fn(&AttoDryLib) -> sys::RawSendPath,
        op: &'static str,
        value: &str,
    ) -> Result<()> {
        let c_value = marshal::to_cstring(value)?;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(c_value.as_ptr()) },
            Backend::Mock(mock) => mock.send_path(op, &c_value),
        };
        self.checked(code, op, format_args!("{value}"))
    }

    fn send_file(
        &self,
        sym: fn(&AttoDryLib) -> sys::RawSendPath,
        op: &'static str,
        path: &Path,
    ) -> Result<()> {
        let c_path = marshal::path_to_cstring(path)?;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(c_path.as_ptr()) },
            Backend::Mock(mock) => mock.send_path(op, &c_path),
        };
        self.checked(code, op, format_args!("{}", path.display()))
    }

    fn send_curve(
        &self,
        sym: fn(&AttoDryLib) -> sys::RawSendCurve,
        op: &'static str,
        curve: i32,
        path: &Path,
    ) -> Result<()> {
        if !USER_CURVE_NUMBERS.contains(&curve) {
            return Err(Error::CurveNumber { curve });
        }
        let c_path = marshal::path_to_cstring(path)?;
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe { sym(lib)(curve, c_path.as_ptr()) },
            Backend::Mock(mock) => mock.send_curve(op, curve, &c_path),
        };
        self.checked(code, op, format_args!("{curve}, {}", path.display()))
    }

    fn read_message(
        &self,
        sym: fn(&AttoDryLib) -> sys::RawReadMessage,
        op: &'static str,
        max_len: usize,
    ) -> Result<String> {
        let mut buf = vec![0u8; max_len];
        let code = match &self.backend {
            Backend::Dll(lib) => unsafe {
                sym(lib)(buf.as_mut_ptr() as *mut c_char, max_len as c_int)
            },
            Backend::Mock(mock) => mock.read_message(op, &mut buf),
        };
        self.checked(code, op, format_args!("{max_len}"))?;
        Ok(marshal::decode_message(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_versions_match_the_vendor_selectors() {
        assert_eq!(SetupVersion::AttoDry1100.as_u16(), 0);
        assert_eq!(SetupVersion::AttoDry2100.as_u16(), 1);
        assert_eq!(SetupVersion::AttoDry800.as_u16(), 2);
    }

    #[test]
    fn logging_intervals_match_the_vendor_selectors() {
        assert_eq!(LoggingInterval::OneSecond.as_i32(), 0);
        assert_eq!(LoggingInterval::FiveSeconds.as_i32(), 1);
        assert_eq!(LoggingInterval::ThirtySeconds.as_i32(), 2);
        assert_eq!(LoggingInterval::OneMinute.as_i32(), 3);
        assert_eq!(LoggingInterval::FiveMinutes.as_i32(), 4);
    }

    #[test]
    fn curve_numbers_are_validated_before_the_call() {
        let mock = Arc::new(MockCryostat::new());
        let cryostat = Cryostat::with_mock(mock.clone());
        for curve in [0, -1, 9, 100] {
            // a queued fault would be consumed if the call reached the mock
            mock.fail_next(37);
            let err = cryostat
                .upload_temperature_calibration_curve(curve, Path::new("curve.crv"))
                .unwrap_err();
            assert!(matches!(err, Error::CurveNumber { curve: c } if c == curve));
            assert_eq!(mock.command("Cancel"), 37, "call crossed the boundary");
        }
    }

    #[test]
    fn wait_until_initialised_times_out() {
        let mock = Arc::new(MockCryostat::new());
        let cryostat = Cryostat::with_mock(mock);
        let err = cryostat
            .wait_until_initialised(Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, Error::InitTimeout(_)));
    }

    #[test]
    fn wait_until_initialised_returns_once_ready() {
        let mock = Arc::new(MockCryostat::new());
        let cryostat = Cryostat::with_mock(mock.clone());
        mock.set_initialised(true);
        cryostat
            .wait_until_initialised(Duration::from_millis(10))
            .unwrap();
    }
}
