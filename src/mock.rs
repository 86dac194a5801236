//! In-memory simulator for the attoDRY library.
//!
//! [`MockCryostat`] stands in for the vendor DLL behind the same dispatch
//! path as the real symbol table: it answers every raw call with a status
//! code, so wrapper-level tests (and `--simulate` demo runs) exercise the
//! full marshalling and status-translation machinery without hardware.
//!
//! The simulation is deliberately shallow. Setters store into the register
//! their paired getter reads, toggles flip the flag their paired status
//! query reports, and procedures latch their progress flag. Fault codes can
//! be queued with [`MockCryostat::fail_next`] and are returned by the next
//! raw call regardless of which one it is.

use std::collections::{HashMap, VecDeque};
use std::ffi::CStr;
use std::sync::Mutex;

use crate::status::STATUS_OK;

/// Simulated device state behind a [`Mutex`], one instance per mock.
#[derive(Default)]
struct State {
    began: Option<u16>,
    connected: bool,
    initialised: bool,
    logging: Option<(String, i32, bool)>,
    floats: HashMap<String, f32>,
    flags: HashMap<String, bool>,
    action_message: String,
    error_message: String,
    error_code: i32,
    queued_codes: VecDeque<i32>,
}

/// Simulated attoDRY, keyed by the short vendor operation names
/// (`"getSampleTemperature"`, `"togglePump"`, ...).
pub struct MockCryostat {
    inner: Mutex<State>,
}

impl Default for MockCryostat {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCryostat {
    /// Creates a simulator with room-temperature readings and no field.
    pub fn new() -> Self {
        let mut floats = HashMap::new();
        floats.insert("getSampleTemperature".to_string(), 295.0);
        floats.insert("getUserTemperature".to_string(), 295.0);
        floats.insert("getVtiTemperature".to_string(), 295.0);
        floats.insert("get4KStageTemperature".to_string(), 3.8);
        floats.insert("get40KStageTemperature".to_string(), 38.0);
        floats.insert("getMagneticField".to_string(), 0.0);
        floats.insert("getMagneticFieldSetPoint".to_string(), 0.0);
        floats.insert("getDumpPressure".to_string(), 740.0);
        MockCryostat {
            inner: Mutex::new(State {
                floats,
                action_message: "Idle".to_string(),
                ..State::default()
            }),
        }
    }

    /// Queues a raw status code to be returned by the next call.
    ///
    /// Codes are consumed in order, one per call, before the call's normal
    /// behaviour would run.
    pub fn fail_next(&self, code: i32) {
        self.lock().queued_codes.push_back(code);
    }

    /// Overwrites the register a getter reads.
    pub fn set_value(&self, getter: &str, value: f32) {
        self.lock().floats.insert(getter.to_string(), value);
    }

    /// Reads a register back, if it was ever written.
    pub fn value(&self, getter: &str) -> Option<f32> {
        self.lock().floats.get(getter).copied()
    }

    /// Overwrites the flag a status query reports.
    pub fn set_flag(&self, getter: &str, on: bool) {
        self.lock().flags.insert(getter.to_string(), on);
    }

    /// Reads a flag back; unset flags read as `false`.
    pub fn flag(&self, getter: &str) -> bool {
        self.lock().flags.get(getter).copied().unwrap_or(false)
    }

    /// Sets the text returned by the action-message endpoint.
    pub fn set_action_message(&self, message: &str) {
        self.lock().action_message = message.to_string();
    }

    /// Sets the raised error code and its message text.
    pub fn set_error(&self, code: i32, message: &str) {
        let mut state = self.lock();
        state.error_code = code;
        state.error_message = message.to_string();
    }

    /// Controls whether the device reports itself initialised.
    pub fn set_initialised(&self, initialised: bool) {
        self.lock().initialised = initialised;
    }

    /// Setup version passed to `begin`, if the session was started.
    pub fn began_with(&self) -> Option<u16> {
        self.lock().began
    }

    /// Whether a `Connect` has happened without a later `Disconnect`.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Active log target as `(path, interval, append)`, if logging.
    pub fn logging_target(&self) -> Option<(String, i32, bool)> {
        self.lock().logging.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn take_queued(state: &mut State) -> Option<i32> {
        state.queued_codes.pop_front()
    }

    pub(crate) fn command(&self, op: &'static str) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        match op {
            "Disconnect" => state.connected = false,
            "end" => state.began = None,
            "Cancel" | "Confirm" => {}
            "lowerError" => {
                state.error_code = 0;
                state.error_message.clear();
            }
            "stopLogging" => state.logging = None,
            "goToBaseTemperature" => {
                state.flags.insert("isGoingToBaseTemperature".to_string(), true);
            }
            "startSampleExchange" => {
                state
                    .flags
                    .insert("isSampleExchangeInProgress".to_string(), true);
            }
            "sweepFieldToZero" => {
                state.flags.insert("isZeroingField".to_string(), true);
                state
                    .floats
                    .insert("getMagneticFieldSetPoint".to_string(), 0.0);
            }
            op if op.starts_with("query") => {}
            op if op.starts_with("toggle") => {
                let key = toggle_target(op);
                let current = state.flags.get(key).copied().unwrap_or(false);
                state.flags.insert(key.to_string(), !current);
            }
            _ => {}
        }
        STATUS_OK
    }

    pub(crate) fn begin(&self, setup_version: u16) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        state.began = Some(setup_version);
        STATUS_OK
    }

    pub(crate) fn read_f32(&self, op: &'static str, out: &mut f32) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        *out = state.floats.get(op).copied().unwrap_or(0.0);
        STATUS_OK
    }

    pub(crate) fn write_f32(&self, op: &'static str, value: f32) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        state.floats.insert(setter_target(op), value);
        STATUS_OK
    }

    pub(crate) fn read_i32(&self, op: &'static str, out: &mut i32) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        *out = match op {
            "getAttodryErrorStatus" => state.error_code,
            "isDeviceConnected" => i32::from(state.connected),
            "isDeviceInitialised" => i32::from(state.initialised),
            _ => i32::from(state.flags.get(op).copied().unwrap_or(false)),
        };
        STATUS_OK
    }

    pub(crate) fn send_path(&self, op: &'static str, _path: &CStr) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        if op == "Connect" {
            state.connected = true;
            state.initialised = true;
        }
        STATUS_OK
    }

    pub(crate) fn send_curve(&self, _op: &'static str, _curve: i32, _path: &CStr) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        STATUS_OK
    }

    pub(crate) fn read_message(&self, op: &'static str, buf: &mut [u8]) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        let message = match op {
            "getActionMessage" => &state.action_message,
            _ => &state.error_message,
        };
        let len = message.len().min(buf.len().saturating_sub(1));
        buf[..len].copy_from_slice(&message.as_bytes()[..len]);
        if len < buf.len() {
            buf[len] = 0;
        }
        STATUS_OK
    }

    pub(crate) fn start_logging(&self, path: &CStr, interval: i32, append: i32) -> i32 {
        let mut state = self.lock();
        if let Some(code) = Self::take_queued(&mut state) {
            return code;
        }
        state.logging = Some((
            path.to_string_lossy().into_owned(),
            interval,
            append != 0,
        ));
        STATUS_OK
    }
}

/// Flag flipped by each toggle, named after the query that reports it.
fn toggle_target(op: &'static str) -> &'static str {
    match op {
        "togglePump" => "isPumping",
        "toggleMagneticFieldControl" => "isControllingField",
        "toggleFullTemperatureControl" => "isControllingTemperature",
        "toggleSampleTemperatureControl" => "isSampleHeaterOn",
        "toggleExchangeHeaterControl" => "isExchangeHeaterOn",
        "togglePersistentMode" => "isPersistentModeSet",
        "toggleStartUpShutdown" => "isSystemRunning",
        "toggleCryostatInValve" => "getCryostatInValve",
        "toggleCryostatOutValve" => "getCryostatOutValve",
        "toggleDumpInValve" => "getDumpInValve",
        "toggleDumpOutValve" => "getDumpOutValve",
        "toggleHeliumValve" => "getHeliumValve",
        "toggleInnerVolumeValve" => "getInnerVolumeValve",
        "toggleOuterVolumeValve" => "getOuterVolumeValve",
        "togglePumpValve" => "getPumpValve",
        "togglePump800Valve" => "getPump800Valve",
        "toggleSampleSpace800Valve" => "getSampleSpace800Valve",
        "toggleBreakVac800Valve" => "getBreakVac800Valve",
        _ => op,
    }
}

/// Register written by each setter, named after the getter that reads it.
fn setter_target(op: &str) -> String {
    match op {
        "setUserMagneticField" => "getMagneticFieldSetPoint".to_string(),
        "setVTIHeaterPower" => "getVtiHeaterPower".to_string(),
        _ => op.replacen("set", "get", 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setter_pairs_with_getter() {
        assert_eq!(setter_target("setUserTemperature"), "getUserTemperature");
        assert_eq!(setter_target("setSampleHeaterPower"), "getSampleHeaterPower");
        assert_eq!(setter_target("setUserMagneticField"), "getMagneticFieldSetPoint");
        assert_eq!(setter_target("setVTIHeaterPower"), "getVtiHeaterPower");
    }

    #[test]
    fn queued_code_preempts_the_call() {
        let mock = MockCryostat::new();
        mock.fail_next(37);
        assert_eq!(mock.command("togglePump"), 37);
        assert_eq!(mock.command("togglePump"), STATUS_OK);
        // the failed call must not have toggled anything
        assert!(mock.flag("isPumping"));
    }

    #[test]
    fn message_is_truncated_to_the_buffer() {
        let mock = MockCryostat::new();
        mock.set_action_message("Cooling down");
        let mut buf = [0xffu8; 8];
        assert_eq!(mock.read_message("getActionMessage", &mut buf), STATUS_OK);
        assert_eq!(&buf[..7], b"Cooling");
        assert_eq!(buf[7], 0);
    }
}
