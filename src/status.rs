//! Status-code translation.
//!
//! Every `attoDRYLib` entry point returns an integer status code. Zero is
//! success. A fixed set of positive codes identifies hardware faults, each
//! with a diagnostic the vendor wrote for operators; the texts are
//! reproduced here byte for byte (typos included) because lab procedures
//! reference them literally. Negative codes carry no diagnostic and are
//! reported generically with the failing operation and its arguments, and
//! any other code is reported as unknown.
//!
//! The fault set is data, not control flow: [`FAULTS`] is the single source
//! of truth and [`check`] is a pure function of its inputs.

use std::fmt;

use crate::error::{Error, Result};

/// Status code meaning the call succeeded.
pub const STATUS_OK: i32 = 0;

/// Highest status code reported generically; anything at or below this is
/// an unspecific failure.
pub const STATUS_ERROR: i32 = -1;

/// Known hardware fault codes and their operator diagnostics, verbatim.
pub const FAULTS: &[(i32, &str)] = &[
    (1, "Error 1: High liquid helium reservoir temperature. Action: Wait for it to cool."),
    (2, "Error 2: High pressure. Action: Wait for it to drop."),
    (3, "Error 3: The temperature monitor has not initialised properly. Action: Turn the AttoDRY off and on."),
    (4, "Error 4: There is a fault with channel A on the temperature Monitor. Action: Turn the attoDRY off and on. If this error occurs repeatedly, contact attocube."),
    (5, "Error 5: There is a fault with channel B on the temperature Monitor. Action: Turn the attoDRY off and on. If this error occurs repeatedly, contact attocube."),
    (6, "Error 6: There is a fault with channel C on the temperature Monitor. Action: Turn the attoDRY off and on. If this error occurs repeatedly, contact attocube."),
    (7, "Error 7: There is a fault with channel D on the temperature Monitor. Action: Turn the attoDRY off and on. If this error occurs repeatedly, contact attocube."),
    (8, "Error 8: The temperature monitor has not responded within a ceratin amount of time. Action: Lower the error. If the error occurs again, try restarting the attoDRY. If this occurs again, contact attocube."),
    (9, "Error 9: Excessive pump link voltage. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (10, "Error 10: Excessive pump motor current. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (11, "Error 11: Excessive pump controller temperature. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube. Make sure the pump is in a well-ventilated area."),
    (12, "Error 12: Pump controller temp sensor failure. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (13, "Error 13: Pump power stage failure. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (17, "Error 17: Critical pump EEPROM problem. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (19, "Error 19: Pump parameter set upload required. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (20, "Error 20: Pump self-test fault (invalid pump software code). Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (21, "Error 21: Pump serial enable input went inactive whilst operating with a serial start command. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube. Ensure the cable between the pump and the attoDRY is plugged in properly."),
    (22, "Error 22: Pump output frequency dropped below threshold for too long. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube. This error may occur if the pressure suddenly increases in the pumping line."),
    (23, "Error 23: Pump output frequency did not reach threshold in allowable time. Action: Turn off the attoDRY, switch the pump on and off again. Turn the attoDRY on. If this occurs again, contact attocube."),
    (24, "Error 24: Error processing pump response. Action: Try to send the command again."),
    (29, "Error 29: Error with pump inlet pressure gauge. Action: Check the light on top of the pressure gauge. If it is off, ensure everything is plugged correctly. If it is red or green, try switching the power on and off. Contact attocube if the light stays off or red."),
    (30, "Error 30: Error with the pump outlet pressure gauge. Action: Check the light on top of the pressure gauge. If it is off, ensure everything is plugged in correctly. If it is red or green, try switching the power on and off. Contact attocube if the light stays off or red."),
    (31, "Error 31: Error with the helium dump pressure gauge. Action: Check the light on top of the pressure gauge. If it is off, ensure everything is plugged in correctly. If it is red or green, try switching the power on and off. Contact attocube if the light stays off or red."),
    (32, "Error 32: Error with compressor. Action: Check the compressor display for more information."),
    (33, "Error 33: VTI temperature is too high; everything is stopped to prefent damage. Action: Wait for the temperature to drop. If this occurs repeatedly, contact attocube."),
    (34, "Error 34: The temperature monitor has given invalid temperatures for too long. Unable to control the temperature. This can occur when changing temperature monitor settings e.g. sensor exictation ranges. Action: Check all temperature sensor cables are connected and try again. If the error occurs again, restart the attoDRY. If you changed a setting on the temperature monitor, wait a few seconds and start controlling again."),
    (35, "Error 35: An operation has been requested that requires the magnet controller and there is not one connected. Action: Ensure magnet controller is connected, switched on, and communication is configured. Restart attoDRY."),
    (36, "Error 36: An operation with the magnet controller requires it to be in remote mode when it is not. Action: The magnet controller must be in remote mode. Ensure the magnet controller is not in local mode."),
    (37, "Error 37: Magnet quenched. Action: Let magnet cool. Try again."),
    (38, "Error 38: Magnet controller power module failure. Action: Contact attocube."),
    (39, "Error 39: Error with chip 1 on motor driver 1. Action: Restart attoDRY. Contact attocube if problem persists."),
    (40, "Error 40: Error with chip 1 on motor driver 2. Action: Restart attoDRY. Contact attocube if problem persists."),
    (41, "Error 41: Error with chip 1 on motor driver 3. Action: Restart attoDRY. Contact attocube if problem persists."),
    (42, "Error 42: Error with chip 1 on motor driver 4. Action: Restart attoDRY. Contact attocube if problem persists."),
];

/// Looks up the diagnostic for a known hardware fault code.
pub fn fault_message(code: i32) -> Option<&'static str> {
    FAULTS.iter().find(|(c, _)| *c == code).map(|(_, m)| *m)
}

/// Translates a status code into a result.
///
/// `operation` and `args` only appear in the generic failure text; they are
/// not formatted on the success path.
pub fn check(code: i32, operation: &'static str, args: fmt::Arguments<'_>) -> Result<()> {
    if code == STATUS_OK {
        return Ok(());
    }
    if let Some(message) = fault_message(code) {
        return Err(Error::Fault { code, message });
    }
    if code <= STATUS_ERROR {
        return Err(Error::Call {
            operation,
            args: args.to_string(),
        });
    }
    Err(Error::UnknownCode { code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_a_no_op() {
        assert!(check(STATUS_OK, "begin", format_args!("1")).is_ok());
    }

    #[test]
    fn every_fault_code_yields_its_exact_message() {
        for &(code, message) in FAULTS {
            match check(code, "togglePump", format_args!("")) {
                Err(Error::Fault {
                    code: got_code,
                    message: got_message,
                }) => {
                    assert_eq!(got_code, code);
                    assert_eq!(got_message, message);
                }
                other => panic!("code {code} translated to {other:?}"),
            }
        }
    }

    #[test]
    fn fault_display_is_the_table_text() {
        let err = check(37, "setUserMagneticField", format_args!("1.5")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error 37: Magnet quenched. Action: Let magnet cool. Try again."
        );
    }

    #[test]
    fn negative_codes_name_operation_and_arguments() {
        for code in [-1, -2, -17, -100_000] {
            let err = check(code, "setUserTemperature", format_args!("{}", 4.2)).unwrap_err();
            let text = err.to_string();
            assert!(text.contains("setUserTemperature"), "missing operation: {text}");
            assert!(text.contains("4.2"), "missing arguments: {text}");
        }
    }

    #[test]
    fn unknown_positive_codes_carry_the_raw_code() {
        for code in [14, 18, 25, 43, 999] {
            let err = check(code, "togglePump", format_args!("")).unwrap_err();
            assert!(matches!(err, Error::UnknownCode { code: c } if c == code));
            assert!(err.to_string().contains(&code.to_string()));
        }
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut codes: Vec<i32> = FAULTS.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), FAULTS.len());
    }
}
