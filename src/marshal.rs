//! Marshalling helpers for the FFI boundary.
//!
//! String-valued parameters (COM ports, file paths) cross the boundary as
//! NUL-terminated byte buffers; message retrieval comes back through a
//! caller-allocated fixed-width buffer. Scalars are plain `f32`/`i32` and
//! need no help.

use std::ffi::CString;
use std::path::Path;

use crate::error::Result;

/// Encodes a string for the library, rejecting interior NUL bytes.
pub fn to_cstring(s: &str) -> Result<CString> {
    Ok(CString::new(s)?)
}

/// Encodes a filesystem path for the library.
///
/// Paths that are not valid UTF-8 are encoded lossily; the vendor library
/// only accepts paths expressible in the platform's default text encoding
/// anyway.
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    Ok(CString::new(path.to_string_lossy().as_bytes().to_vec())?)
}

/// Decodes a message buffer filled by the library.
///
/// The library NUL-terminates whatever it writes; everything from the first
/// NUL on is discarded. Non-UTF-8 bytes are replaced rather than rejected so
/// a garbled diagnostic still reaches the operator.
pub fn decode_message(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_float;

    #[test]
    fn ascii_round_trips_unchanged() {
        let port = to_cstring("COM4").unwrap();
        assert_eq!(port.to_str().unwrap(), "COM4");

        let path = path_to_cstring(Path::new("C:\\data\\log.txt")).unwrap();
        assert_eq!(path.to_str().unwrap(), "C:\\data\\log.txt");
    }

    #[test]
    fn interior_nul_is_rejected() {
        assert!(to_cstring("COM\04").is_err());
        assert!(path_to_cstring(Path::new("bad\0path")).is_err());
    }

    #[test]
    fn decode_stops_at_first_nul() {
        let mut buf = vec![0u8; 16];
        buf[..5].copy_from_slice(b"Ready");
        buf[7] = b'x'; // stale bytes past the terminator
        assert_eq!(decode_message(&buf), "Ready");
    }

    #[test]
    fn decode_without_terminator_takes_whole_buffer() {
        assert_eq!(decode_message(b"full"), "full");
    }

    // Output scalars travel through a caller-allocated c_float exactly as
    // the library writes them.
    #[test]
    fn f32_out_parameter_round_trips_exactly() {
        for value in [0.0f32, 1.9, -273.15, 4.2e-3, f32::MAX, f32::MIN_POSITIVE] {
            let mut out: c_float = 0.0;
            let ptr: *mut c_float = &mut out;
            unsafe { *ptr = value };
            assert_eq!(out.to_bits(), value.to_bits());
        }
    }
}
