//! Error types for the attoDRY binding.
//!
//! Every failure is raised immediately to the caller; the binding performs
//! no retries and holds no recovery state. Device-side failures come out of
//! the status-code translator in [`crate::status`]: known hardware faults
//! carry the vendor's exact remediation text, everything else degrades to a
//! generic failure naming the operation and its arguments.

use std::ffi::NulError;
use std::time::Duration;

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the binding and its convenience layer.
#[derive(Error, Debug)]
pub enum Error {
    /// A known hardware fault code with its operator remediation message.
    #[error("{message}")]
    Fault {
        /// Raw status code returned by the library.
        code: i32,
        /// Vendor diagnostic text for this code, verbatim.
        message: &'static str,
    },

    /// A negative status code with no specific diagnostic.
    #[error("unspecified error in {operation} with arguments ({args})")]
    Call {
        /// Name of the failing entry point.
        operation: &'static str,
        /// Arguments the entry point was called with.
        args: String,
    },

    /// A positive status code outside the known fault table.
    #[error("unknown error code {code}")]
    UnknownCode {
        /// Raw status code returned by the library.
        code: i32,
    },

    /// Loading the shared library or resolving one of its symbols failed.
    #[error("failed to load attoDRYLib: {0}")]
    Library(#[from] libloading::Error),

    /// A user curve number outside the range the temperature monitor accepts.
    #[error("user curve number {curve} is outside the valid range 1-8")]
    CurveNumber {
        /// The rejected curve number.
        curve: i32,
    },

    /// A port or path string contained an interior NUL byte.
    #[error("string cannot cross the FFI boundary: {0}")]
    NulByte(#[from] NulError),

    /// Configuration could not be loaded or merged.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// The device did not report itself initialised in time.
    #[error("device did not initialise within {0:?}")]
    InitTimeout(Duration),
}
