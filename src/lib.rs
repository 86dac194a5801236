//! # attodry
//!
//! Safe Rust bindings for the attocube attoDRY cryostat control library
//! (`attoDRYLib`). The vendor DLL owns the device protocol, the control
//! loops, and all session state; this crate binds its exports at runtime,
//! marshals primitive arguments across the boundary, and turns integer
//! status codes into typed errors carrying the vendor's operator
//! diagnostics.
//!
//! ## Crate structure
//!
//! - **`device`**: the [`Cryostat`] handle with one typed method per vendor
//!   entry point, plus the [`SetupVersion`] and [`LoggingInterval`]
//!   selectors.
//! - **`status`**: the status-code translator and the known-fault table.
//! - **`error`**: the crate [`Error`] type and [`Result`] alias.
//! - **`marshal`**: C-string encoding and message-buffer decoding helpers.
//! - **`mock`**: an in-memory simulator backend for tests and demo runs
//!   without hardware.
//! - **`config`**: [`Settings`] loaded from `attodry.toml` and `ATTODRY_*`
//!   environment variables.
//!
//! The raw symbol table lives in the `attodry-sys` workspace member.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use attodry::{Cryostat, SetupVersion};
//!
//! # fn main() -> attodry::Result<()> {
//! let settings = attodry::Settings::load()?;
//! let cryostat = unsafe { Cryostat::open(&settings.library)? };
//! cryostat.begin(settings.setup)?;
//! cryostat.connect(&settings.com_port)?;
//! cryostat.wait_until_initialised(Duration::from_secs(30))?;
//!
//! let field = cryostat.magnetic_field()?;
//! let temperature = cryostat.sample_temperature()?;
//! println!("B = {field} T, T = {temperature} K");
//!
//! cryostat.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod marshal;
pub mod mock;
pub mod status;

pub use config::Settings;
pub use device::{Cryostat, LoggingInterval, SetupVersion, MESSAGE_LEN, USER_CURVE_NUMBERS};
pub use error::{Error, Result};
pub use mock::MockCryostat;
