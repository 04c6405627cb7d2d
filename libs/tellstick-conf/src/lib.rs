//! Tellstick Conf Library
//!
//! Device model and `tellstick.conf` codec for the Telldus cloud sync
//! service. Pure local logic: no network or async dependencies.
//!
//! # Modules
//!
//! - `types`: `Device`, the closed parameter set, and the normalized
//!   comparison projection
//! - `codec`: conf-file serializer and restricted-grammar parser
//! - `error`: codec error types

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{parse_config, read_config, render_config, write_config};
pub use error::{ConfError, Result};
pub use types::{Device, DeviceParameters, NormalizedDevice, PARAMETER_NAMES};
