//! Loading and validation of PRISM hardware configuration files.
//!
//! A configuration file describes one chip variant: its multiplexer bank,
//! the wire-map fan-out, the static and conditional components of the
//! decision tree, and the STEW word layout. When no file is given, or the
//! given file fails to load, [`HardwareConfig::fallback`] supplies the
//! built-in "LUT4+LUT4" parameter set.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::{ConfigError, ParseDiagnostic};
pub use loader::{
    load_config, load_config_from_str, load_or_fallback, ResolvedConfig, MAX_COMPONENT_PINS,
    MAX_MUX_BITS,
};
pub use types::{DecisionTreeConfig, HardwareConfig};
