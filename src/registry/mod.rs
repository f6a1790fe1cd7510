//! Access to the `HKEY_LOCAL_MACHINE` hive of a local or remote host.
//!
//! The inventory code only talks to the traits in this module:
//!
//! - [`Connector`] opens the hive of a named host
//! - [`Registry`] lists the direct subkeys of a path in that hive
//! - [`RegistryKey`] reads named values from one subkey
//!
//! Two implementations ship with the tool:
//!
//! - [`PowerShellConnector`] reads the hive through the .NET registry API and
//!   gets every name back as UTF-8 JSON. This is the default.
//! - [`RegExeConnector`] parses the text printed by `reg.exe`, for hosts where
//!   PowerShell is unavailable or locked down.

mod powershell;
mod reg_exe;

#[cfg(test)]
pub(crate) mod memory;

pub use powershell::{
    parse_subkeys_json, PowerShellConnector, PowerShellRegistry, PsKey, PsValue,
};
pub use reg_exe::{
    decode_reg_output, parse_query_output, RegExeConnector, RegExeKey, RegExeRegistry, RegValue,
};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A single registry key and its values.
pub trait RegistryKey {
    /// Name of the key relative to its parent.
    fn name(&self) -> &str;

    /// Reads a value as text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ValueNotFound`] if the key has no such value
    /// and [`RegistryError::UnsupportedType`] if the value is not textual or
    /// numeric.
    fn read_string(&self, value_name: &str) -> Result<String, RegistryError>;
}

/// An open registry hive.
pub trait Registry {
    type Key: RegistryKey;

    /// Host this hive belongs to.
    fn host(&self) -> &str;

    /// Opens `path` and returns its direct subkeys.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or cannot be read. Failures
    /// inside individual subkeys are not reported here; they surface when
    /// their values are read.
    fn open_subkeys(&self, path: &str) -> Result<Vec<Self::Key>, RegistryError>;
}

/// Opens the registry of a host.
pub trait Connector {
    type Registry: Registry;

    /// # Errors
    ///
    /// Returns an error if the host is unreachable or refuses access.
    fn connect(&self, host: &str) -> Result<Self::Registry, RegistryError>;
}

/// Which registry implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    #[serde(rename = "powershell")]
    PowerShell,
    RegExe,
}

/// Whether `host` names the machine the tool runs on. The local hive is
/// opened directly so the Remote Registry service is not needed.
pub(crate) fn is_local_host(host: &str, local_host: &str) -> bool {
    host.eq_ignore_ascii_case(local_host)
        || host.eq_ignore_ascii_case("localhost")
        || host == "."
}
