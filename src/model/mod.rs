//! Core data types for software records and registry locations.
//!
//! - [`SoftwareRecord`] - One installed product as reported by the registry
//! - [`StoreLocation`] - A well-known registry path listing installed products
//! - [`Architecture`] - Bitness of the target operating system
//!
//! # Example
//!
//! ```
//! use instsoft::{SoftwareRecord, NOT_AVAILABLE};
//!
//! let record = SoftwareRecord::new("7-Zip 19.00", NOT_AVAILABLE, "19.00");
//! assert!(!record.has_install_date());
//! ```

mod record;

pub use record::*;

use std::fmt;

/// Registry locations scanned for installed software, in scan priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreLocation {
    /// Per-product uninstall records. Carries install date and version.
    Uninstall,
    /// Windows Installer product registrations. Broad coverage, names only.
    InstallerProducts,
    /// 32-bit uninstall records on a 64-bit system.
    Wow64Uninstall,
}

impl StoreLocation {
    /// Path of the location below `HKEY_LOCAL_MACHINE`.
    pub fn path(&self) -> &'static str {
        match self {
            StoreLocation::Uninstall => r"Software\Microsoft\Windows\CurrentVersion\Uninstall",
            StoreLocation::InstallerProducts => r"Software\Classes\Installer\Products",
            StoreLocation::Wow64Uninstall => {
                r"Software\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall"
            }
        }
    }

    /// Locations to scan for a host of the given architecture.
    ///
    /// The compatibility view only exists on 64-bit systems, so it is
    /// appended last and only for [`Architecture::X64`].
    pub fn scan_order(architecture: Architecture) -> Vec<StoreLocation> {
        let mut locations = vec![StoreLocation::Uninstall, StoreLocation::InstallerProducts];
        if architecture.is_64bit() {
            locations.push(StoreLocation::Wow64Uninstall);
        }
        locations
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StoreLocation::Uninstall => "Uninstall",
            StoreLocation::InstallerProducts => "Installer Products",
            StoreLocation::Wow64Uninstall => "WOW64 Uninstall",
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Architecture {
    #[default]
    X86,
    X64,
}

impl Architecture {
    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X64)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "32-bit",
            Architecture::X64 => "64-bit",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
