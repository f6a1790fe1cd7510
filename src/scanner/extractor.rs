use crate::error::RegistryError;
use crate::model::{SoftwareRecord, StoreLocation, NOT_AVAILABLE};
use crate::registry::RegistryKey;

pub const DISPLAY_NAME: &str = "DisplayName";
pub const INSTALL_DATE: &str = "InstallDate";
pub const DISPLAY_VERSION: &str = "DisplayVersion";
pub const PRODUCT_NAME: &str = "ProductName";

/// Turns registry keys into candidate records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    /// Read `ProductName` from Windows Installer product keys that have no
    /// `DisplayName`.
    pub product_name_fallback: bool,
}

impl Extractor {
    pub fn new(product_name_fallback: bool) -> Self {
        Self {
            product_name_fallback,
        }
    }

    /// Builds a candidate from one key.
    ///
    /// Returns `None` for keys without a display name; those are components,
    /// patches and similar entries rather than products. Missing or
    /// unreadable date and version values become [`NOT_AVAILABLE`].
    pub fn extract<K: RegistryKey>(
        &self,
        key: &K,
        location: StoreLocation,
    ) -> Option<SoftwareRecord> {
        let display_name = read_field(key, DISPLAY_NAME).or_else(|| {
            if self.product_name_fallback && location == StoreLocation::InstallerProducts {
                read_field(key, PRODUCT_NAME)
            } else {
                None
            }
        })?;

        let install_date =
            read_field(key, INSTALL_DATE).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let display_version =
            read_field(key, DISPLAY_VERSION).unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Some(SoftwareRecord::new(display_name, install_date, display_version))
    }
}

/// Reads a value, treating absent, unreadable and blank values alike.
fn read_field<K: RegistryKey>(key: &K, value_name: &str) -> Option<String> {
    match key.read_string(value_name) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value),
        Err(RegistryError::ValueNotFound { .. }) => None,
        Err(e) => {
            tracing::debug!(key = key.name(), value = value_name, "unreadable value: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::memory::MemoryKey;

    #[test]
    fn test_full_record() {
        let key = MemoryKey::new("7-Zip")
            .value(DISPLAY_NAME, "7-Zip 19.00 (x64)")
            .value(INSTALL_DATE, "20200101")
            .value(DISPLAY_VERSION, "19.00");

        let record = Extractor::default()
            .extract(&key, StoreLocation::Uninstall)
            .unwrap();

        assert_eq!(record, SoftwareRecord::new("7-Zip 19.00 (x64)", "20200101", "19.00"));
    }

    #[test]
    fn test_missing_display_name_yields_nothing() {
        let key = MemoryKey::new("KB4023057")
            .value(INSTALL_DATE, "20200101")
            .value(DISPLAY_VERSION, "1.0");

        assert!(Extractor::default().extract(&key, StoreLocation::Uninstall).is_none());
    }

    #[test]
    fn test_unreadable_display_name_yields_nothing() {
        let key = MemoryKey::new("Broken").unreadable(DISPLAY_NAME);
        assert!(Extractor::default().extract(&key, StoreLocation::Uninstall).is_none());
    }

    #[test]
    fn test_blank_display_name_yields_nothing() {
        let key = MemoryKey::new("Blank").value(DISPLAY_NAME, "  ");
        assert!(Extractor::default().extract(&key, StoreLocation::Uninstall).is_none());
    }

    #[test]
    fn test_missing_fields_become_sentinel() {
        let key = MemoryKey::new("App").value(DISPLAY_NAME, "App");

        let record = Extractor::default()
            .extract(&key, StoreLocation::Uninstall)
            .unwrap();

        assert_eq!(record.install_date, NOT_AVAILABLE);
        assert_eq!(record.display_version, NOT_AVAILABLE);
    }

    #[test]
    fn test_unreadable_and_empty_fields_become_sentinel() {
        let key = MemoryKey::new("App")
            .value(DISPLAY_NAME, "App")
            .unreadable(INSTALL_DATE)
            .value(DISPLAY_VERSION, "");

        let record = Extractor::default()
            .extract(&key, StoreLocation::Uninstall)
            .unwrap();

        assert_eq!(record, SoftwareRecord::name_only("App"));
    }

    #[test]
    fn test_product_name_fallback_is_opt_in() {
        let key = MemoryKey::new("00002109610090400000000000F01FEC")
            .value(PRODUCT_NAME, "Microsoft Office Professional Plus 2016");

        assert!(Extractor::default()
            .extract(&key, StoreLocation::InstallerProducts)
            .is_none());

        let record = Extractor::new(true)
            .extract(&key, StoreLocation::InstallerProducts)
            .unwrap();
        assert_eq!(
            record,
            SoftwareRecord::name_only("Microsoft Office Professional Plus 2016")
        );
    }

    #[test]
    fn test_product_name_fallback_only_for_installer_products() {
        let key = MemoryKey::new("Other").value(PRODUCT_NAME, "Other Product");
        assert!(Extractor::new(true)
            .extract(&key, StoreLocation::Uninstall)
            .is_none());
    }

    #[test]
    fn test_display_name_preferred_over_product_name() {
        let key = MemoryKey::new("Both")
            .value(DISPLAY_NAME, "Display")
            .value(PRODUCT_NAME, "Product");

        let record = Extractor::new(true)
            .extract(&key, StoreLocation::InstallerProducts)
            .unwrap();
        assert_eq!(record.display_name, "Display");
    }
}
