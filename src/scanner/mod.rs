//! Registry traversal.
//!
//! [`Scanner`] walks the [`StoreLocation`]s for a host in priority order,
//! runs every subkey through the [`Extractor`] and merges the resulting
//! candidates into an [`Inventory`].
//!
//! | Location | Path | Scanned |
//! |----------|------|---------|
//! | Uninstall | `Software\Microsoft\Windows\CurrentVersion\Uninstall` | Always |
//! | Installer Products | `Software\Classes\Installer\Products` | Always |
//! | WOW64 Uninstall | `Software\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall` | 64-bit only |
//!
//! A location that cannot be opened is logged and skipped. Nothing below the
//! location level can stop a scan.

mod extractor;

pub use extractor::{Extractor, DISPLAY_NAME, DISPLAY_VERSION, INSTALL_DATE, PRODUCT_NAME};

use crate::error::RegistryError;
use crate::inventory::{IngestOutcome, Inventory};
use crate::model::{Architecture, StoreLocation};
use crate::registry::Registry;

/// Counters for one scanned location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationStats {
    pub keys: usize,
    pub candidates: usize,
    pub inserted: usize,
    pub filled: usize,
    pub rejected: usize,
}

/// Result of a full scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Every location the scanner attempted, in order.
    pub visited: Vec<StoreLocation>,
    /// Locations that could not be opened.
    pub skipped: Vec<(StoreLocation, RegistryError)>,
    pub totals: LocationStats,
}

impl ScanSummary {
    fn add(&mut self, stats: LocationStats) {
        self.totals.keys += stats.keys;
        self.totals.candidates += stats.candidates;
        self.totals.inserted += stats.inserted;
        self.totals.filled += stats.filled;
        self.totals.rejected += stats.rejected;
    }
}

pub struct Scanner<'a, R: Registry> {
    registry: &'a R,
    extractor: Extractor,
}

impl<'a, R: Registry> Scanner<'a, R> {
    pub fn new(registry: &'a R, extractor: Extractor) -> Self {
        Self {
            registry,
            extractor,
        }
    }

    /// Scans every location that applies to `architecture`.
    ///
    /// `on_location` is called before each location is opened.
    pub fn scan<F>(
        &self,
        architecture: Architecture,
        inventory: &mut Inventory,
        mut on_location: F,
    ) -> ScanSummary
    where
        F: FnMut(StoreLocation),
    {
        let mut summary = ScanSummary::default();

        for location in StoreLocation::scan_order(architecture) {
            on_location(location);
            summary.visited.push(location);

            match self.scan_location(location, inventory) {
                Ok(stats) => {
                    tracing::info!(
                        host = self.registry.host(),
                        %location,
                        keys = stats.keys,
                        candidates = stats.candidates,
                        inserted = stats.inserted,
                        "scanned location"
                    );
                    summary.add(stats);
                }
                Err(e) => {
                    tracing::warn!(
                        host = self.registry.host(),
                        %location,
                        "skipping location: {}",
                        e
                    );
                    summary.skipped.push((location, e));
                }
            }
        }

        summary
    }

    /// Scans a single location.
    ///
    /// # Errors
    ///
    /// Returns an error only if the location itself cannot be opened.
    pub fn scan_location(
        &self,
        location: StoreLocation,
        inventory: &mut Inventory,
    ) -> Result<LocationStats, RegistryError> {
        let keys = self.registry.open_subkeys(location.path())?;
        let mut stats = LocationStats {
            keys: keys.len(),
            ..LocationStats::default()
        };

        for key in &keys {
            let Some(candidate) = self.extractor.extract(key, location) else {
                continue;
            };

            stats.candidates += 1;
            match inventory.ingest(candidate) {
                IngestOutcome::Inserted => stats.inserted += 1,
                IngestOutcome::Filled => stats.filled += 1,
                IngestOutcome::Unchanged => {}
                IngestOutcome::Rejected => stats.rejected += 1,
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SoftwareRecord, NOT_AVAILABLE};
    use crate::registry::memory::{MemoryKey, MemoryRegistry};

    fn uninstall_key(name: &str, date: &str, version: &str) -> MemoryKey {
        MemoryKey::new(name)
            .value(DISPLAY_NAME, name)
            .value(INSTALL_DATE, date)
            .value(DISPLAY_VERSION, version)
    }

    fn all_locations() -> MemoryRegistry {
        MemoryRegistry::new("HOST")
            .with_location(
                StoreLocation::Uninstall.path(),
                vec![uninstall_key("App", "20200101", "1.0")],
            )
            .with_location(
                StoreLocation::InstallerProducts.path(),
                vec![
                    MemoryKey::new("P1").value(DISPLAY_NAME, "App"),
                    MemoryKey::new("P2").value(DISPLAY_NAME, "Installer Only"),
                ],
            )
            .with_location(
                StoreLocation::Wow64Uninstall.path(),
                vec![uninstall_key("Legacy Tool", "20150505", "0.9")],
            )
    }

    #[test]
    fn test_32bit_skips_wow64_location() {
        let registry = all_locations();
        let mut inventory = Inventory::new();

        let summary = Scanner::new(&registry, Extractor::default()).scan(
            Architecture::X86,
            &mut inventory,
            |_| {},
        );

        assert_eq!(
            summary.visited,
            vec![StoreLocation::Uninstall, StoreLocation::InstallerProducts]
        );
        assert_eq!(
            registry.opened(),
            vec![
                StoreLocation::Uninstall.path().to_string(),
                StoreLocation::InstallerProducts.path().to_string(),
            ]
        );
        assert!(inventory.get("Legacy Tool").is_none());
    }

    #[test]
    fn test_64bit_includes_wow64_location() {
        let registry = all_locations();
        let mut inventory = Inventory::new();
        let mut seen = Vec::new();

        let summary = Scanner::new(&registry, Extractor::default()).scan(
            Architecture::X64,
            &mut inventory,
            |location| seen.push(location),
        );

        let expected = vec![
            StoreLocation::Uninstall,
            StoreLocation::InstallerProducts,
            StoreLocation::Wow64Uninstall,
        ];
        assert_eq!(summary.visited, expected);
        assert_eq!(seen, expected);
        assert_eq!(registry.opened().len(), 3);
        assert_eq!(
            inventory.get("Legacy Tool"),
            Some(&SoftwareRecord::new("Legacy Tool", "20150505", "0.9"))
        );
    }

    #[test]
    fn test_missing_location_does_not_stop_scan() {
        let registry = MemoryRegistry::new("HOST").with_location(
            StoreLocation::InstallerProducts.path(),
            vec![MemoryKey::new("P1").value(DISPLAY_NAME, "Installer Only")],
        );
        let mut inventory = Inventory::new();

        let summary = Scanner::new(&registry, Extractor::default()).scan(
            Architecture::X64,
            &mut inventory,
            |_| {},
        );

        assert_eq!(summary.visited.len(), 3);
        let skipped: Vec<StoreLocation> = summary.skipped.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            skipped,
            vec![StoreLocation::Uninstall, StoreLocation::Wow64Uninstall]
        );
        assert_eq!(
            inventory.get("Installer Only"),
            Some(&SoftwareRecord::name_only("Installer Only"))
        );
    }

    #[test]
    fn test_sources_merge_into_one_entry() {
        let registry = all_locations();
        let mut inventory = Inventory::new();

        let summary = Scanner::new(&registry, Extractor::default()).scan(
            Architecture::X86,
            &mut inventory,
            |_| {},
        );

        assert_eq!(inventory.len(), 2);
        assert_eq!(
            inventory.get("App"),
            Some(&SoftwareRecord::new("App", "20200101", "1.0"))
        );
        assert_eq!(summary.totals.keys, 3);
        assert_eq!(summary.totals.candidates, 3);
        assert_eq!(summary.totals.inserted, 2);
    }

    #[test]
    fn test_name_only_source_first_is_filled_later() {
        // Installer data for "App" is already in the inventory when the
        // uninstall record arrives.
        let registry = MemoryRegistry::new("HOST").with_location(
            StoreLocation::Uninstall.path(),
            vec![uninstall_key("App", "2020-01-01", "1.0")],
        );
        let mut inventory = Inventory::new();
        inventory.ingest(SoftwareRecord::name_only("App"));

        let stats = Scanner::new(&registry, Extractor::default())
            .scan_location(StoreLocation::Uninstall, &mut inventory)
            .unwrap();

        assert_eq!(stats.filled, 1);
        assert_eq!(
            inventory.get("App"),
            Some(&SoftwareRecord::new("App", "2020-01-01", "1.0"))
        );
    }

    #[test]
    fn test_keys_without_name_are_skipped() {
        let registry = MemoryRegistry::new("HOST").with_location(
            StoreLocation::Uninstall.path(),
            vec![
                MemoryKey::new("AddressBook"),
                MemoryKey::new("Connection Manager").value(INSTALL_DATE, "20200101"),
                uninstall_key("App", NOT_AVAILABLE, "1.0"),
            ],
        );
        let mut inventory = Inventory::new();

        let stats = Scanner::new(&registry, Extractor::default())
            .scan_location(StoreLocation::Uninstall, &mut inventory)
            .unwrap();

        assert_eq!(stats.keys, 3);
        assert_eq!(stats.candidates, 1);
        assert_eq!(inventory.len(), 1);
    }
}
