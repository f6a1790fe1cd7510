/// Placeholder for a field the registry did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// One installed product.
///
/// `display_name` is the identity of the record. The other two fields hold
/// either the value read from the registry or [`NOT_AVAILABLE`]; they are
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareRecord {
    pub display_name: String,
    pub install_date: String,
    pub display_version: String,
}

impl SoftwareRecord {
    pub fn new(
        display_name: impl Into<String>,
        install_date: impl Into<String>,
        display_version: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            install_date: install_date.into(),
            display_version: display_version.into(),
        }
    }

    /// A record known only by name, as reported by sources without
    /// date or version information.
    pub fn name_only(display_name: impl Into<String>) -> Self {
        Self::new(display_name, NOT_AVAILABLE, NOT_AVAILABLE)
    }

    pub fn with_install_date(mut self, install_date: impl Into<String>) -> Self {
        self.install_date = install_date.into();
        self
    }

    pub fn with_display_version(mut self, display_version: impl Into<String>) -> Self {
        self.display_version = display_version.into();
        self
    }

    pub fn has_install_date(&self) -> bool {
        self.install_date != NOT_AVAILABLE
    }

    pub fn has_display_version(&self) -> bool {
        self.display_version != NOT_AVAILABLE
    }

    /// Fills the sentinel fields of `self` from `other`.
    ///
    /// Fields that already hold a value are left alone, so the first value
    /// seen for a field wins. Returns true if any field changed.
    pub fn fill_from(&mut self, other: &SoftwareRecord) -> bool {
        let mut changed = false;

        if !self.has_install_date() && other.has_install_date() {
            self.install_date = other.install_date.clone();
            changed = true;
        }

        if !self.has_display_version() && other.has_display_version() {
            self.display_version = other.display_version.clone();
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only_uses_sentinel() {
        let record = SoftwareRecord::name_only("Notepad++");
        assert_eq!(record.install_date, NOT_AVAILABLE);
        assert_eq!(record.display_version, NOT_AVAILABLE);
        assert!(!record.has_install_date());
        assert!(!record.has_display_version());
    }

    #[test]
    fn test_fill_from_fills_only_sentinels() {
        let mut record = SoftwareRecord::name_only("X").with_install_date("20200101");
        let other = SoftwareRecord::new("X", "20210606", "1.0");

        assert!(record.fill_from(&other));
        assert_eq!(record.install_date, "20200101");
        assert_eq!(record.display_version, "1.0");
    }

    #[test]
    fn test_fill_from_ignores_sentinel_source() {
        let mut record = SoftwareRecord::name_only("X");
        let other = SoftwareRecord::name_only("X");

        assert!(!record.fill_from(&other));
        assert_eq!(record, SoftwareRecord::name_only("X"));
    }
}
