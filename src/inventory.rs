//! The canonical, deduplicated software inventory.
//!
//! Records from every registry location are fed through [`Inventory::ingest`].
//! The first record seen for a name creates the entry; later records with the
//! same name can only fill in fields that are still
//! [`NOT_AVAILABLE`](crate::model::NOT_AVAILABLE). Since
//! locations are scanned in priority order, the most authoritative source
//! that knows a field is the one whose value is kept.
//!
//! Entries are kept in a `BTreeMap`, so iteration is always in ordinal order
//! of the display name.

use std::collections::btree_map::{self, BTreeMap};

use crate::model::SoftwareRecord;

/// What [`Inventory::ingest`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new entry was created.
    Inserted,
    /// An existing entry had at least one placeholder field filled.
    Filled,
    /// An entry already existed and the candidate added nothing.
    Unchanged,
    /// The candidate could not be stored and was dropped.
    Rejected,
}

#[derive(Debug, Default)]
pub struct Inventory {
    entries: BTreeMap<String, SoftwareRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `display_name`, creating a name-only entry if
    /// none exists yet. The flag is true when the entry was created.
    pub fn get_or_insert(&mut self, display_name: &str) -> (&mut SoftwareRecord, bool) {
        match self.entries.entry(display_name.to_string()) {
            btree_map::Entry::Occupied(entry) => (entry.into_mut(), false),
            btree_map::Entry::Vacant(entry) => {
                let record = SoftwareRecord::name_only(entry.key().clone());
                (entry.insert(record), true)
            }
        }
    }

    /// Merges one candidate record into the inventory.
    ///
    /// Never fails: a candidate without a usable name is dropped and the
    /// inventory is left untouched.
    pub fn ingest(&mut self, candidate: SoftwareRecord) -> IngestOutcome {
        if candidate.display_name.trim().is_empty() {
            tracing::debug!("dropping candidate with empty display name");
            return IngestOutcome::Rejected;
        }

        let (entry, created) = self.get_or_insert(&candidate.display_name);
        let filled = entry.fill_from(&candidate);

        match (created, filled) {
            (true, _) => IngestOutcome::Inserted,
            (false, true) => IngestOutcome::Filled,
            (false, false) => IngestOutcome::Unchanged,
        }
    }

    pub fn get(&self, display_name: &str) -> Option<&SoftwareRecord> {
        self.entries.get(display_name)
    }

    /// Records in ascending order of display name.
    pub fn records(&self) -> impl Iterator<Item = &SoftwareRecord> {
        self.entries.values()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, SoftwareRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = (&'a String, &'a SoftwareRecord);
    type IntoIter = btree_map::Iter<'a, String, SoftwareRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<SoftwareRecord> for Inventory {
    fn from_iter<I: IntoIterator<Item = SoftwareRecord>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for record in iter {
            inventory.ingest(record);
        }
        inventory
    }
}
