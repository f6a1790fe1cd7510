//! In-memory registry used by tests.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Connector, Registry, RegistryKey};
use crate::error::RegistryError;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryKey {
    name: String,
    values: Vec<(String, String)>,
    unreadable: Vec<String>,
}

impl MemoryKey {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn value(mut self, name: &str, data: &str) -> Self {
        self.values.push((name.to_string(), data.to_string()));
        self
    }

    /// Marks a value as present but unreadable.
    pub(crate) fn unreadable(mut self, name: &str) -> Self {
        self.unreadable.push(name.to_string());
        self
    }
}

impl RegistryKey for MemoryKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_string(&self, value_name: &str) -> Result<String, RegistryError> {
        if self.unreadable.iter().any(|n| n == value_name) {
            return Err(RegistryError::UnsupportedType {
                name: value_name.to_string(),
                value_type: "REG_BINARY".to_string(),
            });
        }
        self.values
            .iter()
            .find(|(name, _)| name == value_name)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| RegistryError::ValueNotFound {
                name: value_name.to_string(),
            })
    }
}

/// Registry with fixed contents that records every path it is asked to open.
#[derive(Debug, Default)]
pub(crate) struct MemoryRegistry {
    host: String,
    locations: HashMap<String, Vec<MemoryKey>>,
    opened: RefCell<Vec<String>>,
}

impl MemoryRegistry {
    pub(crate) fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_location(mut self, path: &str, keys: Vec<MemoryKey>) -> Self {
        self.locations.insert(path.to_string(), keys);
        self
    }

    pub(crate) fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl Registry for MemoryRegistry {
    type Key = MemoryKey;

    fn host(&self) -> &str {
        &self.host
    }

    fn open_subkeys(&self, path: &str) -> Result<Vec<MemoryKey>, RegistryError> {
        self.opened.borrow_mut().push(path.to_string());
        self.locations
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::KeyNotFound {
                path: path.to_string(),
            })
    }
}

/// Connector that hands out a prepared registry for one host.
pub(crate) struct MemoryConnector {
    registry: RefCell<Option<MemoryRegistry>>,
}

impl MemoryConnector {
    pub(crate) fn new(registry: MemoryRegistry) -> Self {
        Self {
            registry: RefCell::new(Some(registry)),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            registry: RefCell::new(None),
        }
    }
}

impl Connector for MemoryConnector {
    type Registry = MemoryRegistry;

    fn connect(&self, host: &str) -> Result<MemoryRegistry, RegistryError> {
        match self.registry.borrow_mut().take() {
            Some(registry) if registry.host.eq_ignore_ascii_case(host) => Ok(registry),
            _ => Err(RegistryError::QueryFailed {
                path: format!(r"\\{}\HKLM", host),
                message: "The network path was not found.".to_string(),
            }),
        }
    }
}
